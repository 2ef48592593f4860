// Initialize configuration
// Set up logging
// Create database connection pool
// Wire explorer client, backend notifier and sync engine
// Start sync loop
// Start HTTP server

use chain_relay_service::{
    api,
    blockchain::{self, ExplorerClient, HttpBackend},
    config::Config,
    db,
    state::AppState,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting chain-relay-service");

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        "Configuration loaded: explorer={}, backend={}, database={}, sync every {:?}",
        config.explorer_api_url,
        config.backend_api_url,
        config.database_url,
        config.sync_interval
    );

    // Setup database connection
    let db_pool = db::connection::establish_connection(&config.database_url).await?;
    tracing::info!("Database connection established");

    let store = Arc::new(db::SqliteStore::new(db_pool));
    let ledger = Arc::new(ExplorerClient::new(&config)?);
    let backend = Arc::new(HttpBackend::new(&config)?);

    // Create shared state
    let app_state = Arc::new(AppState::new(config.clone(), store, ledger, backend));

    // Start sync loop
    let shutdown = CancellationToken::new();
    let sync_handle = tokio::spawn(blockchain::start_sync_loop(
        app_state.sync.clone(),
        config.sync_initial_delay,
        config.sync_interval,
        shutdown.clone(),
    ));
    tracing::info!("Sync loop task started");

    // Start HTTP server
    let app = api::create_router(app_state);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting server on {}", addr);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl-C received, shutting down");
                }
                _ = server_shutdown.cancelled() => {}
            }
        })
        .await?;

    shutdown.cancel();
    if let Err(e) = sync_handle.await {
        tracing::error!("Sync loop task failed: {}", e);
    }

    Ok(())
}
