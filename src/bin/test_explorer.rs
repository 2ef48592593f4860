use chain_relay_service::{
    blockchain::{client::LedgerClient, ExplorerClient},
    config::Config,
};
use tracing::{error, info, warn, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting explorer smoke test...");

    let config = Config::from_env();
    let client = ExplorerClient::new(&config)?;

    // 1. Recent transactions feed
    info!("Testing lasttxs...");
    let recent = client.list_recent_transactions().await?;
    info!("✅ Explorer returned {} recent transactions", recent.len());

    // 2. Detail + timestamp for the newest one
    if let Some(first) = recent.first() {
        match first.timestamp() {
            Ok(ts) => info!("✅ Parsed timestamp {} -> {} ms", first.time_utc, ts),
            Err(e) => warn!("❌ {}", e),
        }

        match client.get_transaction_detail(&first.hash).await {
            Ok(detail) => {
                info!("✅ Retrieved detail for {}", first.hash);
                info!("   Inputs: {}", detail.vin.len());
                info!("   Outputs: {}", detail.vout.len());
            }
            Err(e) => error!("❌ Failed to get detail for {}: {}", first.hash, e),
        }
    }

    // 3. Balance and summary for addresses passed on the command line
    let addresses: Vec<String> = std::env::args().skip(1).collect();
    if addresses.is_empty() {
        info!("No addresses given, skipping balance and multiaddr checks");
        return Ok(());
    }

    for address in &addresses {
        match client.get_balance(address).await {
            Ok(balance) => info!("✅ Balance of {}: {}", address, balance),
            Err(e) => error!("❌ Balance lookup failed for {}: {}", address, e),
        }
    }

    let summary = client.get_address_summary(&addresses, 10).await?;
    info!(
        "✅ multiaddr: {} total txs, {} returned",
        summary.total_tx_count(),
        summary.txs.len()
    );

    info!("All explorer checks completed!");
    Ok(())
}
