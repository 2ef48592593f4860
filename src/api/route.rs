use crate::{
    api::{error::ApiError, response::JsonResponse},
    models::{InfoResponse, SetAddressesResponse},
    service::info as info_service,
    state::AppState,
    validation::{parse_address_list, validate_addresses},
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

// GET /info endpoint query parameters
#[derive(Deserialize)]
pub struct InfoQuery {
    addresses: String,
}

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/set-addresses", post(set_addresses))
        .route("/all-info", get(get_all_info))
        .route("/info", get(get_info))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// POST /set-addresses handler
async fn set_addresses(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<JsonResponse<SetAddressesResponse>, ApiError> {
    // An empty or null body clears the registry
    let requested: Vec<String> = if body.iter().all(u8::is_ascii_whitespace) {
        Vec::new()
    } else {
        serde_json::from_slice::<Option<Vec<String>>>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Expected a JSON array of addresses: {}", e)))?
            .unwrap_or_default()
    };

    let addresses = validate_addresses(&requested)?;
    info!("Processing set-addresses request with {} addresses", addresses.len());

    let result = info_service::set_addresses(&state, &addresses).await?;
    Ok(JsonResponse::accepted(result))
}

// GET /all-info handler
async fn get_all_info(
    State(state): State<Arc<AppState>>,
) -> Result<JsonResponse<InfoResponse>, ApiError> {
    let result = info_service::all_info(&state).await?;
    Ok(JsonResponse::ok(result))
}

// GET /info?addresses=a|b|c handler
async fn get_info(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InfoQuery>,
) -> Result<JsonResponse<InfoResponse>, ApiError> {
    let addresses = parse_address_list(&params.addresses)?;
    info!("Processing info request for: {}", addresses.join("|"));

    let result = info_service::info(&state, &addresses).await?;
    Ok(JsonResponse::ok(result))
}
