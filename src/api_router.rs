//! API Router
//!
//! Combines the endpoints of every module into one router.

use axum::{routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::shared::state::AppState;

/// Configure all API routes from all modules
pub fn configure_api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handle_health))
        .merge(crate::contacts::configure_contacts_routes())
}

/// Router with state and middleware applied, ready to serve.
pub fn api_router(state: Arc<AppState>) -> Router {
    configure_api_routes()
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
