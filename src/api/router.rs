use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::state::AppState;
use super::webhook;

/// Create the full router with application state
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints (no state needed)
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        // Event ingress
        .route("/webhook", post(webhook::enqueue_webhook))
        .route("/workflows/run", post(webhook::run_workflow))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
