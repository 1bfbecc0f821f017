//! Route table for the search API.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;
use super::state::AppState;

/// Build the router with every API endpoint.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(handlers::search))
        .route("/api/stations", post(handlers::station_batch))
        .route("/api/stations/{id}", get(handlers::station))
        .route("/api/config", get(handlers::client_config))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(state)
}
