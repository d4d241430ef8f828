// Handlers module
// HTTP handlers for the GraphQL endpoint and monitoring

pub mod graphql;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::warn;

use crate::state::AppState;

/// Health check handler
/// Returns "OK" when the datastore answers, 503 otherwise
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
        }
    }
}
