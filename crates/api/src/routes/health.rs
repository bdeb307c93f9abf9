//! Public service information and health checks.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::config::{API_PREFIX, PROJECT_NAME, VERSION};
use crate::state::AppState;

/// `GET /`
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": format!("Welcome to {PROJECT_NAME}"),
        "version": VERSION,
        "api": API_PREFIX,
    }))
}

/// Liveness health check endpoint.
///
/// Returns "healthy" if the server is running. Does not check dependencies.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": PROJECT_NAME,
        "version": VERSION,
    }))
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store does not answer a ping.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.health().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ready"}))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable"})),
            )
        }
    }
}
