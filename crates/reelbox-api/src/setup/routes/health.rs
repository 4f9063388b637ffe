//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness of the metadata database: `SELECT 1` under a five second bound.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let check = match tokio::time::timeout(TIMEOUT, state.pool.health_check()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("database check timed out after {}s", TIMEOUT.as_secs())),
    };

    match check {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            })),
        ),
        Err(error) => {
            tracing::error!(error = %error, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "error": error,
                })),
            )
        }
    }
}
