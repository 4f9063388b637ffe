pub mod audit;
pub mod metadata;
pub mod search;
pub mod upload;
pub mod videos;

use axum::{http::StatusCode, response::IntoResponse, Json};

/// Fallback for unmatched routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Endpoint not found" })),
    )
}
