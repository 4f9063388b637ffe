use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use reelbox_core::AppError;
use reelbox_db::VideoMetadataUpdate;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidInput(format!("Invalid video id: {}", raw)))
}

/// `GET /metadata/{video_id}`
#[tracing::instrument(skip(state), fields(operation = "get_metadata"))]
pub async fn get_metadata(
    Path(video_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;

    let video = state
        .store
        .get(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    Ok(Json(video))
}

/// `PUT /metadata/{video_id}`
///
/// Keys outside the allow-list are dropped. A body left with nothing to
/// apply is answered with 422 rather than a silent success.
#[tracing::instrument(skip(state, body), fields(operation = "update_metadata"))]
pub async fn update_metadata(
    Path(video_id): Path<String>,
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<JsonValue>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;

    let JsonValue::Object(fields) = body else {
        return Err(AppError::InvalidInput("Request body must be a JSON object".to_string()).into());
    };

    let update = VideoMetadataUpdate::from_json_map(&fields)?;
    state.store.update(video_id, &update).await?;

    tracing::info!(video_id = %video_id, "Metadata updated");

    Ok(Json(serde_json::json!({
        "success": true,
        "video_id": video_id,
    })))
}
