use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::services::UploadRequest;
use crate::state::AppState;
use crate::utils::multipart::read_upload_form;

const ACCEPTED_MESSAGE: &str = "Video uploaded successfully. Processing started.";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub video_id: Uuid,
    pub gcs_path: String,
    pub message: String,
    pub policy_applied: bool,
    pub event_published: bool,
}

/// `POST /upload`
///
/// Answers 202 once the object and its row exist. A failed policy update or
/// event publish still yields 202, flagged in the body.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = read_upload_form(multipart, state.uploader()).await?;

    let request = UploadRequest {
        owner_id: form.owner_id,
        filename: form.file.filename,
        content_type: form.file.content_type,
        visibility: form.visibility,
        download_allowed: form.download_allowed,
        content: Box::pin(form.file.file),
        size: form.file.size,
    };

    let outcome = state.uploads.run(request).await?;

    let response = UploadResponse {
        success: true,
        video_id: outcome.video_id,
        gcs_path: outcome.storage_path,
        message: ACCEPTED_MESSAGE.to_string(),
        policy_applied: outcome.policy_applied,
        event_published: outcome.event.is_published(),
    };

    Ok((StatusCode::ACCEPTED, Json(response)))
}
