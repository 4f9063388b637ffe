use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use reelbox_core::constants::PUBLIC_VISIBILITY;
use reelbox_core::models::VideoListResponse;
use reelbox_core::validation::validate_owner_id;
use serde::Deserialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OwnerVideosQuery {
    pub visibility: Option<String>,
}

/// `GET /videos/{owner_id}?visibility=`
#[tracing::instrument(skip(state, query), fields(operation = "list_owner_videos"))]
pub async fn list_owner_videos(
    Path(owner_id): Path<String>,
    Query(query): Query<OwnerVideosQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    validate_owner_id(&owner_id)?;

    let visibility = query
        .visibility
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| PUBLIC_VISIBILITY.to_string());

    let videos = state.store.list_by_owner(&owner_id, &visibility).await?;

    Ok(Json(VideoListResponse::from(videos)))
}
