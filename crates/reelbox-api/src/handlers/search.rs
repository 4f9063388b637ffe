use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use reelbox_core::models::VideoListResponse;
use reelbox_db::SearchQuery;
use serde::Deserialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub owner_id: Option<String>,
    pub status: Option<String>,
}

/// `GET /search?q=&owner_id=&status=`
///
/// Public videos only. A request with neither `q` nor `owner_id` is rejected
/// before the store is touched.
#[tracing::instrument(skip(state), fields(operation = "search_videos"))]
pub async fn search_videos(
    Query(params): Query<SearchParams>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let query = SearchQuery::new(params.q, params.owner_id, params.status)?;
    let videos = state.store.search(&query).await?;

    Ok(Json(VideoListResponse::from(videos)))
}
