use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use reelbox_core::models::AuditLogResponse;
use reelbox_core::AppError;
use reelbox_db::AuditLogQuery;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Raw query values, parsed by hand so malformed input gets our 400 body.
#[derive(Debug, Deserialize)]
pub struct AuditLogParams {
    pub video_id: Option<String>,
    pub user_id: Option<String>,
    pub limit: Option<String>,
}

fn parse_optional<T: std::str::FromStr>(
    name: &str,
    raw: Option<String>,
) -> Result<Option<T>, AppError> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {}: {}", name, value))),
    }
}

/// `GET /audit-log?video_id=&user_id=&limit=`
#[tracing::instrument(skip(state), fields(operation = "audit_log"))]
pub async fn get_audit_log(
    Query(params): Query<AuditLogParams>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id: Option<Uuid> = parse_optional("video_id", params.video_id)?;
    let limit: Option<i64> = parse_optional("limit", params.limit)?;

    let query = AuditLogQuery::new(
        video_id,
        params.user_id,
        limit,
        state.audit_limits.default,
        state.audit_limits.max,
    )?;

    let entries = state.store.audit_log(&query).await?;

    Ok(Json(AuditLogResponse::from(entries)))
}
