//! Metadata store contract.

use async_trait::async_trait;
use reelbox_core::models::{AuditLogEntry, NewVideoMetadata, VideoMetadata, VideoSummary};
use reelbox_core::validation::resolve_audit_limit;
use uuid::Uuid;

use crate::db::composer::VideoMetadataUpdate;
use crate::error::StoreError;

/// Typed reads and writes over `video_metadata` and `audit_log`.
///
/// This is the only writer of metadata rows.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a row with `status = 'uploaded'`. `Conflict` if the id exists.
    async fn insert(&self, video: &NewVideoMetadata) -> Result<(), StoreError>;

    async fn get(&self, video_id: Uuid) -> Result<Option<VideoMetadata>, StoreError>;

    /// `NoOp` when the update carries no allow-listed field, `NotFound` when no row matched.
    async fn update(&self, video_id: Uuid, update: &VideoMetadataUpdate)
        -> Result<(), StoreError>;

    async fn list_by_owner(
        &self,
        owner_id: &str,
        visibility: &str,
    ) -> Result<Vec<VideoSummary>, StoreError>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoSummary>, StoreError>;

    async fn audit_log(&self, query: &AuditLogQuery) -> Result<Vec<AuditLogEntry>, StoreError>;
}

/// Public search filters. At least one of `text` / `owner_id` is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    text: Option<String>,
    owner_id: Option<String>,
    status: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SearchQuery {
    pub fn new(
        text: Option<String>,
        owner_id: Option<String>,
        status: Option<String>,
    ) -> Result<Self, StoreError> {
        let text = non_blank(text);
        let owner_id = non_blank(owner_id);
        if text.is_none() && owner_id.is_none() {
            return Err(StoreError::InvalidInput(
                "Provide search query or owner_id".to_string(),
            ));
        }
        Ok(Self {
            text,
            owner_id,
            status: non_blank(status),
        })
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Audit log filters with a bounded limit.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLogQuery {
    pub video_id: Option<Uuid>,
    pub user_id: Option<String>,
    limit: i64,
}

impl AuditLogQuery {
    /// `limit` defaults to `default_limit`, is clamped to `max_limit` and must be at least 1.
    pub fn new(
        video_id: Option<Uuid>,
        user_id: Option<String>,
        limit: Option<i64>,
        default_limit: i64,
        max_limit: i64,
    ) -> Result<Self, StoreError> {
        let limit = resolve_audit_limit(limit, default_limit, max_limit)
            .map_err(|e| StoreError::InvalidInput(e.to_string()))?;
        Ok(Self {
            video_id,
            user_id: non_blank(user_id),
            limit,
        })
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}
