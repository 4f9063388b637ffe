use std::sync::Arc;

use async_trait::async_trait;
use reelbox_core::constants::{INITIAL_VIDEO_STATUS, LIST_BY_OWNER_LIMIT, PUBLIC_VISIBILITY, SEARCH_LIMIT};
use reelbox_core::models::{AuditLogEntry, NewVideoMetadata, VideoMetadata, VideoSummary};
use uuid::Uuid;

use super::audit::AuditLogRepository;
use crate::db::composer::{compose_set, FilterBuilder, FilterColumn, VideoMetadataUpdate};
use crate::db::store::{AuditLogQuery, MetadataStore, SearchQuery};
use crate::db::transaction::TransactionGuard;
use crate::error::StoreError;
use crate::pool::PoolManager;

const METADATA_COLUMNS: &str = "video_id, original_filename, gcs_original_path, file_size_bytes, \
     owner_user_id, status, transcoding_status, visibility, download_allowed, \
     upload_timestamp, updated_at";

const SUMMARY_COLUMNS: &str = "video_id, original_filename, owner_user_id, status, \
     transcoding_status, visibility, download_allowed, file_size_bytes, upload_timestamp";

/// Postgres implementation of `MetadataStore`.
///
/// Every call checks a connection out of the shared pool for the duration of
/// one statement (or one transaction for inserts).
#[derive(Clone)]
pub struct VideoMetadataRepository {
    pool: Arc<PoolManager>,
    audit: AuditLogRepository,
}

impl VideoMetadataRepository {
    pub fn new(pool: Arc<PoolManager>) -> Self {
        Self {
            audit: AuditLogRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl MetadataStore for VideoMetadataRepository {
    #[tracing::instrument(
        skip(self, video),
        fields(db.table = "video_metadata", db.operation = "insert", video_id = %video.video_id)
    )]
    async fn insert(&self, video: &NewVideoMetadata) -> Result<(), StoreError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO video_metadata
                (video_id, original_filename, gcs_original_path, file_size_bytes, owner_user_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(video.video_id)
        .bind(&video.original_filename)
        .bind(&video.storage_path)
        .bind(video.file_size_bytes)
        .bind(&video.owner_user_id)
        .bind(INITIAL_VIDEO_STATUS)
        .execute(&mut **tx)
        .await;

        match result {
            Ok(_) => {
                tx.commit().await?;
                tracing::info!(video_id = %video.video_id, "Video metadata inserted");
                Ok(())
            }
            Err(e) => {
                tx.abort("insert video_metadata").await;
                Err(StoreError::from_insert(e, video.video_id))
            }
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_metadata", db.operation = "select", db.record_id = %video_id))]
    async fn get(&self, video_id: Uuid) -> Result<Option<VideoMetadata>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!(
            "SELECT {} FROM video_metadata WHERE video_id = $1",
            METADATA_COLUMNS
        );
        let row = sqlx::query_as::<_, VideoMetadata>(&sql)
            .bind(video_id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "video_metadata", db.operation = "update", db.record_id = %video_id))]
    async fn update(
        &self,
        video_id: Uuid,
        update: &VideoMetadataUpdate,
    ) -> Result<(), StoreError> {
        let Some(set) = compose_set(update, 1) else {
            return Err(StoreError::NoOp);
        };

        let sql = format!(
            "UPDATE video_metadata SET {}, updated_at = NOW() WHERE video_id = ${}",
            set.sql(),
            set.next_placeholder()
        );

        let mut conn = self.pool.acquire().await?;
        let result = set
            .bind_to(sqlx::query(&sql))
            .bind(video_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(video_id));
        }

        tracing::info!(video_id = %video_id, "Video metadata updated");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "video_metadata", db.operation = "select"))]
    async fn list_by_owner(
        &self,
        owner_id: &str,
        visibility: &str,
    ) -> Result<Vec<VideoSummary>, StoreError> {
        let filter = FilterBuilder::new(1)
            .eq(FilterColumn::OwnerUserId, owner_id)
            .eq(FilterColumn::Visibility, visibility)
            .build();

        let sql = format!(
            "SELECT {} FROM video_metadata {} ORDER BY upload_timestamp DESC LIMIT ${}",
            SUMMARY_COLUMNS,
            filter.sql(),
            filter.next_placeholder()
        );

        let mut conn = self.pool.acquire().await?;
        let rows = filter
            .bind_to(sqlx::query_as::<_, VideoSummary>(&sql))
            .bind(LIST_BY_OWNER_LIMIT)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "video_metadata", db.operation = "search", has_text = query.text().is_some()))]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<VideoSummary>, StoreError> {
        let filter = FilterBuilder::new(1)
            .eq(FilterColumn::Visibility, PUBLIC_VISIBILITY)
            .contains_ci_opt(FilterColumn::OriginalFilename, query.text())
            .eq_opt(FilterColumn::OwnerUserId, query.owner_id())
            .eq_opt(FilterColumn::Status, query.status())
            .build();

        let sql = format!(
            "SELECT {} FROM video_metadata {} ORDER BY upload_timestamp DESC LIMIT ${}",
            SUMMARY_COLUMNS,
            filter.sql(),
            filter.next_placeholder()
        );

        let mut conn = self.pool.acquire().await?;
        let rows = filter
            .bind_to(sqlx::query_as::<_, VideoSummary>(&sql))
            .bind(SEARCH_LIMIT)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    async fn audit_log(&self, query: &AuditLogQuery) -> Result<Vec<AuditLogEntry>, StoreError> {
        self.audit.list(query).await
    }
}
