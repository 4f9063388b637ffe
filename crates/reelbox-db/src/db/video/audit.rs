use std::sync::Arc;

use reelbox_core::models::AuditLogEntry;

use crate::db::composer::{FilterBuilder, FilterColumn};
use crate::db::store::AuditLogQuery;
use crate::error::StoreError;
use crate::pool::PoolManager;

/// Read access to the append-only `audit_log` table.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: Arc<PoolManager>,
}

impl AuditLogRepository {
    pub fn new(pool: Arc<PoolManager>) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "audit_log", db.operation = "select", limit = query.limit()))]
    pub async fn list(&self, query: &AuditLogQuery) -> Result<Vec<AuditLogEntry>, StoreError> {
        let filter = FilterBuilder::new(1)
            .eq_opt(FilterColumn::VideoId, query.video_id)
            .eq_opt(FilterColumn::UserId, query.user_id.clone())
            .build();

        let sql = format!(
            "SELECT id, video_id, user_id, action, details, timestamp FROM audit_log {} \
             ORDER BY timestamp DESC LIMIT ${}",
            filter.sql(),
            filter.next_placeholder()
        );

        let mut conn = self.pool.acquire().await?;
        let rows = filter
            .bind_to(sqlx::query_as::<_, AuditLogEntry>(&sql))
            .bind(query.limit())
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }
}
