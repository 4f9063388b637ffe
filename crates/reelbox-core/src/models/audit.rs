use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Append-only audit record. Written by other services; read here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLogEntry {
    pub id: i64,
    pub video_id: Option<Uuid>,
    pub user_id: Option<String>,
    pub action: String,
    pub details: Option<JsonValue>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub audit_logs: Vec<AuditLogEntry>,
    pub count: usize,
}

impl From<Vec<AuditLogEntry>> for AuditLogResponse {
    fn from(audit_logs: Vec<AuditLogEntry>) -> Self {
        let count = audit_logs.len();
        Self { audit_logs, count }
    }
}
