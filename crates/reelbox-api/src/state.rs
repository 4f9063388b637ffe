//! Application state shared by all handlers.

use std::sync::Arc;
use std::time::Duration;

use reelbox_core::Config;
use reelbox_db::{MetadataStore, PoolManager};
use reelbox_events::EventPublisher;
use reelbox_storage::BlobUploader;

use crate::services::UploadOrchestrator;

/// Default and ceiling for `GET /audit-log?limit=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditLimits {
    pub default: i64,
    pub max: i64,
}

impl AuditLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default: config.audit_log_default_limit(),
            max: config.audit_log_max_limit(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MetadataStore>,
    pub uploads: UploadOrchestrator,
    pub pool: Arc<PoolManager>,
    pub audit_limits: AuditLimits,
}

impl AppState {
    pub fn new(
        store: Arc<dyn MetadataStore>,
        uploader: BlobUploader,
        publisher: Arc<dyn EventPublisher>,
        pool: Arc<PoolManager>,
        publish_timeout: Duration,
        audit_limits: AuditLimits,
    ) -> Self {
        Self {
            uploads: UploadOrchestrator::new(store.clone(), uploader, publisher, publish_timeout),
            store,
            pool,
            audit_limits,
        }
    }

    pub fn uploader(&self) -> &BlobUploader {
        self.uploads.uploader()
    }
}
