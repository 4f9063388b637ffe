use std::time::Duration;

use reelbox_core::AppError;
use reelbox_db::PoolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Event channel unavailable: {0}")]
    Pool(#[from] PoolError),

    #[error("Database error while publishing: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Event backend error: {0}")]
    Backend(String),

    #[error("Publish timed out after {0:?}")]
    Timeout(Duration),

    #[error("Event publisher misconfigured: {0}")]
    Config(String),
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        match err {
            PublishError::Pool(e) => e.into(),
            PublishError::Timeout(_) => AppError::BackendUnavailable(err.to_string()),
            PublishError::Config(msg) => AppError::Internal(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}
