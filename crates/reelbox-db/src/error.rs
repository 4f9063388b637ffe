use reelbox_core::AppError;
use uuid::Uuid;

use crate::pool::PoolError;

/// Failures of the metadata store.
///
/// `Conflict`, `NotFound` and `NoOp` are outcomes a caller can act on and are
/// kept apart from backend faults.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("video {0} already exists")]
    Conflict(Uuid),

    #[error("video {0} not found")]
    NotFound(Uuid),

    #[error("No valid fields to update")]
    NoOp,

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify an insert failure, turning a primary-key collision into `Conflict`.
    pub(crate) fn from_insert(err: sqlx::Error, video_id: Uuid) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(video_id)
            }
            _ => StoreError::Database(err),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => AppError::Conflict(err.to_string()),
            StoreError::NotFound(id) => AppError::NotFound(format!("Video {} not found", id)),
            StoreError::NoOp => AppError::NoOp(err.to_string()),
            StoreError::InvalidInput(msg) => AppError::InvalidInput(msg),
            StoreError::Pool(e) => e.into(),
            StoreError::Database(e) => e.into(),
        }
    }
}
