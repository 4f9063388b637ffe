use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of `video_metadata`.
///
/// `original_filename`, `gcs_original_path`, `file_size_bytes`, `owner_user_id`
/// and `upload_timestamp` are written once at insert and never touched again;
/// the remaining columns change only through the allow-listed update path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoMetadata {
    pub video_id: Uuid,
    pub original_filename: String,
    pub gcs_original_path: String,
    pub file_size_bytes: i64,
    pub owner_user_id: String,
    pub status: String,
    pub transcoding_status: Option<String>,
    pub visibility: String,
    pub download_allowed: bool,
    pub upload_timestamp: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection returned by owner listings and public search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VideoSummary {
    pub video_id: Uuid,
    pub original_filename: String,
    pub owner_user_id: String,
    pub status: String,
    pub transcoding_status: Option<String>,
    pub visibility: String,
    pub download_allowed: bool,
    pub file_size_bytes: i64,
    pub upload_timestamp: DateTime<Utc>,
}

impl From<VideoMetadata> for VideoSummary {
    fn from(row: VideoMetadata) -> Self {
        Self {
            video_id: row.video_id,
            original_filename: row.original_filename,
            owner_user_id: row.owner_user_id,
            status: row.status,
            transcoding_status: row.transcoding_status,
            visibility: row.visibility,
            download_allowed: row.download_allowed,
            file_size_bytes: row.file_size_bytes,
            upload_timestamp: row.upload_timestamp,
        }
    }
}

/// Values the orchestrator hands to the store when recording a stored object.
#[derive(Debug, Clone)]
pub struct NewVideoMetadata {
    pub video_id: Uuid,
    pub original_filename: String,
    pub storage_path: String,
    pub file_size_bytes: i64,
    pub owner_user_id: String,
}

#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoSummary>,
    pub count: usize,
}

impl From<Vec<VideoSummary>> for VideoListResponse {
    fn from(videos: Vec<VideoSummary>) -> Self {
        let count = videos.len();
        Self { videos, count }
    }
}
