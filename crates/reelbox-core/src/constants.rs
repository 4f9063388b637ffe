//! Limits and defaults shared across crates.

/// Video file extensions accepted for upload when none are configured.
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "avi", "mov", "mkv", "flv", "wmv"];

/// 5 GiB.
pub const DEFAULT_MAX_VIDEO_SIZE_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Status assigned to every freshly inserted metadata row.
pub const INITIAL_VIDEO_STATUS: &str = "uploaded";

pub const DEFAULT_VISIBILITY: &str = "private";

/// Visibility used by the public search endpoint and the owner listing default.
pub const PUBLIC_VISIBILITY: &str = "public";

/// Owner id recorded when the upload form carries none.
pub const ANONYMOUS_OWNER_ID: &str = "anonymous";

/// Row cap for owner listings.
pub const LIST_BY_OWNER_LIMIT: i64 = 100;

/// Row cap for public search.
pub const SEARCH_LIMIT: i64 = 50;

pub const DEFAULT_AUDIT_LOG_LIMIT: i64 = 50;
pub const MAX_AUDIT_LOG_LIMIT: i64 = 500;

/// Logical topic for transcoding requests.
pub const DEFAULT_EVENT_TOPIC: &str = "video-processing-topic";
