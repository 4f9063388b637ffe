//! Shared key generation for storage backends.
//!
//! Key format: `uploads/{owner_id}/{video_id}/{filename}`.

use uuid::Uuid;

use crate::traits::{StorageError, StorageResult};

pub const UPLOADS_PREFIX: &str = "uploads";

/// Deterministic key for one uploaded video. The id is fresh per upload, so keys never collide.
///
/// Callers pass an owner id and filename that have already been validated.
pub fn video_object_key(owner_id: &str, video_id: Uuid, filename: &str) -> String {
    format!("{}/{}/{}/{}", UPLOADS_PREFIX, owner_id, video_id, filename)
}

/// Reject keys that could escape a backend's namespace.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment == ".." || segment == ".")
    {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_layout() {
        let id = Uuid::parse_str("6f1c0c1e-8a4b-4c2e-9d7a-3b5f2e1d0a9c").unwrap();
        assert_eq!(
            video_object_key("u1", id, "clip.mp4"),
            "uploads/u1/6f1c0c1e-8a4b-4c2e-9d7a-3b5f2e1d0a9c/clip.mp4"
        );
    }

    #[test]
    fn rejects_escaping_keys() {
        assert!(validate_key("uploads/u1/x/clip.mp4").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("uploads/../../etc").is_err());
        assert!(validate_key("uploads/u1/./clip.mp4").is_err());
        assert!(validate_key("uploads/u1/x/my..clip.mp4").is_ok());
        assert!(validate_key("uploads\\u1").is_err());
    }
}
