use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat payload asking the transcoding pipeline to process a stored video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoProcessingEvent {
    pub video_id: Uuid,
    pub gcs_path: String,
    pub owner_id: String,
    /// RFC 3339 emission time.
    pub timestamp: String,
}

impl VideoProcessingEvent {
    pub fn new(video_id: Uuid, gcs_path: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self::at(video_id, gcs_path, owner_id, Utc::now())
    }

    pub fn at(
        video_id: Uuid,
        gcs_path: impl Into<String>,
        owner_id: impl Into<String>,
        emitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            video_id,
            gcs_path: gcs_path.into(),
            owner_id: owner_id.into(),
            timestamp: emitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn payload_is_flat_json() {
        let id = Uuid::nil();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let event = VideoProcessingEvent::at(id, "uploads/u1/x/clip.mp4", "u1", at);

        let value = serde_json::to_value(&event).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["video_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(obj["gcs_path"], "uploads/u1/x/clip.mp4");
        assert_eq!(obj["owner_id"], "u1");
        assert_eq!(obj["timestamp"], "2024-05-01T12:00:00.000Z");
    }
}
