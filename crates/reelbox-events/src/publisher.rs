use std::fmt;

use async_trait::async_trait;
use reelbox_core::models::VideoProcessingEvent;

use crate::error::PublishError;

/// Backend-assigned identifier of a published message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sends processing events downstream. Delivery is at-least-once; consumers dedupe on `video_id`.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &VideoProcessingEvent) -> Result<MessageId, PublishError>;

    fn backend_name(&self) -> &'static str;
}
