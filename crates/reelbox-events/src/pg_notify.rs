//! Postgres outbox publisher.
//!
//! Each event is written to `video_events` and announced with `pg_notify` in the
//! same transaction, so a listener never sees a notification for a row that was
//! rolled back. Consumers that miss a notification can still read the outbox.

use std::sync::Arc;

use async_trait::async_trait;
use reelbox_core::models::VideoProcessingEvent;
use reelbox_db::PoolManager;

use crate::error::PublishError;
use crate::publisher::{EventPublisher, MessageId};

/// Postgres identifiers are capped at 63 bytes.
const MAX_CHANNEL_LENGTH: usize = 63;

/// LISTEN-friendly channel name for a topic: lowercase, non-alphanumerics become `_`.
pub fn notify_channel(topic: &str) -> String {
    topic
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .take(MAX_CHANNEL_LENGTH)
        .collect()
}

#[derive(Clone)]
pub struct PgNotifyPublisher {
    pool: Arc<PoolManager>,
    topic: String,
    channel: String,
}

impl PgNotifyPublisher {
    pub fn new(pool: Arc<PoolManager>, topic: impl Into<String>) -> Self {
        let topic = topic.into();
        Self {
            channel: notify_channel(&topic),
            pool,
            topic,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl EventPublisher for PgNotifyPublisher {
    #[tracing::instrument(
        skip(self, event),
        fields(event.topic = %self.topic, video_id = %event.video_id)
    )]
    async fn publish(&self, event: &VideoProcessingEvent) -> Result<MessageId, PublishError> {
        let payload = serde_json::to_value(event)?;
        let start = std::time::Instant::now();

        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO video_events (topic, payload) VALUES ($1, $2) RETURNING id",
        )
        .bind(&self.topic)
        .bind(&payload)
        .fetch_one(&mut *tx)
        .await?;

        // A failed NOTIFY aborts the transaction, so it is not treated as best-effort.
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(&self.channel)
            .bind(payload.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            event_id = id,
            channel = %self.channel,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video processing event stored and notified"
        );

        Ok(MessageId(id.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_name_is_listen_safe() {
        assert_eq!(notify_channel("video-processing-topic"), "video_processing_topic");
        assert_eq!(notify_channel("Mixed.Case Topic"), "mixed_case_topic");
        assert_eq!(notify_channel(&"x".repeat(100)).len(), 63);
    }
}
