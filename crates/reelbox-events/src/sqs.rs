use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::MessageAttributeValue;
use aws_sdk_sqs::Client;
use reelbox_core::models::VideoProcessingEvent;

use crate::error::PublishError;
use crate::publisher::{EventPublisher, MessageId};

const TOPIC_ATTRIBUTE: &str = "topic";

/// Publishes events as SQS messages, tagging each with its logical topic.
#[derive(Clone)]
pub struct SqsPublisher {
    client: Client,
    queue_url: String,
    topic: String,
}

/// `https://sqs.{region}.amazonaws.com/{account}/{queue}` → `{region}`.
pub(crate) fn region_from_queue_url(queue_url: &str) -> Option<String> {
    let host = queue_url
        .split("://")
        .nth(1)?
        .split('/')
        .next()?;
    let mut labels = host.split('.');
    if labels.next()? != "sqs" {
        return None;
    }
    let region = labels.next()?;
    if region.is_empty() || region == "amazonaws" {
        return None;
    }
    Some(region.to_string())
}

impl SqsPublisher {
    /// Build a client from the default AWS credential chain.
    ///
    /// The region comes from the queue URL when it names one, otherwise from the environment.
    pub async fn new(queue_url: String, topic: String) -> Result<Self, PublishError> {
        if queue_url.trim().is_empty() {
            return Err(PublishError::Config("SQS_QUEUE_URL is empty".to_string()));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region_from_queue_url(&queue_url) {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        tracing::info!(queue_url = %queue_url, topic = %topic, "SQS event publisher initialized");

        Ok(Self::with_client(Client::new(&config), queue_url, topic))
    }

    pub fn with_client(client: Client, queue_url: String, topic: String) -> Self {
        Self {
            client,
            queue_url,
            topic,
        }
    }

    fn topic_attribute(&self) -> Result<MessageAttributeValue, PublishError> {
        MessageAttributeValue::builder()
            .data_type("String")
            .string_value(&self.topic)
            .build()
            .map_err(|e| PublishError::Backend(e.to_string()))
    }
}

#[async_trait]
impl EventPublisher for SqsPublisher {
    #[tracing::instrument(
        skip(self, event),
        fields(event.topic = %self.topic, video_id = %event.video_id)
    )]
    async fn publish(&self, event: &VideoProcessingEvent) -> Result<MessageId, PublishError> {
        let body = serde_json::to_string(event)?;
        let start = std::time::Instant::now();

        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .message_attributes(TOPIC_ATTRIBUTE, self.topic_attribute()?)
            .send()
            .await
            .map_err(|e| PublishError::Backend(DisplayErrorContext(&e).to_string()))?;

        let message_id = output
            .message_id()
            .map(str::to_string)
            .ok_or_else(|| PublishError::Backend("SQS returned no message id".to_string()))?;

        tracing::debug!(
            message_id = %message_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video processing event sent to SQS"
        );

        Ok(MessageId(message_id))
    }

    fn backend_name(&self) -> &'static str {
        "sqs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_is_read_from_queue_url() {
        assert_eq!(
            region_from_queue_url("https://sqs.eu-west-1.amazonaws.com/123456789012/videos"),
            Some("eu-west-1".to_string())
        );
        assert_eq!(region_from_queue_url("http://localhost:4566/000000000000/videos"), None);
        assert_eq!(region_from_queue_url("not a url"), None);
    }

    #[test]
    fn topic_attribute_is_a_string_attribute() {
        let config = aws_sdk_sqs::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_config::Region::new("us-east-1"))
            .build();
        let publisher = SqsPublisher::with_client(
            Client::from_conf(config),
            "https://sqs.us-east-1.amazonaws.com/1/videos".to_string(),
            "video-processing-topic".to_string(),
        );

        let attribute = publisher.topic_attribute().unwrap();
        assert_eq!(attribute.data_type(), "String");
        assert_eq!(attribute.string_value(), Some("video-processing-topic"));
        assert_eq!(publisher.backend_name(), "sqs");
    }
}
