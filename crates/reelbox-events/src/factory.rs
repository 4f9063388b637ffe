use std::sync::Arc;

use reelbox_core::{Config, EventBackend};
use reelbox_db::PoolManager;

use crate::error::PublishError;
use crate::pg_notify::PgNotifyPublisher;
use crate::publisher::EventPublisher;
#[cfg(feature = "events-sqs")]
use crate::sqs::SqsPublisher;

/// Create the event publisher selected by `EVENT_BACKEND`.
pub async fn create_publisher(
    config: &Config,
    pool: Arc<PoolManager>,
) -> Result<Arc<dyn EventPublisher>, PublishError> {
    let topic = config.event_topic().to_string();

    match config.event_backend() {
        EventBackend::Postgres => Ok(Arc::new(PgNotifyPublisher::new(pool, topic))),

        #[cfg(feature = "events-sqs")]
        EventBackend::Sqs => {
            let queue_url = config
                .sqs_queue_url()
                .map(String::from)
                .ok_or_else(|| PublishError::Config("SQS_QUEUE_URL not configured".to_string()))?;
            Ok(Arc::new(SqsPublisher::new(queue_url, topic).await?))
        }

        #[cfg(not(feature = "events-sqs"))]
        EventBackend::Sqs => Err(PublishError::Config(
            "SQS event backend not available (events-sqs feature not enabled)".to_string(),
        )),
    }
}
