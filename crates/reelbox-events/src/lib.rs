//! Reelbox Events
//!
//! Publishes `VideoProcessingEvent`s to the downstream transcoding channel.
//! Two backends exist: a Postgres outbox with `pg_notify`, and Amazon SQS.

pub mod error;
pub mod factory;
pub mod pg_notify;
pub mod publisher;
#[cfg(feature = "events-sqs")]
pub mod sqs;

pub use error::PublishError;
pub use factory::create_publisher;
pub use pg_notify::{notify_channel, PgNotifyPublisher};
pub use publisher::{EventPublisher, MessageId};
pub use reelbox_core::models::VideoProcessingEvent;
#[cfg(feature = "events-sqs")]
pub use sqs::SqsPublisher;
