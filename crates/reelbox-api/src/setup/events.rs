//! Event publisher setup

use anyhow::{Context, Result};
use reelbox_core::Config;
use reelbox_db::PoolManager;
use reelbox_events::{create_publisher, EventPublisher};
use std::sync::Arc;

pub async fn setup_publisher(
    config: &Config,
    pool: Arc<PoolManager>,
) -> Result<Arc<dyn EventPublisher>> {
    let publisher = create_publisher(config, pool)
        .await
        .context("Failed to initialize event publisher")?;
    tracing::info!(
        backend = publisher.backend_name(),
        topic = %config.event_topic(),
        "Event publisher initialized"
    );
    Ok(publisher)
}
