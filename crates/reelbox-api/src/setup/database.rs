//! Database setup and initialization

use anyhow::{Context, Result};
use reelbox_core::Config;
use reelbox_db::{PoolManager, PoolSettings};
use std::sync::Arc;

/// Migrations from the workspace `migrations/` directory, embedded at build time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Connect the pool eagerly and apply pending migrations.
pub async fn setup_database(config: &Config) -> Result<Arc<PoolManager>> {
    let manager = PoolManager::new(PoolSettings::from_config(config))
        .context("Invalid database pool settings")?;
    manager
        .init()
        .await
        .context("Failed to connect to database")?;

    let pool = manager.pool().await?;
    MIGRATOR
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(manager))
}
