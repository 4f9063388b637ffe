//! Database transaction utilities
//!
//! Multi-statement writes (metadata insert, event outbox + notify) run inside a
//! `TransactionGuard` so a failure rolls back before the connection goes back
//! to the pool.

use sqlx::{Postgres, Transaction};
use std::ops::{Deref, DerefMut};

use crate::error::StoreError;
use crate::pool::PoolManager;

/// A database transaction wrapper with explicit commit/rollback
///
/// # Example
///
/// ```ignore
/// use reelbox_db::TransactionGuard;
///
/// async fn example(pool: &reelbox_db::PoolManager) -> Result<(), reelbox_db::StoreError> {
///     let mut tx = TransactionGuard::begin(pool).await?;
///     sqlx::query("INSERT INTO ...").execute(&mut **tx).await?;
///     tx.commit().await?;
///     Ok(())
/// }
/// ```
pub struct TransactionGuard {
    transaction: Option<Transaction<'static, Postgres>>,
}

impl TransactionGuard {
    /// Begin a new database transaction on a connection checked out from `pool`
    pub async fn begin(pool: &PoolManager) -> Result<Self, StoreError> {
        let transaction = pool.begin().await?;
        Ok(Self {
            transaction: Some(transaction),
        })
    }

    /// Commit the transaction
    pub async fn commit(mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.transaction.take() {
            tx.commit().await?;
        }
        Ok(())
    }

    /// Rollback the transaction
    pub async fn rollback(mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.transaction.take() {
            tx.rollback().await?;
        }
        Ok(())
    }

    /// Roll back after a failed statement, logging (not returning) a rollback fault
    /// so the original error reaches the caller.
    pub async fn abort(self, operation: &'static str) {
        if let Err(e) = self.rollback().await {
            tracing::error!(error = %e, operation, "Transaction rollback failed");
        }
    }
}

impl Deref for TransactionGuard {
    type Target = Transaction<'static, Postgres>;

    fn deref(&self) -> &Self::Target {
        self.transaction
            .as_ref()
            .expect("Transaction was already committed or rolled back")
    }
}

impl DerefMut for TransactionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.transaction
            .as_mut()
            .expect("Transaction was already committed or rolled back")
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        // sqlx queues a ROLLBACK when a live transaction is dropped; the
        // connection is returned to the pool either way.
        if self.transaction.is_some() {
            tracing::warn!(
                "Transaction was dropped without explicit commit or rollback - rolling back"
            );
        }
    }
}
