//! Retry queue abstraction

use crate::domain::{Batch, Result};
use async_trait::async_trait;

/// Size of a retry queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// Number of queued batches
    pub records: usize,
    /// Bytes used on disk
    pub bytes: u64,
}

/// Durable FIFO of batches awaiting re-delivery, scoped to one tenant
#[async_trait]
pub trait PersistentQueue: Send + Sync {
    /// Durably store a batch
    ///
    /// Returns `false` when the batch could not be stored (disk full, write
    /// error, over budget). Callers must surface that as a failure.
    async fn push(&self, batch: &Batch) -> bool;

    /// Remove and return the oldest batch, or `None` when empty
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read, or if the oldest record
    /// is unreadable; that record is discarded so the queue keeps moving.
    async fn shift(&self) -> Result<Option<Batch>>;

    /// Current queue size
    async fn stats(&self) -> Result<QueueStats>;
}
