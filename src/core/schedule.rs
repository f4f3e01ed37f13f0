//! Retry scheduler
//!
//! A single-shot background timer. After a successful export the exporter arms it;
//! when it fires it takes the oldest batch from the retry queue and hands it
//! straight to the sender. A failed re-send is logged and the batch is dropped, so
//! one poisoned batch cannot bounce between queue and endpoint forever.

use crate::adapters::sender::Sender;
use crate::core::classify::{classify, Verdict};
use crate::core::persist::PersistentQueue;
use crate::domain::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Result of one drain step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Nothing was queued
    Empty,
    /// A queued batch was delivered
    Delivered { envelopes: usize },
    /// A queued batch was sent but not accepted; it has been dropped
    SendFailed { reason: String },
    /// A queued batch hit a retriable failure and was put back on the queue
    Requeued { reason: String },
}

/// What to do with a batch whose re-send fails with a retriable verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnRetriable {
    Drop,
    Requeue,
}

/// Shared handles used by both the timer task and manual drains
#[derive(Clone)]
struct Drainer {
    queue: Arc<dyn PersistentQueue>,
    sender: Arc<dyn Sender>,
}

impl Drainer {
    async fn drain_once(&self, on_retriable: OnRetriable) -> Result<DrainOutcome> {
        let Some(batch) = self.queue.shift().await? else {
            return Ok(DrainOutcome::Empty);
        };

        let outcome = self.sender.send(&batch).await;
        let retry = match classify(&outcome, batch.len()) {
            Verdict::Success => {
                tracing::info!(
                    envelope_count = batch.len(),
                    "Delivered batch from retry queue"
                );
                return Ok(DrainOutcome::Delivered {
                    envelopes: batch.len(),
                });
            }
            Verdict::RetryAll => Some(batch.clone()),
            Verdict::RetryPartial(indices) => Some(batch.select(&indices)),
            Verdict::Redirect(_) | Verdict::Reject(_) => None,
        };

        if let (Some(retry), OnRetriable::Requeue) = (retry, on_retriable) {
            if self.queue.push(&retry).await {
                tracing::info!(
                    envelope_count = retry.len(),
                    outcome = %outcome,
                    "Retry send failed, batch put back on the queue"
                );
                return Ok(DrainOutcome::Requeued {
                    reason: outcome.to_string(),
                });
            }
        }

        tracing::warn!(
            envelope_count = batch.len(),
            outcome = %outcome,
            "Retry send failed, dropping batch"
        );
        Ok(DrainOutcome::SendFailed {
            reason: outcome.to_string(),
        })
    }
}

/// Background drain timer for one exporter
pub struct RetryScheduler {
    drainer: Drainer,
    interval: Duration,
    armed: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl RetryScheduler {
    /// Create an idle scheduler that fires `interval` after each arm
    pub fn new(
        queue: Arc<dyn PersistentQueue>,
        sender: Arc<dyn Sender>,
        interval: Duration,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            drainer: Drainer { queue, sender },
            interval,
            armed: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            pending: Mutex::new(None),
        }
    }

    /// Returns true while a drain is pending
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Returns true once [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Arm the timer unless it is already pending or cancelled
    ///
    /// Must be called from within a tokio runtime. Returns true if this call
    /// armed the timer.
    pub fn arm(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        if self
            .armed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let drainer = self.drainer.clone();
        let armed = self.armed.clone();
        let interval = self.interval;
        let mut shutdown = self.shutdown_tx.subscribe();

        // Hold the slot while spawning so a later arm cannot be overwritten
        // by this (possibly already finished) task's handle
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        *pending = Some(tokio::spawn(async move {
            // cancel() may have run between the check above and subscribe()
            if *shutdown.borrow_and_update() {
                armed.store(false, Ordering::SeqCst);
                return;
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {
                    armed.store(false, Ordering::SeqCst);
                    return;
                }
            }

            armed.store(false, Ordering::SeqCst);
            if let Err(e) = drainer.drain_once(OnRetriable::Drop).await {
                tracing::warn!(error = %e, "Retry drain failed");
            }
        }));
        drop(pending);

        tracing::debug!(
            interval_ms = self.interval.as_millis() as u64,
            "Retry drain armed"
        );
        true
    }

    /// Run one drain step immediately
    ///
    /// # Errors
    ///
    /// Returns an error if the retry queue cannot be read.
    pub async fn drain_once(&self) -> Result<DrainOutcome> {
        self.drainer.drain_once(OnRetriable::Drop).await
    }

    /// Run one drain step, putting the batch back on the queue when the
    /// re-send fails with a retriable outcome
    ///
    /// Used by operator-driven drains, which stop at the first
    /// [`DrainOutcome::Requeued`] instead of emptying the queue into an
    /// unreachable endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the retry queue cannot be read.
    pub async fn drain_once_or_requeue(&self) -> Result<DrainOutcome> {
        self.drainer.drain_once(OnRetriable::Requeue).await
    }

    /// Stop the timer for good
    ///
    /// A pending drain is aborted; later calls to [`arm`](Self::arm) do nothing.
    pub fn cancel(&self) {
        let _ = self.shutdown_tx.send_replace(true);

        let handle = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        self.armed.store(false, Ordering::SeqCst);
    }
}

impl Drop for RetryScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
