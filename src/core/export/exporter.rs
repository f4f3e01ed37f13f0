//! Export orchestrator
//!
//! Drives one `export` call: send, classify, then deliver, queue, follow a
//! redirect or fail. Every path ends in an [`ExportResult`]; nothing is raised
//! across the `export` boundary.

use super::redirect::{RedirectState, MAX_REDIRECTS};
use crate::adapters::sender::{HttpSender, Sender};
use crate::config::CourierConfig;
use crate::core::classify::{classify, Verdict};
use crate::core::persist::{FileSystemQueue, PersistentQueue};
use crate::core::schedule::RetryScheduler;
use crate::domain::{Batch, CourierError, ExportError, ExportResult, InstrumentationKey, Result};
use crate::{log_batch_persisted, log_export_complete, log_export_start, log_redirect_followed};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Delivers batches with redirect handling and a disk-backed retry fallback
///
/// Safe to share across tasks: concurrent `export` calls each keep their own
/// redirect count, and the retry timer is armed at most once at a time.
///
/// # Example
///
/// ```no_run
/// use courier::config::load_config;
/// use courier::core::export::Exporter;
/// use courier::domain::{Batch, Envelope};
///
/// # async fn example() -> courier::domain::Result<()> {
/// let config = load_config("courier.toml")?;
/// let exporter = Exporter::from_config(&config)?;
///
/// let result = exporter.export(Batch::new(vec![Envelope::new("evt")])).await;
/// println!("delivered: {}", result.is_success());
///
/// exporter.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct Exporter {
    sender: Arc<dyn Sender>,
    queue: Arc<dyn PersistentQueue>,
    scheduler: RetryScheduler,
    shut_down: AtomicBool,
}

impl Exporter {
    /// Create an exporter from its collaborators
    pub fn new(
        sender: Arc<dyn Sender>,
        queue: Arc<dyn PersistentQueue>,
        retry_interval: Duration,
    ) -> Self {
        let scheduler = RetryScheduler::new(queue.clone(), sender.clone(), retry_interval);
        Self {
            sender,
            queue,
            scheduler,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Build the HTTP sender and file-system queue described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the instrumentation key or endpoint is invalid, or
    /// the HTTP client cannot be built.
    pub fn from_config(config: &CourierConfig) -> Result<Self> {
        let key = InstrumentationKey::new(config.exporter.instrumentation_key.as_str())
            .map_err(CourierError::Configuration)?;
        let sender = Arc::new(HttpSender::new(&config.exporter)?);
        let queue = Arc::new(FileSystemQueue::new(&config.storage, &key));

        tracing::debug!(
            endpoint = %config.exporter.endpoint_url,
            storage = %queue.directory().display(),
            "Exporter configured"
        );

        Ok(Self::new(
            sender,
            queue,
            Duration::from_millis(config.exporter.retry_interval_ms),
        ))
    }

    /// Retry timer owned by this exporter
    pub fn scheduler(&self) -> &RetryScheduler {
        &self.scheduler
    }

    /// Retry queue used for fallback
    pub fn queue(&self) -> &Arc<dyn PersistentQueue> {
        &self.queue
    }

    /// Returns true once [`shutdown`](Self::shutdown) has been called
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Deliver one batch
    ///
    /// Returns `Success` when the endpoint accepted the batch, or when the
    /// retriable part of it was durably queued. Every other outcome is a
    /// `Failed` result describing why the data was not kept.
    pub async fn export(&self, batch: Batch) -> ExportResult {
        let started = Instant::now();
        log_export_start!(batch.len());

        let result = self.export_chain(&batch).await;

        log_export_complete!(batch.len(), &result, started.elapsed());
        result
    }

    async fn export_chain(&self, batch: &Batch) -> ExportResult {
        let mut redirects = RedirectState::new();

        loop {
            if self.is_shut_down() {
                return ExportError::Shutdown.into();
            }

            let outcome = self.sender.send(batch).await;
            let verdict = classify(&outcome, batch.len());

            match verdict {
                Verdict::Success => {
                    self.scheduler.arm();
                    return ExportResult::Success;
                }
                Verdict::RetryAll => return self.persist(batch, batch.len()).await,
                Verdict::RetryPartial(indices) => {
                    return self.persist(&batch.select(&indices), batch.len()).await;
                }
                Verdict::Redirect(location) => {
                    if !redirects.record() {
                        tracing::warn!(
                            redirects = redirects.count(),
                            location = %location,
                            "Redirect limit reached"
                        );
                        return ExportError::RedirectLoop {
                            redirects: redirects.count(),
                        }
                        .into();
                    }
                    if let Err(e) = self.sender.handle_permanent_redirect(&location) {
                        return ExportError::Transport(e.to_string()).into();
                    }
                    log_redirect_followed!(location, redirects.count(), MAX_REDIRECTS);
                }
                Verdict::Reject(error) => {
                    tracing::debug!(outcome = %outcome, "Batch rejected");
                    return error.into();
                }
            }
        }
    }

    async fn persist(&self, batch: &Batch, submitted: usize) -> ExportResult {
        if self.queue.push(batch).await {
            log_batch_persisted!(batch.len(), submitted);
            ExportResult::Success
        } else {
            ExportError::Persistence(format!(
                "retry queue did not accept {} envelope(s)",
                batch.len()
            ))
            .into()
        }
    }

    /// Stop the retry timer and the sender
    ///
    /// Outstanding exports are not awaited and the retry queue is not flushed.
    /// Later `export` calls fail with [`ExportError::Shutdown`]. Calling this
    /// twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the sender's shutdown error, if any.
    pub async fn shutdown(&self) -> Result<()> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.scheduler.cancel();
        self.sender.shutdown().await?;
        tracing::info!("Exporter shut down");
        Ok(())
    }
}
