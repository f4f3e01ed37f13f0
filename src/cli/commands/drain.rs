//! Drain command implementation
//!
//! Re-sends queued batches one at a time until the queue is empty, a limit is
//! reached, a shutdown signal arrives, or the endpoint answers with a retriable
//! failure. In the last case the batch goes back on the queue for a later run.

use crate::config::load_config;
use crate::core::export::Exporter;
use crate::core::schedule::DrainOutcome;
use crate::domain::CourierError;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the drain command
#[derive(Args, Debug)]
pub struct DrainArgs {
    /// Stop after this many batches
    #[arg(long)]
    pub max: Option<usize>,
}

/// Totals for one drain run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct DrainTotals {
    batches: usize,
    delivered: usize,
    dropped: usize,
    requeued: usize,
}

impl DrainArgs {
    /// Execute the drain command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let exporter = match Exporter::from_config(&config) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("❌ Failed to initialize exporter: {e}");
                return Ok(2);
            }
        };

        tracing::info!(max = ?self.max, "Draining retry queue");
        println!("🔄 Draining retry queue...");

        let totals = match self.run(&exporter, &shutdown_signal).await {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "Drain failed");
                eprintln!("❌ Drain failed: {e}");
                exporter.shutdown().await?;
                return Ok(5);
            }
        };

        println!();
        println!("📊 Drain Summary:");
        println!("  Batches: {}", totals.batches);
        println!("  Envelopes delivered: {}", totals.delivered);
        println!("  Batches dropped: {}", totals.dropped);
        println!("  Batches kept for later: {}", totals.requeued);

        exporter.shutdown().await?;
        Ok(if totals.dropped > 0 || totals.requeued > 0 {
            1
        } else {
            0
        })
    }

    async fn run(
        &self,
        exporter: &Exporter,
        shutdown_signal: &watch::Receiver<bool>,
    ) -> crate::domain::Result<DrainTotals> {
        let mut totals = DrainTotals::default();

        while self.max.map_or(true, |max| totals.batches < max) {
            if *shutdown_signal.borrow() {
                println!("⚠️  Shutdown requested, stopping drain");
                break;
            }

            match exporter.scheduler().drain_once_or_requeue().await {
                Ok(DrainOutcome::Empty) => break,
                Ok(DrainOutcome::Delivered { envelopes }) => {
                    totals.batches += 1;
                    totals.delivered += envelopes;
                }
                Ok(DrainOutcome::SendFailed { reason }) => {
                    totals.batches += 1;
                    totals.dropped += 1;
                    println!("  ↳ dropped a batch: {reason}");
                }
                Ok(DrainOutcome::Requeued { reason }) => {
                    totals.batches += 1;
                    totals.requeued += 1;
                    println!("  ↳ endpoint unavailable ({reason}), stopping drain");
                    break;
                }
                // The unreadable record is already gone; move on to the next one
                Err(CourierError::Serialization(e)) => {
                    tracing::warn!(error = %e, "Skipping unreadable retry record");
                    totals.batches += 1;
                    totals.dropped += 1;
                    println!("  ↳ discarded an unreadable record");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(totals)
    }
}
