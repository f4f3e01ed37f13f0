//! Send command implementation
//!
//! Exports a JSON file of envelopes through the full delivery path: redirects are
//! followed, and retriable failures land in the retry queue.

use crate::config::load_config;
use crate::core::export::Exporter;
use crate::core::schedule::DrainOutcome;
use crate::domain::{Batch, CourierError, ExportResult};
use clap::Args;
use std::path::{Path, PathBuf};
use tokio::sync::watch;

/// Arguments for the send command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// JSON file holding an array of envelopes
    pub file: PathBuf,

    /// After a successful send, also drain the retry queue
    #[arg(long)]
    pub drain: bool,
}

impl SendArgs {
    /// Execute the send command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let batch = match read_batch(&self.file, &config.exporter.instrumentation_key) {
            Ok(batch) => batch,
            Err(e) => {
                eprintln!("❌ Failed to read {}: {e}", self.file.display());
                return Ok(5);
            }
        };
        if batch.is_empty() {
            println!("Nothing to send: {} holds no envelopes", self.file.display());
            return Ok(0);
        }

        let exporter = match Exporter::from_config(&config) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("❌ Failed to initialize exporter: {e}");
                return Ok(2);
            }
        };

        tracing::info!(
            file = %self.file.display(),
            envelope_count = batch.len(),
            "Sending batch"
        );
        println!("🚀 Sending {} envelope(s)...", batch.len());

        let result = tokio::select! {
            result = exporter.export(batch) => result,
            _ = shutdown_signal.changed() => {
                println!("⚠️  Interrupted before the send completed");
                exporter.shutdown().await?;
                return Ok(5);
            }
        };

        let exit_code = match &result {
            ExportResult::Success => {
                println!("✅ Export succeeded");
                if self.drain {
                    drain_all(&exporter, &mut shutdown_signal).await?;
                }
                0
            }
            ExportResult::Failed(error) => {
                println!("❌ Export failed: {error}");
                3
            }
        };

        exporter.shutdown().await?;
        Ok(exit_code)
    }
}

/// Parse a JSON array of envelopes, stamping the configured key on envelopes
/// that carry none
fn read_batch(path: &Path, instrumentation_key: &str) -> anyhow::Result<Batch> {
    let contents = std::fs::read_to_string(path)?;
    let batch: Batch = serde_json::from_str(&contents)?;

    Ok(batch
        .into_iter()
        .map(|envelope| match envelope.instrumentation_key {
            Some(_) => envelope,
            None => envelope.with_instrumentation_key(instrumentation_key),
        })
        .collect::<Vec<_>>()
        .into())
}

async fn drain_all(
    exporter: &Exporter,
    shutdown_signal: &mut watch::Receiver<bool>,
) -> anyhow::Result<()> {
    loop {
        if *shutdown_signal.borrow() {
            return Ok(());
        }
        match exporter.scheduler().drain_once_or_requeue().await {
            Ok(DrainOutcome::Empty) => return Ok(()),
            Ok(DrainOutcome::Delivered { envelopes }) => {
                println!("  ↳ delivered {envelopes} queued envelope(s)");
            }
            Ok(DrainOutcome::SendFailed { reason }) => {
                println!("  ↳ dropped a queued batch: {reason}");
            }
            Ok(DrainOutcome::Requeued { reason }) => {
                println!("  ↳ endpoint unavailable ({reason}), leaving the rest queued");
                return Ok(());
            }
            Err(CourierError::Serialization(e)) => {
                tracing::warn!(error = %e, "Skipping unreadable retry record");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_batch_fills_missing_keys() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name":"a","time":"2025-01-01T00:00:00Z"}},
                {{"name":"b","time":"2025-01-01T00:00:01Z","iKey":"other"}}
            ]"#
        )
        .unwrap();

        let batch = read_batch(file.path(), "ikey-cli").unwrap();
        let keys: Vec<_> = batch
            .iter()
            .map(|e| e.instrumentation_key.clone().unwrap())
            .collect();
        assert_eq!(keys, vec!["ikey-cli", "other"]);
    }

    #[test]
    fn test_read_batch_rejects_non_array() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"name":"a"}}"#).unwrap();

        assert!(read_batch(file.path(), "ikey").is_err());
    }
}
