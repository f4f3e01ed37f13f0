//! Status command implementation
//!
//! Reports the retry queue size for the configured tenant.

use crate::config::load_config;
use crate::core::persist::{FileSystemQueue, PersistentQueue};
use crate::domain::InstrumentationKey;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the queue as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        let key = match InstrumentationKey::new(config.exporter.instrumentation_key.as_str()) {
            Ok(k) => k,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let queue = FileSystemQueue::new(&config.storage, &key);
        let stats = match queue.stats().await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to read retry queue: {e}");
                return Ok(5);
            }
        };

        if self.json {
            let report = serde_json::json!({
                "directory": queue.directory(),
                "records": stats.records,
                "bytes": stats.bytes,
                "max_bytes_on_disk": config.storage.max_bytes_on_disk,
                "eviction": config.storage.eviction.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(0);
        }

        let used_pct = if config.storage.max_bytes_on_disk == 0 {
            0.0
        } else {
            stats.bytes as f64 / config.storage.max_bytes_on_disk as f64 * 100.0
        };

        println!("📊 Retry Queue Status");
        println!();
        println!("  Directory: {}", queue.directory().display());
        println!("  Queued batches: {}", stats.records);
        println!(
            "  Disk usage: {} / {} bytes ({used_pct:.1}%)",
            stats.bytes, config.storage.max_bytes_on_disk
        );
        println!("  Eviction policy: {}", config.storage.eviction);
        println!(
            "  Retention: {}h",
            config.storage.retention_seconds / 3600
        );

        if stats.records > 0 {
            println!();
            println!("Run 'courier drain' to re-send queued batches.");
        }

        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_args_default_is_table() {
        let args = StatusArgs { json: false };
        assert!(!args.json);
    }
}
