//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Endpoint: {}", config.exporter.endpoint_url);
        println!(
            "  Auth Token: {}",
            if config.exporter.auth_token.is_some() {
                "configured"
            } else {
                "none"
            }
        );
        println!("  Timeout: {}s", config.exporter.timeout_seconds);
        println!("  Retry Interval: {}ms", config.exporter.retry_interval_ms);
        println!("  Storage Path: {}", config.storage.path.display());
        println!("  Disk Budget: {} bytes", config.storage.max_bytes_on_disk);
        println!("  Eviction: {}", config.storage.eviction);
        println!();
        Ok(0)
    }
}
