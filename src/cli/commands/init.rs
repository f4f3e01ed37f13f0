//! Init command implementation
//!
//! Writes a starter `courier.toml`.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "courier.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set COURIER_INSTRUMENTATION_KEY in your environment or .env");
                println!("  2. Adjust the endpoint and storage settings in {}", self.output);
                println!("  3. Validate configuration: courier validate-config");
                println!("  4. Send a batch: courier send envelopes.json");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_config() -> String {
        r#"# Courier Configuration File

[application]
# trace, debug, info, warn, error
log_level = "info"

[exporter]
instrumentation_key = "${COURIER_INSTRUMENTATION_KEY}"
endpoint_url = "https://dc.services.visualstudio.com"
# auth_token = "${COURIER_AUTH_TOKEN}"
timeout_seconds = 30
# Delay between a successful send and the next retry-queue drain
retry_interval_ms = 60000

[storage]
path = "/var/lib/courier"
# 50 MiB
max_bytes_on_disk = 52428800
# 7 days
retention_seconds = 604800
# reject_new | evict_oldest
eviction = "reject_new"

[logging]
local_enabled = false
local_path = "/var/log/courier"
# daily | hourly
local_rotation = "daily"
local_max_size_mb = 100
"#
        .to_string()
    }
}
