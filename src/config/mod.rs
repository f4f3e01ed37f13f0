//! Configuration management for Courier.
//!
//! Courier uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `COURIER_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use courier::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("courier.toml")?;
//! println!("Endpoint: {}", config.exporter.endpoint_url);
//! println!("Queue directory: {}", config.storage.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ExporterConfig`] - Tenant key, ingestion endpoint, timeouts, retry interval
//! - [`StorageConfig`] - Retry queue location, disk budget, retention, eviction
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [exporter]
//! instrumentation_key = "${COURIER_INSTRUMENTATION_KEY}"
//! endpoint_url = "https://dc.services.visualstudio.com"
//! retry_interval_ms = 60000
//!
//! [storage]
//! path = "/var/lib/courier"
//! max_bytes_on_disk = 52428800
//! eviction = "reject_new"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CourierConfig, EvictionPolicy, ExporterConfig, LoggingConfig,
    StorageConfig, MAX_RETENTION_SECONDS,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
