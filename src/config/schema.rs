//! Configuration schema types
//!
//! This module defines the configuration structure for Courier.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Courier configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Ingestion endpoint and delivery settings
    pub exporter: ExporterConfig,

    /// Retry queue storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CourierConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.exporter.validate()?;
        self.storage.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Ingestion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Instrumentation key of the tenant that owns exported telemetry
    #[serde(default)]
    pub instrumentation_key: String,

    /// Base URL of the ingestion endpoint
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,

    /// Optional bearer token sent with every request
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub auth_token: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Delay between a successful send and the next retry-queue drain, in milliseconds
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            instrumentation_key: String::new(),
            endpoint_url: default_endpoint_url(),
            auth_token: None,
            timeout_seconds: default_timeout_seconds(),
            retry_interval_ms: default_retry_interval_ms(),
        }
    }
}

impl ExporterConfig {
    fn validate(&self) -> Result<(), String> {
        if self.instrumentation_key.trim().is_empty() {
            return Err(
                "exporter.instrumentation_key is required: no instrumentation key was provided"
                    .to_string(),
            );
        }

        match url::Url::parse(&self.endpoint_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(format!(
                    "exporter.endpoint_url must use http or https, got '{}'",
                    url.scheme()
                ))
            }
            Err(e) => {
                return Err(format!(
                    "Invalid exporter.endpoint_url '{}': {e}",
                    self.endpoint_url
                ))
            }
        }

        if self.timeout_seconds == 0 {
            return Err("exporter.timeout_seconds must be > 0".to_string());
        }

        if self.retry_interval_ms == 0 {
            return Err("exporter.retry_interval_ms must be > 0".to_string());
        }

        Ok(())
    }
}

/// What the retry queue does when a push would exceed its disk budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvictionPolicy {
    /// Refuse the new batch; push reports failure
    #[default]
    RejectNew,
    /// Delete the oldest records until the new batch fits
    EvictOldest,
}

impl std::fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvictionPolicy::RejectNew => write!(f, "reject_new"),
            EvictionPolicy::EvictOldest => write!(f, "evict_oldest"),
        }
    }
}

/// Retry queue storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory; each tenant gets its own subdirectory
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Disk budget for queued records, per tenant, in bytes
    #[serde(default = "default_max_bytes_on_disk")]
    pub max_bytes_on_disk: u64,

    /// Records older than this are discarded instead of retried
    #[serde(default = "default_retention_seconds")]
    pub retention_seconds: u64,

    /// Behaviour when the disk budget is exhausted
    #[serde(default)]
    pub eviction: EvictionPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            max_bytes_on_disk: default_max_bytes_on_disk(),
            retention_seconds: default_retention_seconds(),
            eviction: EvictionPolicy::default(),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("storage.path must not be empty".to_string());
        }
        if self.max_bytes_on_disk == 0 {
            return Err("storage.max_bytes_on_disk must be > 0".to_string());
        }
        if self.retention_seconds == 0 {
            return Err("storage.retention_seconds must be > 0".to_string());
        }
        if self.retention_seconds > MAX_RETENTION_SECONDS {
            return Err(format!(
                "storage.retention_seconds must be <= {MAX_RETENTION_SECONDS} (10 years)"
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,

    /// Maximum log file size in MB
    #[serde(default = "default_local_max_size_mb")]
    pub local_max_size_mb: usize,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_max_size_mb == 0 {
            return Err("logging.local_max_size_mb must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
            local_max_size_mb: default_local_max_size_mb(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_endpoint_url() -> String {
    "https://dc.services.visualstudio.com".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_retry_interval_ms() -> u64 {
    60_000
}

fn default_storage_path() -> PathBuf {
    std::env::temp_dir().join("courier")
}

fn default_max_bytes_on_disk() -> u64 {
    50 * 1024 * 1024
}

/// Upper bound on `storage.retention_seconds` (10 years)
pub const MAX_RETENTION_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

fn default_retention_seconds() -> u64 {
    7 * 24 * 60 * 60
}

fn default_local_path() -> String {
    "/var/log/courier".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

fn default_local_max_size_mb() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_exporter() -> ExporterConfig {
        ExporterConfig {
            instrumentation_key: "ikey-123".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig {
            log_level: "info".to_string(),
        };

        assert!(config.validate().is_ok());

        config.log_level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exporter_config_requires_instrumentation_key() {
        let config = ExporterConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.contains("instrumentation_key"));

        assert!(valid_exporter().validate().is_ok());
    }

    #[test]
    fn test_exporter_config_rejects_bad_endpoint() {
        let mut config = valid_exporter();

        config.endpoint_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.endpoint_url = "ftp://dc.example.com".to_string();
        assert!(config.validate().unwrap_err().contains("http or https"));
    }

    #[test]
    fn test_exporter_config_rejects_zero_intervals() {
        let mut config = valid_exporter();
        config.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = valid_exporter();
        config.retry_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_config_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.max_bytes_on_disk, 50 * 1024 * 1024);
        assert_eq!(config.retention_seconds, 604_800);
        assert_eq!(config.eviction, EvictionPolicy::RejectNew);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_storage_config_validation() {
        let mut config = StorageConfig::default();
        config.max_bytes_on_disk = 0;
        assert!(config.validate().is_err());

        let mut config = StorageConfig::default();
        config.retention_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = StorageConfig::default();
        config.retention_seconds = u64::MAX;
        assert!(config.validate().is_err());

        let mut config = StorageConfig::default();
        config.retention_seconds = MAX_RETENTION_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_eviction_policy_parsing() {
        #[derive(Deserialize)]
        struct Wrapper {
            eviction: EvictionPolicy,
        }

        let parsed: Wrapper = toml::from_str("eviction = \"evict_oldest\"").unwrap();
        assert_eq!(parsed.eviction, EvictionPolicy::EvictOldest);
        assert_eq!(parsed.eviction.to_string(), "evict_oldest");

        assert!(toml::from_str::<Wrapper>("eviction = \"drop_everything\"").is_err());
    }

    #[test]
    fn test_logging_config_validation() {
        let config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        let mut config = LoggingConfig::default();
        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: CourierConfig = toml::from_str(
            r#"
[exporter]
instrumentation_key = "ikey-123"
"#,
        )
        .unwrap();

        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.exporter.endpoint_url, "https://dc.services.visualstudio.com");
        assert_eq!(config.exporter.retry_interval_ms, 60_000);
        assert!(config.validate().is_ok());
    }
}
