//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CourierConfig, EvictionPolicy};
use super::secret::secret_string;
use crate::domain::errors::CourierError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CourierConfig
/// 4. Applies environment variable overrides (COURIER_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use courier::config::loader::load_config;
///
/// let config = load_config("courier.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CourierConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CourierError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CourierError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CourierConfig = toml::from_str(&contents)
        .map_err(|e| CourierError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CourierError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CourierError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CourierError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using COURIER_* prefix
///
/// Environment variables follow the pattern: COURIER_<SECTION>_<KEY>
/// For example: COURIER_EXPORTER_ENDPOINT_URL, COURIER_STORAGE_PATH
fn apply_env_overrides(config: &mut CourierConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("COURIER_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Exporter overrides
    if let Ok(val) = std::env::var("COURIER_EXPORTER_INSTRUMENTATION_KEY") {
        config.exporter.instrumentation_key = val;
    }
    if let Ok(val) = std::env::var("COURIER_EXPORTER_ENDPOINT_URL") {
        config.exporter.endpoint_url = val;
    }
    if let Ok(val) = std::env::var("COURIER_EXPORTER_AUTH_TOKEN") {
        config.exporter.auth_token = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("COURIER_EXPORTER_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.exporter.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("COURIER_EXPORTER_RETRY_INTERVAL_MS") {
        if let Ok(interval) = val.parse() {
            config.exporter.retry_interval_ms = interval;
        }
    }

    // Storage overrides
    if let Ok(val) = std::env::var("COURIER_STORAGE_PATH") {
        config.storage.path = PathBuf::from(val);
    }
    if let Ok(val) = std::env::var("COURIER_STORAGE_MAX_BYTES_ON_DISK") {
        if let Ok(bytes) = val.parse() {
            config.storage.max_bytes_on_disk = bytes;
        }
    }
    if let Ok(val) = std::env::var("COURIER_STORAGE_RETENTION_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.storage.retention_seconds = seconds;
        }
    }
    if let Ok(val) = std::env::var("COURIER_STORAGE_EVICTION") {
        config.storage.eviction = match val.to_lowercase().as_str() {
            "reject_new" => EvictionPolicy::RejectNew,
            "evict_oldest" => EvictionPolicy::EvictOldest,
            other => {
                return Err(CourierError::Configuration(format!(
                    "Invalid COURIER_STORAGE_EVICTION '{other}'. Must be one of: reject_new, evict_oldest"
                )))
            }
        };
    }

    // Logging overrides
    if let Ok(val) = std::env::var("COURIER_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("COURIER_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
