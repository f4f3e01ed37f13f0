//! tracing subscriber setup
//!
//! Console output is always on. When `logging.local_enabled` is set, a JSON layer
//! also writes to a rolling `courier.log` under `logging.local_path`.

use crate::config::LoggingConfig;
use crate::domain::{CourierError, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "courier.log";

/// Keeps the non-blocking file writer alive; drop it last so buffered lines
/// are flushed
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `log_level` when set.
///
/// # Errors
///
/// Returns a configuration error for an unknown level or rotation, when the
/// log directory cannot be created, or when a global subscriber is already
/// installed.
///
/// # Example
///
/// ```no_run
/// use courier::config::LoggingConfig;
/// use courier::logging::init_logging;
///
/// let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
/// tracing::info!("ready");
/// ```
pub fn init_logging(log_level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(log_level)?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("courier={level}")));

    let mut layers = Vec::new();
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_filter(env_filter.clone())
            .boxed(),
    );

    let file_guard = if config.local_enabled {
        let rotation = parse_rotation(&config.local_rotation)?;
        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            CourierError::Configuration(format!(
                "Failed to create log directory {}: {e}",
                config.local_path
            ))
        })?;

        let appender = RollingFileAppender::new(rotation, &config.local_path, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(writer)
                .with_filter(env_filter)
                .boxed(),
        );
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| CourierError::Configuration(format!("Failed to install logger: {e}")))?;

    tracing::debug!(
        level = %level,
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(CourierError::Configuration(format!(
            "Invalid log level: {level}. Must be one of: trace, debug, info, warn, error"
        ))),
    }
}

fn parse_rotation(rotation: &str) -> Result<Rotation> {
    match rotation {
        "daily" => Ok(Rotation::DAILY),
        "hourly" => Ok(Rotation::HOURLY),
        other => Err(CourierError::Configuration(format!(
            "Invalid local_rotation '{other}'. Must be one of: daily, hourly"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_valid() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_case_insensitive() {
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("Debug").unwrap(), Level::DEBUG);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert!(parse_rotation("daily").is_ok());
        assert!(parse_rotation("hourly").is_ok());
        assert!(parse_rotation("size").is_err());
    }

    #[test]
    fn test_bad_level_fails_before_installing() {
        let err = init_logging("loud", &LoggingConfig::default()).err().unwrap();
        assert!(err.to_string().contains("Invalid log level"));
    }
}
