//! Domain error types
//!
//! Two layers of errors live here. [`CourierError`] is the plumbing error used by
//! fallible setup and storage code through [`crate::domain::Result`]. [`ExportError`]
//! is the caller-visible failure taxonomy carried by a failed
//! [`ExportResult`](crate::domain::ExportResult); it never escapes as a panic or
//! an `Err` from `export`.

use thiserror::Error;

/// Main Courier error type
///
/// Wraps configuration, storage and transport plumbing failures. None of the
/// variants expose third-party types.
#[derive(Debug, Error)]
pub enum CourierError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Sender (transport) setup or redirect errors
    #[error("Sender error: {0}")]
    Sender(String),

    /// Retry queue storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Why an export call failed
///
/// Transient network faults and retriable server rejections are not listed:
/// they end up in the retry queue, and only surface here as [`ExportError::Persistence`]
/// when the queue cannot take the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The endpoint rejected the batch with a status that is not worth retrying.
    /// Data is dropped.
    #[error("Envelopes were rejected with non-retriable status {status}")]
    NonRetriable { status: u16 },

    /// A partial-failure report listed no retriable envelopes. Data is dropped.
    #[error("Partial failure reported {rejected} rejected envelope(s), none retriable")]
    NoRetriableEnvelopes { rejected: usize },

    /// The partial-failure body could not be parsed, so the batch cannot be
    /// filtered safely.
    #[error("Malformed partial-failure response: {0}")]
    MalformedResponse(String),

    /// Too many consecutive redirects were followed.
    #[error("Circular redirect: gave up after {redirects} consecutive redirects")]
    RedirectLoop { redirects: u32 },

    /// The retry queue could not durably accept the batch. This is the
    /// documented data-loss boundary.
    #[error("Failed to persist envelopes to disk: {0}")]
    Persistence(String),

    /// Any other transport failure, surfaced verbatim.
    #[error("Envelopes could not be exported and are not retriable: {0}")]
    Transport(String),

    /// The exporter has been shut down.
    #[error("Exporter is shut down")]
    Shutdown,
}

// Conversion from std::io::Error
impl From<std::io::Error> for CourierError {
    fn from(err: std::io::Error) -> Self {
        CourierError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CourierError {
    fn from(err: serde_json::Error) -> Self {
        CourierError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CourierError {
    fn from(err: toml::de::Error) -> Self {
        CourierError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_courier_error_display() {
        let err = CourierError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_export_error_display() {
        let err = ExportError::RedirectLoop { redirects: 10 };
        assert_eq!(
            err.to_string(),
            "Circular redirect: gave up after 10 consecutive redirects"
        );

        let err = ExportError::NonRetriable { status: 400 };
        assert!(err.to_string().contains("400"));
    }

    #[test]
    fn test_persistence_error_mentions_disk() {
        let err = ExportError::Persistence("disk full".to_string());
        assert!(err.to_string().contains("persist"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: CourierError = io_err.into();
        assert!(matches!(err, CourierError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: CourierError = json_err.into();
        assert!(matches!(err, CourierError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: CourierError = toml_err.into();
        assert!(matches!(err, CourierError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let err = CourierError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
        let err = ExportError::Shutdown;
        let _: &dyn std::error::Error = &err;
    }
}
