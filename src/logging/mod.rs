//! Logging and observability
//!
//! Structured logging through `tracing`, plus a handful of macros so the export
//! path reports the same fields everywhere.
//!
//! # Example
//!
//! ```no_run
//! use courier::config::LoggingConfig;
//! use courier::logging::init_logging;
//!
//! let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
//! tracing::info!(envelope_count = 3, "Exporting");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export call
///
/// # Example
///
/// ```no_run
/// use courier::log_export_start;
///
/// log_export_start!(25);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($envelope_count:expr) => {
        tracing::debug!(envelope_count = $envelope_count, "Starting export");
    };
}

/// Log the end of an export call with its result
///
/// # Example
///
/// ```no_run
/// use courier::domain::ExportResult;
/// use courier::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(25, &ExportResult::Success, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($envelope_count:expr, $result:expr, $duration:expr) => {
        match $result.error() {
            None => tracing::info!(
                envelope_count = $envelope_count,
                duration_ms = $duration.as_millis() as u64,
                "Export completed"
            ),
            Some(error) => tracing::warn!(
                envelope_count = $envelope_count,
                duration_ms = $duration.as_millis() as u64,
                error = %error,
                "Export failed"
            ),
        }
    };
}

/// Log a batch handed to the retry queue
///
/// # Example
///
/// ```no_run
/// use courier::log_batch_persisted;
///
/// log_batch_persisted!(3, 5);
/// ```
#[macro_export]
macro_rules! log_batch_persisted {
    ($persisted:expr, $submitted:expr) => {
        tracing::info!(
            persisted = $persisted,
            submitted = $submitted,
            "Queued envelopes for retry"
        );
    };
}

/// Log a redirect the exporter is about to follow
///
/// # Example
///
/// ```no_run
/// use courier::log_redirect_followed;
///
/// log_redirect_followed!("https://westeurope.in.example.com", 1, 10);
/// ```
#[macro_export]
macro_rules! log_redirect_followed {
    ($location:expr, $count:expr, $max:expr) => {
        tracing::info!(
            location = %$location,
            redirect = $count,
            max_redirects = $max,
            "Following redirect"
        );
    };
}
