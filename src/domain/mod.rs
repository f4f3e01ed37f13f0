//! Domain models and types for Courier.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Telemetry records** ([`Envelope`], [`Batch`], [`PropertyValue`])
//! - **Strongly-typed identifiers** ([`InstrumentationKey`])
//! - **Error types** ([`CourierError`], [`ExportError`])
//! - **Result types** ([`Result`], [`ExportResult`])
//!
//! # Error Handling
//!
//! Setup and storage code returns [`Result<T, CourierError>`]. Export calls never
//! return `Err`: they hand back an [`ExportResult`] that carries an [`ExportError`]
//! on failure.
//!
//! ```rust
//! use courier::domain::{ExportError, ExportResult};
//!
//! let result = ExportResult::Failed(ExportError::RedirectLoop { redirects: 10 });
//! assert!(!result.is_success());
//! ```
//!
//! # Builder Pattern
//!
//! ```rust
//! use courier::domain::{Batch, Envelope};
//!
//! let batch = Batch::new(vec![
//!     Envelope::new("Microsoft.ApplicationInsights.Event")
//!         .with_base_type("EventData")
//!         .with_property("tenant", "contoso")
//!         .with_property("attempt", 1i64),
//! ]);
//! assert_eq!(batch.len(), 1);
//! ```

pub mod envelope;
pub mod errors;
pub mod ids;
pub mod result;

// Re-export commonly used types for convenience
pub use envelope::{Batch, Envelope, MonitorBase, MonitorDomain, Properties, PropertyValue};
pub use errors::{CourierError, ExportError};
pub use ids::InstrumentationKey;
pub use result::{ExportResult, Result};
