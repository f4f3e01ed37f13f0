//! Export orchestration
//!
//! [`Exporter`] is the entry point: hand it a batch and it returns an
//! [`ExportResult`](crate::domain::ExportResult).

pub mod exporter;
pub mod redirect;

pub use exporter::Exporter;
pub use redirect::{RedirectState, MAX_REDIRECTS};
