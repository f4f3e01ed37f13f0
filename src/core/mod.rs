//! Delivery core
//!
//! # Modules
//!
//! - [`classify`] - maps a send outcome to a verdict
//! - [`export`] - the export orchestrator and redirect bookkeeping
//! - [`persist`] - the durable retry queue
//! - [`schedule`] - the background drain timer
//!
//! # Flow
//!
//! 1. The [`Exporter`](export::Exporter) sends a batch through its sender
//! 2. The outcome is classified
//! 3. Success arms the retry timer; retriable failures go to the queue;
//!    redirects move the sender and resend; anything else fails the call
//! 4. When the timer fires, one queued batch is shifted and resent
//!
//! # Example
//!
//! ```rust,no_run
//! use courier::config::load_config;
//! use courier::core::export::Exporter;
//! use courier::domain::{Batch, Envelope};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("courier.toml")?;
//! let exporter = Exporter::from_config(&config)?;
//!
//! let result = exporter
//!     .export(Batch::new(vec![Envelope::new("Microsoft.ApplicationInsights.Event")]))
//!     .await;
//! if let Some(error) = result.error() {
//!     eprintln!("export failed: {error}");
//! }
//! exporter.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod export;
pub mod persist;
pub mod schedule;
