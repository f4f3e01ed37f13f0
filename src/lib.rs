// Courier - Reliable telemetry delivery
// Copyright (c) 2025 Courier Contributors
// Licensed under the MIT License

//! # Courier - Reliable telemetry delivery
//!
//! Courier is the delivery layer of a telemetry exporter. It sends batches of
//! envelopes to an ingestion endpoint and makes sure transient failures do not
//! lose data: retriable rejections go to a disk-backed queue that is drained in
//! the background, partial rejections keep only the envelopes worth retrying, and
//! redirects move the endpoint.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Classification, export orchestration, retry queue and scheduler
//! - [`adapters`] - Transport contract and the HTTP sender
//! - [`domain`] - Envelopes, batches, keys and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier::config::load_config;
//! use courier::core::export::Exporter;
//! use courier::domain::{Batch, Envelope};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("courier.toml")?;
//!     let exporter = Exporter::from_config(&config)?;
//!
//!     let batch = Batch::new(vec![
//!         Envelope::new("Microsoft.ApplicationInsights.Event")
//!             .with_base_type("EventData")
//!             .with_property("region", "eu-west"),
//!     ]);
//!
//!     let result = exporter.export(batch).await;
//!     println!("success: {}", result.is_success());
//!
//!     exporter.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Delivery Guarantees
//!
//! Delivery is at-least-once. An export returns success once the endpoint has
//! accepted the batch or the retry queue has durably stored what is left of it.
//! When the queue cannot store a batch the export fails with
//! [`domain::ExportError::Persistence`]; that is the only point where accepted
//! data may be lost.
//!
//! ## Custom Transports
//!
//! Anything implementing [`adapters::sender::Sender`] can replace the HTTP
//! sender, and any [`core::persist::PersistentQueue`] can replace the file
//! queue:
//!
//! ```rust,no_run
//! use courier::adapters::sender::Sender;
//! use courier::core::export::Exporter;
//! use courier::core::persist::PersistentQueue;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! fn build(sender: Arc<dyn Sender>, queue: Arc<dyn PersistentQueue>) -> Exporter {
//!     Exporter::new(sender, queue, Duration::from_secs(60))
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
