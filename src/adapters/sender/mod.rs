//! Telemetry transport
//!
//! The [`Sender`] trait is the seam between the delivery layer and the network.
//! [`HttpSender`] is the production implementation.

pub mod http;
pub mod traits;

pub use http::HttpSender;
pub use traits::{FaultKind, SendOutcome, Sender, TransportFault};
