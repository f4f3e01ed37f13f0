//! Sender abstraction
//!
//! This module defines the transport contract consumed by the exporter. A sender
//! reports every attempt as a [`SendOutcome`] value instead of raising errors, so
//! the classifier can decide on plain data.

use crate::domain::{Batch, Result};
use async_trait::async_trait;

/// What happened to one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The endpoint answered
    Response {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        body: Option<String>,
    },

    /// The endpoint asked for the batch to be delivered elsewhere (307/308)
    Redirect {
        status: u16,
        /// Value of the `Location` header, if present
        location: Option<String>,
    },

    /// No usable response was produced
    Fault(TransportFault),
}

impl SendOutcome {
    /// Shorthand for a response without a body
    pub fn status(status: u16) -> Self {
        SendOutcome::Response { status, body: None }
    }

    /// Shorthand for a response with a body
    pub fn with_body(status: u16, body: impl Into<String>) -> Self {
        SendOutcome::Response {
            status,
            body: Some(body.into()),
        }
    }
}

impl std::fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SendOutcome::Response { status, .. } => write!(f, "status {status}"),
            SendOutcome::Redirect { status, location } => match location {
                Some(location) => write!(f, "redirect {status} to {location}"),
                None => write!(f, "redirect {status} without location"),
            },
            SendOutcome::Fault(fault) => match fault.status {
                Some(status) => write!(f, "{} (status {status})", fault.message),
                None => write!(f, "{}", fault.message),
            },
        }
    }
}

/// Broad category of a transport fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Transient client-side fault: the request could not be sent, the
    /// connection could not be established, or it timed out
    Network,
    /// Anything else
    Other,
}

/// A transport-level failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFault {
    pub kind: FaultKind,
    /// Status code, when the transport reports one alongside the fault
    pub status: Option<u16>,
    pub message: String,
}

impl TransportFault {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Network,
            status: None,
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Other,
            status: None,
            message: message.into(),
        }
    }

    /// Attaches a status code to the fault
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Network transport used by the exporter and the retry scheduler
///
/// Implementations own their own timeouts; the exporter waits for whatever
/// outcome `send` eventually returns.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Send one batch to the current endpoint
    async fn send(&self, batch: &Batch) -> SendOutcome;

    /// Point subsequent sends at a new endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the location cannot be used as an endpoint.
    fn handle_permanent_redirect(&self, location: &str) -> Result<()>;

    /// Stop the sender; later sends fail without touching the network
    async fn shutdown(&self) -> Result<()>;
}
