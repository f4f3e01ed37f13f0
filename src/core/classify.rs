//! Response classification
//!
//! Pure decision logic that maps a [`SendOutcome`] to a [`Verdict`]. The only state
//! is the fixed retriable-status policy.

use crate::adapters::sender::{FaultKind, SendOutcome};
use crate::domain::ExportError;
use serde::Deserialize;
use std::collections::BTreeSet;

/// Status codes worth retrying: partial accept, timeouts, throttling, quota and
/// transient server/gateway errors
const RETRIABLE_STATUS_CODES: [u16; 8] = [206, 408, 429, 439, 500, 502, 503, 504];

/// Full success
pub const STATUS_OK: u16 = 200;

/// Returns true if the status signals a transient, retry-worthy failure
pub fn is_retriable(status: u16) -> bool {
    RETRIABLE_STATUS_CODES.contains(&status)
}

/// Returns true for temporary (307) and permanent (308) redirects
pub fn is_redirect(status: u16) -> bool {
    status == 307 || status == 308
}

/// One rejected envelope in a partial-failure response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedEnvelope {
    /// Zero-based position in the submitted batch
    pub index: usize,
    pub status_code: u16,
    #[serde(default)]
    pub message: Option<String>,
}

/// Partial-failure report returned by the ingestion endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialFailureReport {
    #[serde(default)]
    pub items_received: Option<usize>,
    #[serde(default)]
    pub items_accepted: Option<usize>,
    pub errors: Vec<RejectedEnvelope>,
}

impl PartialFailureReport {
    /// Positions of rejected envelopes whose own status is retriable
    pub fn retriable_indices(&self) -> BTreeSet<usize> {
        self.errors
            .iter()
            .filter(|e| is_retriable(e.status_code))
            .map(|e| e.index)
            .collect()
    }
}

/// Parses a partial-failure body
///
/// # Errors
///
/// Returns [`ExportError::MalformedResponse`] if the body is not a valid report,
/// or if any index falls outside a batch of `batch_len` envelopes.
pub fn parse_partial_failure(
    body: &str,
    batch_len: usize,
) -> std::result::Result<PartialFailureReport, ExportError> {
    let report: PartialFailureReport =
        serde_json::from_str(body).map_err(|e| ExportError::MalformedResponse(e.to_string()))?;

    if let Some(bad) = report.errors.iter().find(|e| e.index >= batch_len) {
        return Err(ExportError::MalformedResponse(format!(
            "error index {} is outside a batch of {} envelope(s)",
            bad.index, batch_len
        )));
    }

    Ok(report)
}

/// What the exporter should do with a batch after one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Delivered
    Success,
    /// Queue the whole batch
    RetryAll,
    /// Queue only these positions (ascending, non-empty)
    RetryPartial(BTreeSet<usize>),
    /// Move the sender to this location and send again
    Redirect(String),
    /// Give up; data is dropped
    Reject(ExportError),
}

/// Classifies one delivery attempt for a batch of `batch_len` envelopes
///
/// # Example
///
/// ```
/// use courier::adapters::sender::SendOutcome;
/// use courier::core::classify::{classify, Verdict};
///
/// let outcome = SendOutcome::with_body(
///     500,
///     r#"{"errors":[{"index":0,"statusCode":500},{"index":2,"statusCode":400}]}"#,
/// );
/// match classify(&outcome, 3) {
///     Verdict::RetryPartial(indices) => assert_eq!(indices.into_iter().collect::<Vec<_>>(), vec![0]),
///     other => panic!("unexpected verdict {other:?}"),
/// }
/// ```
pub fn classify(outcome: &SendOutcome, batch_len: usize) -> Verdict {
    match outcome {
        SendOutcome::Response { status, .. } if *status == STATUS_OK => Verdict::Success,

        SendOutcome::Response { status, body } if is_retriable(*status) => {
            match body.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
                None => Verdict::RetryAll,
                Some(body) => match parse_partial_failure(body, batch_len) {
                    Ok(report) => {
                        let retriable = report.retriable_indices();
                        if retriable.is_empty() {
                            Verdict::Reject(ExportError::NoRetriableEnvelopes {
                                rejected: report.errors.len(),
                            })
                        } else {
                            Verdict::RetryPartial(retriable)
                        }
                    }
                    Err(err) => Verdict::Reject(err),
                },
            }
        }

        SendOutcome::Response { status, .. } => {
            Verdict::Reject(ExportError::NonRetriable { status: *status })
        }

        SendOutcome::Redirect {
            location: Some(location),
            ..
        } if !location.trim().is_empty() => Verdict::Redirect(location.trim().to_string()),

        SendOutcome::Redirect { status, .. } => {
            Verdict::Reject(ExportError::NonRetriable { status: *status })
        }

        SendOutcome::Fault(fault) => match fault.status {
            Some(status) if is_retriable(status) => Verdict::RetryAll,
            _ if fault.kind == FaultKind::Network => Verdict::RetryAll,
            _ => Verdict::Reject(ExportError::Transport(fault.message.clone())),
        },
    }
}
