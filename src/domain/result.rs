//! Result types for Courier
//!
//! [`Result`] is the plumbing alias over [`CourierError`]. [`ExportResult`] is what
//! an export call hands back to its caller.

use super::errors::{CourierError, ExportError};

/// Result type alias for Courier operations
///
/// # Examples
///
/// ```
/// use courier::domain::result::Result;
/// use courier::domain::errors::CourierError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(CourierError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, CourierError>;

/// Caller-visible outcome of one `export` call
///
/// `Success` also covers batches that were accepted into the retry queue:
/// from the caller's point of view the data is safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportResult {
    /// Delivered, or durably queued for a later retry
    Success,
    /// Dropped or not queued, with the reason
    Failed(ExportError),
}

impl ExportResult {
    /// Returns true for [`ExportResult::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, ExportResult::Success)
    }

    /// Returns the failure reason, if any
    pub fn error(&self) -> Option<&ExportError> {
        match self {
            ExportResult::Success => None,
            ExportResult::Failed(err) => Some(err),
        }
    }
}

impl From<ExportError> for ExportResult {
    fn from(err: ExportError) -> Self {
        ExportResult::Failed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_export_result_accessors() {
        assert!(ExportResult::Success.is_success());
        assert!(ExportResult::Success.error().is_none());

        let failed: ExportResult = ExportError::Shutdown.into();
        assert!(!failed.is_success());
        assert_eq!(failed.error(), Some(&ExportError::Shutdown));
    }
}
