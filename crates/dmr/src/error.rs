//! Error types for management operations.
//!
//! The management interface reports failures as free-text descriptions
//! carrying stable `WFLYCTL` message codes. [`Error::from_failure`]
//! classifies those descriptions so callers can distinguish a missing
//! resource from a duplicate or a genuine operation failure.

use thiserror::Error;

/// Missing resource, reported by `read-resource`, `remove` and friends.
const NOT_FOUND_CODE: &str = "WFLYCTL0216";
/// Composite operation failure wrapper emitted by batch steps.
const COMPOSITE_FAILED_CODE: &str = "WFLYCTL0062";
/// Duplicate resource, reported by `add` on an existing address.
const DUPLICATE_CODE: &str = "WFLYCTL0212";

/// Errors that can occur while talking to the management interface or
/// validating declared configuration against it.
#[derive(Debug, Error)]
pub enum Error {
    /// A declared value is malformed, of the wrong type, or not allowed
    /// for the resource it targets.
    #[error("invalid parameter: {0}")]
    Parameter(String),

    /// The addressed resource does not exist on the server.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// An `add` targeted an address that is already occupied.
    #[error("duplicate resource: {0}")]
    DuplicateResource(String),

    /// The server rejected an operation for any other reason.
    #[error("operation failed: {0}")]
    Operation(String),

    /// Session lifecycle misuse (no active session, double connect, ...).
    #[error("session error: {0}")]
    Context(String),

    /// The management endpoint could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),
}

impl Error {
    /// Classify a failed operation from its failure description.
    ///
    /// A lone not-found code maps to [`Error::NotFound`]. A composite
    /// failure wrapping a duplicate-resource step maps to
    /// [`Error::DuplicateResource`]. Everything else, including a
    /// missing description, is an [`Error::Operation`].
    pub fn from_failure(command: &str, failure: Option<&str>) -> Self {
        match failure {
            None => Error::Operation(format!("unknown error executing: {command}")),
            Some(text) if text.contains(NOT_FOUND_CODE) => Error::NotFound(text.to_string()),
            Some(text)
                if text.contains(COMPOSITE_FAILED_CODE) && text.contains(DUPLICATE_CODE) =>
            {
                Error::DuplicateResource(text.to_string())
            }
            Some(text) => Error::Operation(text.to_string()),
        }
    }

    /// Whether this error is transient and worth retrying at connect time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Connection(_))
    }
}

/// Result type for management operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_code_classifies() {
        let err = Error::from_failure(
            "/subsystem=datasources/data-source=TestDS:read-resource()",
            Some("WFLYCTL0216: Management resource '[...]' not found"),
        );
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_composite_not_found_classifies() {
        // Batch failures wrap the step message in the composite code.
        let err = Error::from_failure(
            "batch",
            Some("WFLYCTL0062: Composite operation failed [...] WFLYCTL0216: not found"),
        );
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_composite_duplicate_classifies() {
        let err = Error::from_failure(
            "/subsystem=datasources/data-source=TestDS:add()",
            Some("WFLYCTL0062: Composite operation failed [...] WFLYCTL0212: Duplicate resource"),
        );
        assert!(matches!(err, Error::DuplicateResource(_)));
    }

    #[test]
    fn test_duplicate_without_composite_is_operation() {
        // The duplicate code only counts inside a composite failure.
        let err = Error::from_failure("add", Some("WFLYCTL0212: Duplicate resource"));
        assert!(matches!(err, Error::Operation(_)));
    }

    #[test]
    fn test_missing_description_is_operation() {
        let err = Error::from_failure(":whoami", None);
        assert!(matches!(err, Error::Operation(ref m) if m.contains(":whoami")));
    }

    #[test]
    fn test_only_connection_is_retryable() {
        assert!(Error::Connection("refused".into()).is_retryable());
        assert!(!Error::NotFound("x".into()).is_retryable());
        assert!(!Error::Operation("x".into()).is_retryable());
    }
}
