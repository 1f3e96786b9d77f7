//! Error types for flowstore operations
//!
//! Every fallible operation in this crate returns [`Result`]. The error
//! taxonomy mirrors how failures surface to the hosting workflow platform:
//!
//! - [`Error::Configuration`] - the node is wired or parameterized in a way
//!   the selected backend cannot satisfy (unsupported mode, missing
//!   capability). Not retryable; the workflow author must fix the node.
//! - [`Error::InvalidInput`] - an input item violates a handler invariant
//!   (wrong document cardinality, missing required parameter).
//! - [`Error::Store`] - the backend store failed (connection, query,
//!   population). May be transient depending on the backend.
//! - [`Error::Operation`] - a store/handler failure wrapped with the
//!   operation name and item index before surfacing, so the platform can
//!   attribute the failure to a single workflow item.
//!
//! Cancellation is deliberately NOT an error: a cancelled insert loop
//! returns early with the partial results produced so far.

use thiserror::Error;

/// Result type alias for flowstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for flowstore operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (unsupported mode, missing capability or wiring).
    ///
    /// **Recovery:** Review the node configuration. Not retryable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input validation error.
    ///
    /// **Recovery:** Check the offending input item against the handler
    /// contract. Not retryable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend store error (connection, query, or population failure).
    ///
    /// **Recovery:** Check backend availability and credentials. May be
    /// retryable for transient connection issues.
    #[error("Vector store error: {0}")]
    Store(String),

    /// Embedding capability error.
    ///
    /// **Recovery:** Check the connected embedding provider. May be
    /// retryable.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Tool execution error.
    ///
    /// **Recovery:** Check tool input format and the underlying store.
    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    /// Serialization/deserialization error.
    ///
    /// **Recovery:** Check data format matches expected schema. Not retryable.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Not implemented error.
    ///
    /// **Recovery:** Use an alternative operation mode or a backend that
    /// supports this capability.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A handler failure wrapped with its operation context.
    ///
    /// Emitted at the node entry points so the platform can fail the single
    /// workflow item the error belongs to instead of the whole run.
    #[error("{operation} operation failed for item {item_index}: {source}")]
    Operation {
        /// Operation mode name (e.g. "load", "insert")
        operation: String,
        /// Index of the input item being processed when the failure occurred
        item_index: usize,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Generic error for anything else.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a backend store error
    pub fn store(msg: impl Into<String>) -> Self {
        Error::Store(msg.into())
    }

    /// Wrap this error with the operation name and item index it belongs to.
    ///
    /// Already-wrapped errors pass through unchanged so nested handler calls
    /// do not stack `Operation` frames.
    #[must_use]
    pub fn with_operation(self, operation: &str, item_index: usize) -> Self {
        match self {
            Error::Operation { .. } => self,
            other => Error::Operation {
                operation: operation.to_string(),
                item_index,
                source: Box::new(other),
            },
        }
    }

    /// Check whether this error (or the error it wraps) is a backend store
    /// failure.
    #[must_use]
    pub fn is_store_error(&self) -> bool {
        match self {
            Error::Store(_) => true,
            Error::Operation { source, .. } => source.is_store_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_operation_wraps_once() {
        let err = Error::store("connection refused").with_operation("load", 3);
        match &err {
            Error::Operation {
                operation,
                item_index,
                source,
            } => {
                assert_eq!(operation, "load");
                assert_eq!(*item_index, 3);
                assert!(matches!(**source, Error::Store(_)));
            }
            other => panic!("expected Operation, got {other:?}"),
        }

        // Wrapping again must not stack frames
        let rewrapped = err.with_operation("insert", 0);
        match rewrapped {
            Error::Operation { operation, .. } => assert_eq!(operation, "load"),
            other => panic!("expected Operation, got {other:?}"),
        }
    }

    #[test]
    fn test_is_store_error_through_wrapper() {
        let err = Error::store("boom").with_operation("update", 1);
        assert!(err.is_store_error());
        assert!(!Error::invalid_input("bad").is_store_error());
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::store("timeout").with_operation("load", 2);
        let msg = err.to_string();
        assert!(msg.contains("load"));
        assert!(msg.contains("item 2"));
    }
}
