//! Error types for postboard.
//!
//! Three layers of failure exist:
//!
//! - [`GatewayError`]: what a remote operation can fail with
//! - [`OperationError`]: how the orchestrator classifies a failed operation
//!   for its caller (recoverable rejection vs fatal failure)
//! - [`PostboardError`]: crate-level setup failures (configuration, I/O,
//!   seed data)
//!
//! The store and its transitions never fail; errors only exist at the
//! orchestrator boundary and around it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Structured validation rejection returned by the remote side.
///
/// Mirrors the 422 payload shape `{ "error": { "<field>": "<message>" } }`,
/// which lets a form render messages next to the offending fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    #[serde(default)]
    pub error: BTreeMap<String, String>,
}

impl FieldErrors {
    /// Creates an empty set of field errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`, replacing any earlier one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.error.insert(field.into(), message.into());
    }

    /// Returns the message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.error.get(field).map(String::as_str)
    }

    /// Returns `true` when no field carries an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.error.is_empty()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.error {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Failure reported by an operation gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The remote side rejected the body (HTTP 422 style).
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The remote side answered with a non-success status.
    #[error("remote returned status {status}: {message}")]
    Status {
        /// Status code reported by the remote side.
        status: u16,
        /// Human-readable reason.
        message: String,
    },

    /// The request never produced a response (network down, refused, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but could not be decoded.
    #[error("could not decode response: {0}")]
    Decode(String),

    /// The caller abandoned the operation before it settled.
    #[error("operation was cancelled")]
    Cancelled,
}

impl GatewayError {
    /// Shorthand for a 404-style failure.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Status {
            status: 404,
            message: message.into(),
        }
    }

    /// Returns `true` for [`GatewayError::Cancelled`].
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failure of an orchestrated operation, as seen by its caller.
///
/// `Rejected` is the recoverable case: the payload is meant to be shown
/// next to the edit form. `Fatal` is everything else and is expected to
/// reach whatever top-level error handling the caller installs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// The remote side rejected the request with field errors.
    #[error("rejected: {0}")]
    Rejected(FieldErrors),

    /// The operation failed for any other reason.
    #[error(transparent)]
    Fatal(#[from] GatewayError),
}

impl OperationError {
    /// Returns the field errors of a rejection.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Rejected(errors) => Some(errors),
            Self::Fatal(_) => None,
        }
    }

    /// Returns `true` when the operation was abandoned by its caller.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Fatal(GatewayError::Cancelled))
    }
}

/// Crate-level error for setup and configuration.
#[derive(Debug, Error)]
pub enum PostboardError {
    /// Configuration is invalid or unreadable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Seed data could not be decoded.
    #[error("Seed data error: {0}")]
    Seed(#[from] serde_json::Error),
}

/// A specialized `Result` type for postboard setup operations.
pub type Result<T> = std::result::Result<T, PostboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_match_the_remote_payload_shape() {
        let errors: FieldErrors =
            serde_json::from_str(r#"{"error":{"publishDate":"must not be in the past"}}"#).unwrap();

        assert_eq!(errors.get("publishDate"), Some("must not be in the past"));
        assert_eq!(errors.to_string(), "publishDate: must not be in the past");
    }

    #[test]
    fn gateway_errors_convert_to_fatal_operation_errors() {
        let err: OperationError = GatewayError::Cancelled.into();

        assert!(err.is_cancelled());
        assert!(err.field_errors().is_none());
    }
}
