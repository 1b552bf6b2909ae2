//! Unified error handling for gcectl-core
//!
//! Wraps Compute API and configuration errors and adds the outcomes of
//! waiting on an operation, with consistent helper methods.
//!
//! # Example
//!
//! ```rust
//! use gcectl_core::{ComputeError, CoreError};
//!
//! fn handle_error(err: CoreError) {
//!     if err.is_timeout() {
//!         println!("Gave up waiting");
//!     } else if err.is_retryable() {
//!         println!("Temporary error, can retry");
//!     }
//! }
//!
//! // API errors are automatically converted
//! let api_err = ComputeError::NotFound { message: "operation gone".to_string() };
//! let core_err: CoreError = api_err.into();
//! assert!(core_err.is_not_found());
//! ```

use crate::client::ComputeError;
use crate::config::ConfigError;
use std::time::Duration;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error from the Compute Engine API
    #[error("Compute API error: {0}")]
    Compute(#[from] ComputeError),

    /// Operation did not reach DONE before the deadline
    #[error("Operation timed out after {0:?}")]
    OperationTimeout(Duration),

    /// Operation reached DONE with an error payload
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Waiting was cancelled by the caller
    #[error("Operation wait was cancelled")]
    Cancelled,

    /// Validation error (bad settings, unsupported scope, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            CoreError::Compute(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            CoreError::Compute(e) => e.is_unauthorized(),
            _ => false,
        }
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            CoreError::Compute(e) => e.is_server_error(),
            _ => false,
        }
    }

    /// Returns true if this is a timeout, either waiting or on the wire
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            CoreError::Compute(e) => e.is_timeout(),
            CoreError::OperationTimeout(_) => true,
            _ => false,
        }
    }

    /// Returns true if the provider reported the operation itself as failed
    #[must_use]
    pub fn is_operation_failure(&self) -> bool {
        matches!(self, CoreError::OperationFailed(_))
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            CoreError::Compute(e) => e.is_rate_limited(),
            _ => false,
        }
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        match self {
            CoreError::Compute(e) => e.is_bad_request(),
            CoreError::Validation(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CoreError::Compute(e) => e.is_retryable(),
            CoreError::OperationTimeout(_) => true, // the operation may still finish
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_from_compute() {
        let api_err = ComputeError::NotFound {
            message: "Operation not found".to_string(),
        };
        let core_err: CoreError = api_err.into();

        assert!(core_err.is_not_found());
        assert!(!core_err.is_unauthorized());
        assert!(!core_err.is_retryable());
    }

    #[test]
    fn test_core_error_compute_helpers_delegate() {
        let core_err: CoreError = ComputeError::from_status(401, "Bad token").into();
        assert!(core_err.is_unauthorized());

        let core_err: CoreError = ComputeError::from_status(429, "Too many requests").into();
        assert!(core_err.is_rate_limited());
        assert!(core_err.is_retryable());

        let core_err: CoreError = ComputeError::from_status(400, "Invalid field").into();
        assert!(core_err.is_bad_request());

        let core_err: CoreError = ComputeError::from_status(500, "Internal").into();
        assert!(core_err.is_server_error());
        assert!(core_err.is_retryable());
    }

    #[test]
    fn test_operation_timeout_is_not_a_failure() {
        let err = CoreError::OperationTimeout(Duration::from_secs(60));
        assert!(err.is_timeout());
        assert!(err.is_retryable());
        assert!(!err.is_operation_failure());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_operation_failed() {
        let err = CoreError::OperationFailed("QUOTA_EXCEEDED".to_string());
        assert!(err.is_operation_failure());
        assert!(!err.is_timeout());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Operation failed: QUOTA_EXCEEDED");
    }

    #[test]
    fn test_core_error_validation() {
        let err = CoreError::Validation("timeout must be positive".to_string());
        assert!(err.is_bad_request());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_core_error_display() {
        let api_err: CoreError = ComputeError::NotFound {
            message: "Not found".to_string(),
        }
        .into();
        assert!(api_err.to_string().contains("Compute API error"));

        let timeout_err = CoreError::OperationTimeout(Duration::from_secs(60));
        assert!(timeout_err.to_string().contains("timed out"));

        assert!(CoreError::Cancelled.to_string().contains("cancelled"));
    }
}
