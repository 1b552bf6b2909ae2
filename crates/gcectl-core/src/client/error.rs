//! Errors returned by the Compute Engine REST API

use thiserror::Error;

/// Error from a single Compute Engine API call
///
/// HTTP failures are mapped onto variants by status code so callers can match
/// on the condition (most importantly "not found") instead of the number.
#[derive(Error, Debug)]
pub enum ComputeError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Unexpected response ({status}): {message}")]
    Unexpected { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ComputeError {
    /// Map an HTTP error status and message onto a variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => ComputeError::BadRequest { message },
            401 => ComputeError::AuthenticationFailed { message },
            403 => ComputeError::PermissionDenied { message },
            404 => ComputeError::NotFound { message },
            409 | 412 => ComputeError::Conflict { message },
            429 => ComputeError::RateLimited { message },
            500..=599 => ComputeError::ServerError { status, message },
            _ => ComputeError::Unexpected { status, message },
        }
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ComputeError::NotFound { .. })
    }

    /// Returns true if this is an authentication/authorization error (401/403)
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ComputeError::AuthenticationFailed { .. } | ComputeError::PermissionDenied { .. }
        )
    }

    /// Returns true if this is a server error (5xx)
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, ComputeError::ServerError { .. })
    }

    /// Returns true if the request timed out at the transport level
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ComputeError::Request(e) if e.is_timeout())
    }

    /// Returns true if this is a rate limiting error (429)
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ComputeError::RateLimited { .. })
    }

    /// Returns true if this is a conflict/precondition error (409/412)
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, ComputeError::Conflict { .. })
    }

    /// Returns true if this is a bad request error (400)
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ComputeError::BadRequest { .. })
    }

    /// Returns true if this error is potentially retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ComputeError::RateLimited { .. } | ComputeError::ServerError { .. } => true,
            ComputeError::Request(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
