//! Classification of a finished wait
//!
//! A [`Completion`] is not an error by itself. Callers decide what to do with
//! it: most turn `Failure` into an error and treat `Unknown` like success.

use crate::error::{CoreError, Result};
use crate::operation::Operation;
use tracing::warn;

/// Outcome of waiting on an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The operation reached `DONE` without an error payload
    Success(Operation),
    /// The operation reached `DONE` and the provider reported an error
    Failure { operation: Operation, message: String },
    /// The operation record vanished (404) while polling
    ///
    /// Usually the mutation completed and its bookkeeping expired, but the
    /// outcome cannot be confirmed.
    Unknown { name: String },
}

impl Completion {
    /// Classify a terminal operation
    pub fn resolve(operation: Operation) -> Self {
        match operation.failure_message() {
            Some(message) => Completion::Failure { operation, message },
            None => Completion::Success(operation),
        }
    }

    /// Classification for an operation whose record is gone
    pub fn not_found(name: impl Into<String>) -> Self {
        Completion::Unknown { name: name.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Completion::Success(_))
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Completion::Failure { .. })
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Completion::Unknown { .. })
    }

    /// The provider's failure message, if the operation failed
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Completion::Failure { message, .. } => Some(message),
            _ => None,
        }
    }

    /// The final operation, when one was observed
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            Completion::Success(operation) | Completion::Failure { operation, .. } => {
                Some(operation)
            }
            Completion::Unknown { .. } => None,
        }
    }

    /// Convert into the caller-facing result
    ///
    /// `Failure` becomes [`CoreError::OperationFailed`] carrying the message
    /// unaltered. `Success` yields the final operation; `Unknown` yields `None`
    /// and logs a warning.
    pub fn into_result(self) -> Result<Option<Operation>> {
        match self {
            Completion::Success(operation) => Ok(Some(operation)),
            Completion::Failure { message, .. } => Err(CoreError::OperationFailed(message)),
            Completion::Unknown { name } => {
                warn!(
                    operation = %name,
                    "Operation record no longer exists; assuming it completed"
                );
                Ok(None)
            }
        }
    }
}
