//! The Compute Engine `Operation` resource
//!
//! Every mutating call (insert, patch, delete, ...) returns one of these. It is
//! the handle used to track the mutation until the provider marks it `DONE`.

use crate::scope::{OperationScope, resolve_scope};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an operation; only `Done` is terminal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    #[default]
    Pending,
    Running,
    Done,
}

impl OperationStatus {
    /// Returns true for the terminal status
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == OperationStatus::Done
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationStatus::Pending => "PENDING",
            OperationStatus::Running => "RUNNING",
            OperationStatus::Done => "DONE",
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Compute Engine operation as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(default)]
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Full URL of the zone, set for zonal operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Full URL of the region, set for regional operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Advisory progress, 0 to 100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationErrorDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_error_status_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<OperationWarning>,
}

/// Errors attached to a finished operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationErrorDetails {
    #[serde(default)]
    pub errors: Vec<OperationErrorEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationErrorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationWarning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OperationErrorDetails {
    /// Human-readable summary of the error entries
    ///
    /// Messages are joined with `"; "`. Entries without a message (or with an
    /// empty one) contribute their code instead. Returns `None` when nothing is present.
    pub fn message(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .errors
            .iter()
            .filter_map(|e| {
                e.message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .or(e.code.as_deref())
            })
            .filter(|m| !m.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

impl Operation {
    /// Create an operation reference with just a name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the status
    #[must_use]
    pub fn with_status(mut self, status: OperationStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the zone URL (or bare zone name)
    #[must_use]
    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Set the region URL (or bare region name)
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Attach a single error entry with the given message
    #[must_use]
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        let entry = OperationErrorEntry {
            message: Some(message.into()),
            ..OperationErrorEntry::default()
        };
        self.error
            .get_or_insert_with(OperationErrorDetails::default)
            .errors
            .push(entry);
        self
    }

    /// Returns true once the provider has marked the operation `DONE`
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }

    /// Which operations endpoint tracks this operation
    pub fn scope(&self) -> OperationScope {
        resolve_scope(self)
    }

    /// Name to display in logs and progress events
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or("<unnamed>")
    }

    /// The failure message of a finished operation, if it failed
    ///
    /// The `error` payload wins. Without one, an HTTP error status of 400 or
    /// above (with `httpErrorMessage` when present) also counts as a failure.
    pub fn failure_message(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(
                error
                    .message()
                    .or_else(|| self.http_error_message.clone())
                    .unwrap_or_else(|| "operation failed without details".to_string()),
            );
        }
        match self.http_error_status_code {
            Some(code) if code >= 400 => Some(
                self.http_error_message
                    .clone()
                    .unwrap_or_else(|| format!("operation failed with HTTP status {code}")),
            ),
            _ => None,
        }
    }
}
