//! Progress tracking and polling for asynchronous Compute operations
//!
//! Mutating Compute API calls return an [`Operation`] which must be polled
//! until the provider marks it `DONE`. This module provides that polling loop
//! with a deadline, optional cancellation, and optional progress callbacks for
//! UI updates.

use crate::client::OperationSource;
use crate::completion::Completion;
use crate::error::{CoreError, Result};
use crate::operation::{Operation, OperationStatus};
use crate::scope::{OperationScope, resolve_scope};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Time between polls unless configured otherwise
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Progress events emitted while waiting on an operation
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Waiting has started
    Started {
        operation: String,
        scope: OperationScope,
    },
    /// A poll returned the latest state
    Polling {
        operation: String,
        status: OperationStatus,
        progress: Option<i32>,
        elapsed: Duration,
    },
    /// Operation finished without error
    Completed { operation: String },
    /// Operation failed, timed out, or was cancelled
    Failed { operation: String, error: String },
    /// Operation record disappeared while polling
    Vanished { operation: String },
}

/// Callback type for progress updates
///
/// The CLI uses this to update its spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// How often to poll and how long to wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    /// Settings with the given deadline and the default interval
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }

    /// Set the poll interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Both durations must be non-zero
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(CoreError::Validation(
                "poll timeout must be positive".to_string(),
            ));
        }
        if self.interval.is_zero() {
            return Err(CoreError::Validation(
                "poll interval must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Wait for an operation with the default poll interval
///
/// This is the entry point most resource callers use:
///
/// ```rust,ignore
/// let operation = client.insert(&scope, "addresses", &body).await?;
/// let completion = wait_for_completion(&client, operation, Duration::from_secs(60)).await?;
/// if let Some(message) = completion.failure_message() {
///     return Err(MyError::Apply(message.to_string()));
/// }
/// ```
pub async fn wait_for_completion<S>(
    source: &S,
    operation: Operation,
    timeout: Duration,
) -> Result<Completion>
where
    S: OperationSource + ?Sized,
{
    OperationPoller::new(source, PollSettings::new(timeout))
        .wait(operation)
        .await
}

/// Polls a single operation until it is `DONE`, vanishes, or the deadline passes
///
/// # Example
///
/// ```rust,ignore
/// use gcectl_core::{OperationPoller, PollSettings, ProgressEvent};
/// use std::time::Duration;
///
/// let settings = PollSettings::new(Duration::from_secs(300))
///     .with_interval(Duration::from_secs(2));
/// let completion = OperationPoller::new(&client, settings)
///     .on_progress(Box::new(|event| {
///         if let ProgressEvent::Polling { status, elapsed, .. } = event {
///             println!("{status} ({:.0}s)", elapsed.as_secs());
///         }
///     }))
///     .wait(operation)
///     .await?;
/// ```
pub struct OperationPoller<'a, S: ?Sized> {
    source: &'a S,
    settings: PollSettings,
    on_progress: Option<ProgressCallback>,
    cancel: Option<CancellationToken>,
}

impl<'a, S> OperationPoller<'a, S>
where
    S: OperationSource + ?Sized,
{
    pub fn new(source: &'a S, settings: PollSettings) -> Self {
        Self {
            source,
            settings,
            on_progress: None,
            cancel: None,
        }
    }

    /// Receive progress events
    #[must_use]
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Stop waiting when the token is cancelled
    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Wait for `operation` to finish
    ///
    /// Returns the [`Completion`] for operations that reach `DONE` or whose
    /// record disappears. Fails with [`CoreError::OperationTimeout`] once the
    /// deadline passes, [`CoreError::Cancelled`] if the token fires, and
    /// propagates any refresh error other than "not found" immediately.
    ///
    /// Sleeps never run past the deadline, and a refresh still in flight when
    /// it passes is dropped.
    pub async fn wait(self, mut operation: Operation) -> Result<Completion> {
        self.settings.validate()?;

        let scope = resolve_scope(&operation);
        let label = operation.display_name().to_string();
        self.emit(ProgressEvent::Started {
            operation: label.clone(),
            scope: scope.clone(),
        });

        if operation.is_done() {
            return Ok(self.finish(operation));
        }

        let name = operation
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                CoreError::Validation("cannot poll an operation without a name".to_string())
            })?;

        debug!(
            operation = %name,
            scope = %scope,
            interval = ?self.settings.interval,
            timeout = ?self.settings.timeout,
            "Waiting for operation"
        );

        let start = Instant::now();
        let deadline = start + self.settings.timeout;
        while !operation.is_done() {
            // Never sleep past the deadline
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.pause(&label, self.settings.interval.min(remaining)).await?;

            let elapsed = start.elapsed();
            if elapsed >= self.settings.timeout {
                return Err(self.timed_out(label, &name, elapsed));
            }

            // A refresh that hangs is cut off at the deadline too
            let remaining = deadline.saturating_duration_since(Instant::now());
            let refresh =
                tokio::time::timeout(remaining, self.source.get_operation(&scope, &name));
            let refreshed = match &self.cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(self.cancelled(&label)),
                    refreshed = refresh => refreshed,
                },
                None => refresh.await,
            };

            operation = match refreshed {
                Err(_) => return Err(self.timed_out(label, &name, start.elapsed())),
                Ok(Ok(latest)) => latest,
                Ok(Err(e)) if e.is_not_found() => {
                    warn!(operation = %name, scope = %scope, "Operation not found while polling");
                    self.emit(ProgressEvent::Vanished { operation: label });
                    return Ok(Completion::not_found(name));
                }
                Ok(Err(e)) => {
                    self.emit(ProgressEvent::Failed {
                        operation: label,
                        error: e.to_string(),
                    });
                    return Err(e.into());
                }
            };

            debug!(
                operation = %name,
                status = %operation.status,
                progress = ?operation.progress,
                "Polled operation"
            );
            self.emit(ProgressEvent::Polling {
                operation: label.clone(),
                status: operation.status,
                progress: operation.progress,
                elapsed,
            });
        }

        Ok(self.finish(operation))
    }

    async fn pause(&self, label: &str, duration: Duration) -> Result<()> {
        let Some(token) = &self.cancel else {
            tokio::time::sleep(duration).await;
            return Ok(());
        };
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(self.cancelled(label)),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }

    fn cancelled(&self, label: &str) -> CoreError {
        info!(operation = %label, "Stopped waiting for operation");
        self.emit(ProgressEvent::Failed {
            operation: label.to_string(),
            error: "cancelled".to_string(),
        });
        CoreError::Cancelled
    }

    fn timed_out(&self, label: String, name: &str, elapsed: Duration) -> CoreError {
        warn!(operation = %name, elapsed = ?elapsed, "Timed out waiting for operation");
        self.emit(ProgressEvent::Failed {
            operation: label,
            error: format!("timed out after {:?}", self.settings.timeout),
        });
        CoreError::OperationTimeout(self.settings.timeout)
    }

    fn finish(&self, operation: Operation) -> Completion {
        let label = operation.display_name().to_string();
        for warning in &operation.warnings {
            warn!(
                operation = %label,
                code = warning.code.as_deref().unwrap_or_default(),
                "{}",
                warning.message.as_deref().unwrap_or_default()
            );
        }

        let completion = Completion::resolve(operation);
        match &completion {
            Completion::Success(_) => {
                info!(operation = %label, "Operation completed");
                self.emit(ProgressEvent::Completed { operation: label });
            }
            Completion::Failure { message, .. } => {
                info!(operation = %label, error = %message, "Operation failed");
                self.emit(ProgressEvent::Failed {
                    operation: label,
                    error: message.clone(),
                });
            }
            Completion::Unknown { .. } => {}
        }
        completion
    }

    /// Helper to emit progress events
    fn emit(&self, event: ProgressEvent) {
        if let Some(cb) = &self.on_progress {
            cb(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PollSettings::new(Duration::from_secs(60));
        assert_eq!(settings.interval, Duration::from_millis(1000));
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = PollSettings::new(Duration::ZERO).validate().unwrap_err();
        assert!(err.is_bad_request(), "{err:?}");
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = PollSettings::new(Duration::from_secs(5))
            .with_interval(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("interval"), "{err}");
    }
}
