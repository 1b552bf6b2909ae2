//! Waiting on operations from the CLI
//!
//! Wraps the core poller with an indicatif spinner, Ctrl-C cancellation and
//! CLI formatting of the outcome.

use std::time::Duration;

use gcectl_core::{
    Completion, ComputeClient, Operation, OperationPoller, OperationStatus, PollSettings,
    ProgressCallback, ProgressEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{OutputFormat, PollArgs};
use crate::error::{GcectlError, Result as CliResult};
use crate::output::print_output;

impl PollArgs {
    /// Apply command-line overrides on top of the profile's settings
    pub fn apply(&self, settings: PollSettings) -> PollSettings {
        let mut settings = settings;
        if let Some(timeout) = self.timeout {
            settings.timeout = Duration::from_millis(timeout);
        }
        if let Some(interval) = self.interval {
            settings.interval = Duration::from_millis(interval);
        }
        settings
    }
}

/// A spinner plus the progress callback that drives it
///
/// The spinner is hidden unless output is human-readable.
pub fn spinner(label: &str, output_format: OutputFormat) -> (ProgressBar, ProgressCallback) {
    let pb = if output_format == OutputFormat::Auto {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    } else {
        ProgressBar::hidden()
    };
    pb.set_message(format!("Waiting for operation {}", label));

    let pb_clone = pb.clone();
    let callback: ProgressCallback = Box::new(move |event: ProgressEvent| match &event {
        ProgressEvent::Started { operation, scope } => {
            pb_clone.set_message(format!("Operation {} ({})", operation, scope));
        }
        ProgressEvent::Polling {
            operation,
            status,
            progress,
            ..
        } => {
            let progress = progress.map(|p| format!(" {}%", p)).unwrap_or_default();
            pb_clone.set_message(format!(
                "Operation {}: {}{}",
                operation,
                format_status(*status),
                progress
            ));
        }
        ProgressEvent::Completed { operation } => {
            pb_clone.finish_with_message(format!("Operation {}: \u{2713} done", operation));
        }
        ProgressEvent::Failed { operation, error } => {
            pb_clone.finish_with_message(format!("Operation {} \u{2717} {}", operation, error));
        }
        ProgressEvent::Vanished { operation } => {
            pb_clone.finish_with_message(format!("Operation {}: ? no longer found", operation));
        }
    });
    (pb, callback)
}

/// Ctrl-C watcher for one wait; stops listening when dropped
pub struct CtrlC {
    token: CancellationToken,
    listener: tokio::task::JoinHandle<()>,
}

impl CtrlC {
    pub fn watch() -> Self {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Ctrl-C received, cancelling wait");
                trigger.cancel();
            }
        });
        Self { token, listener }
    }

    /// Token cancelled by Ctrl-C
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for CtrlC {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Wait for an operation with spinner output; Ctrl-C stops waiting
pub async fn wait_for_operation(
    client: &ComputeClient,
    operation: Operation,
    settings: PollSettings,
    output_format: OutputFormat,
) -> CliResult<Completion> {
    let (pb, callback) = spinner(operation.display_name(), output_format);
    let ctrl_c = CtrlC::watch();

    let result = OperationPoller::new(client, settings)
        .on_progress(callback)
        .cancel_on(ctrl_c.token())
        .wait(operation)
        .await;

    if !pb.is_finished() {
        pb.finish_and_clear();
    }
    Ok(result?)
}

/// JSON view of a completion
pub fn completion_json(completion: &Completion) -> Value {
    match completion {
        Completion::Success(operation) => json!({
            "result": "success",
            "operation": operation,
        }),
        Completion::Failure { operation, message } => json!({
            "result": "failure",
            "error": message,
            "operation": operation,
        }),
        Completion::Unknown { name } => json!({
            "result": "unknown",
            "operation": { "name": name },
        }),
    }
}

/// Print the outcome of a wait; a provider-reported failure becomes an error
pub fn report_completion(completion: Completion, output_format: OutputFormat) -> CliResult<()> {
    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => {
            print_output(completion_json(&completion), output_format)?;
        }
        OutputFormat::Auto => match &completion {
            Completion::Success(operation) => {
                println!("Operation {} completed", operation.display_name());
                if let Some(target) = &operation.target_link {
                    println!("Target: {}", target);
                }
            }
            Completion::Failure { .. } => {}
            Completion::Unknown { name } => {
                println!(
                    "Operation {} is no longer found; its outcome is unknown",
                    name
                );
            }
        },
    }

    match completion {
        Completion::Failure { message, .. } => Err(GcectlError::OperationFailed { message }),
        _ => Ok(()),
    }
}

/// Print an operation reference
pub fn print_operation(operation: &Operation, output_format: OutputFormat) -> CliResult<()> {
    match output_format {
        OutputFormat::Json | OutputFormat::Yaml => print_output(operation, output_format)?,
        OutputFormat::Auto => {
            println!("Operation: {}", operation.display_name());
            println!("Status: {}", format_status(operation.status));
            if let Some(kind) = &operation.operation_type {
                println!("Type: {}", kind);
            }
            println!("Scope: {}", operation.scope());
            if let Some(progress) = operation.progress {
                println!("Progress: {}%", progress);
            }
            if let Some(target) = &operation.target_link {
                println!("Target: {}", target);
            }
            if let Some(message) = operation.failure_message() {
                println!("Error: {}", message);
            }
        }
    }
    Ok(())
}

/// Format operation status for display with status icons
fn format_status(status: OperationStatus) -> String {
    match status {
        OperationStatus::Done => format!("\u{2713} {}", status), // checkmark
        OperationStatus::Running => format!("\u{21bb} {}", status), // arrow circle
        OperationStatus::Pending => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_args_override_profile_settings() {
        let profile = PollSettings::new(Duration::from_secs(60));
        let args = PollArgs {
            timeout: Some(5000),
            interval: None,
        };
        let settings = args.apply(profile);
        assert_eq!(settings.timeout, Duration::from_millis(5000));
        assert_eq!(settings.interval, profile.interval);
        assert_eq!(PollArgs::default().apply(profile), profile);
    }

    #[tokio::test]
    async fn test_ctrl_c_watch_starts_uncancelled() {
        let ctrl_c = CtrlC::watch();
        let token = ctrl_c.token();
        assert!(!token.is_cancelled());
        drop(ctrl_c);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_format_status() {
        assert!(format_status(OperationStatus::Done).contains("DONE"));
        assert!(format_status(OperationStatus::Running).contains("RUNNING"));
        assert_eq!(format_status(OperationStatus::Pending), "PENDING");
    }

    #[test]
    fn test_completion_json() {
        let success = Completion::resolve(Operation::new("op-1").with_status(OperationStatus::Done));
        assert_eq!(completion_json(&success)["result"], "success");
        assert_eq!(completion_json(&success)["operation"]["name"], "op-1");

        let failure = Completion::resolve(
            Operation::new("op-2")
                .with_status(OperationStatus::Done)
                .with_error_message("QUOTA_EXCEEDED"),
        );
        assert_eq!(completion_json(&failure)["error"], "QUOTA_EXCEEDED");

        let unknown = Completion::not_found("op-3");
        assert_eq!(completion_json(&unknown)["result"], "unknown");
    }

    #[test]
    fn test_failure_is_reported_as_error() {
        let failure = Completion::resolve(
            Operation::new("op-2")
                .with_status(OperationStatus::Done)
                .with_error_message("QUOTA_EXCEEDED"),
        );
        let err = report_completion(failure, OutputFormat::Auto).unwrap_err();
        assert!(matches!(err, GcectlError::OperationFailed { ref message } if message == "QUOTA_EXCEEDED"));
    }
}
