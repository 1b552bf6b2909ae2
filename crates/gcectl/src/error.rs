//! Error types for gcectl
//!
//! Defines structured error types using thiserror, each with suggestions
//! printed under the error message.

use colored::Colorize;
use gcectl_core::{ComputeError, ConfigError, CoreError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: List available profiles: gcectl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<String>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    /// Add a tip.
    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for tip in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", tip);
        }
    }
}

/// Main error type for the gcectl application
#[derive(Error, Debug)]
pub enum GcectlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile selected. {suggestion}")]
    NoProfileConfigured { suggestion: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Cancelled while waiting for the operation")]
    Cancelled,

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for gcectl operations
pub type Result<T> = std::result::Result<T, GcectlError>;

impl GcectlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            GcectlError::ProfileNotFound { name } => vec![
                "List available profiles: gcectl profile list".to_string(),
                format!(
                    "Create profile '{}': gcectl profile set {} --project <project>",
                    name, name
                ),
            ],
            GcectlError::NoProfileConfigured { .. } => vec![
                "Create a profile: gcectl profile set <name> --project <project> --default"
                    .to_string(),
                "Or set GCECTL_PROJECT and GCECTL_ACCESS_TOKEN".to_string(),
            ],
            GcectlError::AuthenticationFailed { .. } => vec![
                "Refresh the token: gcloud auth print-access-token".to_string(),
                "Check the profile: gcectl profile show <profile>".to_string(),
            ],
            GcectlError::NotFound { .. } => vec![
                "Check the name and the --zone/--region flags".to_string(),
                "Check that you're using the correct profile".to_string(),
            ],
            GcectlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL: gcectl profile show <profile>".to_string(),
            ],
            GcectlError::Timeout { .. } => vec![
                "The operation may still finish: gcectl operation get <name>".to_string(),
                "Wait longer with --timeout <ms>".to_string(),
            ],
            GcectlError::InvalidInput { .. } => vec![
                "Check the command syntax: gcectl <command> --help".to_string(),
            ],
            GcectlError::FileError { path, .. } => vec![
                format!("Check that file exists: {}", path),
                "Verify the file contains a JSON object".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }

        diag.print();
    }
}

impl From<ComputeError> for GcectlError {
    fn from(err: ComputeError) -> Self {
        match err {
            ComputeError::NotFound { message } => GcectlError::NotFound { message },
            ComputeError::AuthenticationFailed { message }
            | ComputeError::PermissionDenied { message } => {
                GcectlError::AuthenticationFailed { message }
            }
            ComputeError::BadRequest { message } => GcectlError::InvalidInput { message },
            ComputeError::Request(e) if e.is_connect() || e.is_timeout() => {
                GcectlError::ConnectionError {
                    message: e.to_string(),
                }
            }
            _ => GcectlError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<ConfigError> for GcectlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => GcectlError::ProfileNotFound { name },
            ConfigError::NoProfileSelected { suggestion } => {
                GcectlError::NoProfileConfigured { suggestion }
            }
            _ => GcectlError::Configuration(err.to_string()),
        }
    }
}

impl From<CoreError> for GcectlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Compute(e) => GcectlError::from(e),
            CoreError::Config(e) => GcectlError::from(e),
            CoreError::OperationTimeout(duration) => GcectlError::Timeout {
                message: format!("operation not DONE after {} ms", duration.as_millis()),
            },
            CoreError::OperationFailed(message) => GcectlError::OperationFailed { message },
            CoreError::Cancelled => GcectlError::Cancelled,
            CoreError::Validation(message) => GcectlError::InvalidInput { message },
        }
    }
}

impl From<serde_json::Error> for GcectlError {
    fn from(err: serde_json::Error) -> Self {
        GcectlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<anyhow::Error> for GcectlError {
    fn from(err: anyhow::Error) -> Self {
        GcectlError::Configuration(format!("{:#}", err))
    }
}
