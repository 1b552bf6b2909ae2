use anyhow::Result;
use clap::Parser;
use gcectl_core::Config;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::GcectlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let (config, config_path) = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        let config = Config::load_from_path(&path)?;
        (config, Some(path))
    } else {
        debug!("Loading config from default location");
        (Config::load()?, None)
    };
    let mut conn_mgr = ConnectionManager::with_config_path(config, config_path);

    if let Err(e) = execute_command(&cli, &mut conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "gcectl=warn,gcectl_core=warn",
            1 => "gcectl=info,gcectl_core=info",
            2 => "gcectl=debug,gcectl_core=debug",
            _ => "gcectl=trace,gcectl_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &mut ConnectionManager) -> Result<(), GcectlError> {
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
                    let output_data = serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    });
                    output::print_output(&output_data, cli.output)?;
                }
                cli::OutputFormat::Auto => {
                    println!("gcectl {}", env!("CARGO_PKG_VERSION"));
                }
            }
            Ok(())
        }

        Commands::Profile(profile_cmd) => {
            debug!("Executing profile command");
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output).await
        }

        Commands::Operation(operation_cmd) => {
            commands::operation::handle_operation_command(
                operation_cmd,
                conn_mgr,
                cli.profile.as_deref(),
                cli.output,
            )
            .await
        }

        Commands::Resource(resource_cmd) => {
            commands::resource::handle_resource_command(
                resource_cmd,
                conn_mgr,
                cli.profile.as_deref(),
                cli.output,
            )
            .await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Format command for human-readable logging (without sensitive data)
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [credentials redacted]", name),
                Remove { name } => format!("profile remove {}", name),
            }
        }
        Commands::Operation(cmd) => {
            use cli::OperationCommands::*;
            match cmd {
                Get { name, scope } => format!("operation get {} ({})", name, scope.scope()),
                Wait { name, scope, .. } => {
                    format!("operation wait {} ({})", name, scope.scope())
                }
            }
        }
        Commands::Resource(cmd) => {
            use cli::ResourceCommands::*;
            let (verb, target) = match cmd {
                Create { target, .. } => ("create", target),
                Get { target } => ("get", target),
                Update { target, .. } => ("update", target),
                Delete { target, .. } => ("delete", target),
            };
            format!(
                "resource {} {} {} ({})",
                verb,
                target.kind,
                target.name,
                target.scope.scope()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_command_redacts_credentials() {
        let cli = Cli::parse_from([
            "gcectl",
            "profile",
            "set",
            "dev",
            "--project",
            "my-project",
            "--access-token",
            "ya29.secret",
        ]);
        let formatted = format_command(&cli.command);
        assert_eq!(formatted, "profile set dev [credentials redacted]");
        assert!(!formatted.contains("ya29"));
    }

    #[test]
    fn test_format_command_includes_scope() {
        let cli = Cli::parse_from([
            "gcectl",
            "operation",
            "wait",
            "operation-123",
            "--zone",
            "us-central1-a",
        ]);
        assert_eq!(
            format_command(&cli.command),
            "operation wait operation-123 (zone us-central1-a)"
        );
    }
}
