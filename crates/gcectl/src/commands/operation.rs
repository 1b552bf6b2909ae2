//! Operation command implementations

use crate::cli::{OperationCommands, OutputFormat};
use crate::commands::async_utils::{print_operation, report_completion, wait_for_operation};
use crate::connection::ConnectionManager;
use crate::error::Result as CliResult;
use gcectl_core::{Operation, OperationScope};
use tracing::{debug, info};

/// Handle operation commands
pub async fn handle_operation_command(
    cmd: &OperationCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        OperationCommands::Get { name, scope } => {
            let (client, _) = conn_mgr.create_client(profile_name)?;
            let scope = scope.scope();
            debug!(operation = %name, scope = %scope, "Fetching operation");
            let operation = client.get_operation(&scope, name).await?;
            print_operation(&operation, output_format)
        }
        OperationCommands::Wait { name, scope, poll } => {
            let (client, settings) = conn_mgr.create_client(profile_name)?;
            let settings = poll.apply(settings);
            let operation = reference(name, &scope.scope());
            info!(operation = %name, timeout = ?settings.timeout, "Waiting for operation");
            let completion = wait_for_operation(&client, operation, settings, output_format).await?;
            report_completion(completion, output_format)
        }
    }
}

/// An operation reference that has not been fetched yet
fn reference(name: &str, scope: &OperationScope) -> Operation {
    let operation = Operation::new(name);
    match scope {
        OperationScope::Global => operation,
        OperationScope::Regional(region) => operation.with_region(region.as_str()),
        OperationScope::Zonal(zone) => operation.with_zone(zone.as_str()),
    }
}
