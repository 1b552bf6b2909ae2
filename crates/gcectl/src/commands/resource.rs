//! Resource command implementations

use std::io::Read;
use std::path::Path;

use crate::cli::{OutputFormat, ResourceCommands, ResourceTarget, WaitArgs};
use crate::commands::async_utils::{CtrlC, print_operation, spinner};
use crate::connection::ConnectionManager;
use crate::error::{GcectlError, Result as CliResult};
use crate::output::print_output;
use gcectl_core::{
    ComputeResource, Operation, OperationScope, ScopedResource, create_and_wait, delete_and_wait,
    update_and_wait,
};
use serde_json::Value;
use tracing::{debug, info};

/// Handle resource commands
pub async fn handle_resource_command(
    cmd: &ResourceCommands,
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    output_format: OutputFormat,
) -> CliResult<()> {
    match cmd {
        ResourceCommands::Create { target, body, wait } => {
            let body = read_body(body)?;
            let (resource, wait_settings) = bind(conn_mgr, profile_name, target, wait)?;
            let resource = resource.with_body(body);
            info!(kind = %target.kind, name = %target.name, "Creating resource");

            match wait_settings {
                Some(settings) => {
                    let (pb, callback) = spinner(&target.name, output_format);
                    let ctrl_c = CtrlC::watch();
                    let created = create_and_wait(
                        &resource,
                        resource.source(),
                        settings,
                        Some(callback),
                        Some(ctrl_c.token()),
                    )
                    .await;
                    finish(&pb);
                    print_output(created?, output_format)?;
                }
                None => started(&resource, resource.create().await?, output_format)?,
            }
            Ok(())
        }
        ResourceCommands::Get { target } => {
            let (resource, _) = bind(conn_mgr, profile_name, target, &WaitArgs::default())?;
            debug!(kind = %target.kind, name = %target.name, "Fetching resource");
            print_output(resource.read().await?, output_format)?;
            Ok(())
        }
        ResourceCommands::Update { target, body, wait } => {
            let body = read_body(body)?;
            let (resource, wait_settings) = bind(conn_mgr, profile_name, target, wait)?;
            let resource = resource.with_body(body);
            info!(kind = %target.kind, name = %target.name, "Updating resource");

            match wait_settings {
                Some(settings) => {
                    let (pb, callback) = spinner(&target.name, output_format);
                    let ctrl_c = CtrlC::watch();
                    let updated = update_and_wait(
                        &resource,
                        resource.source(),
                        settings,
                        Some(callback),
                        Some(ctrl_c.token()),
                    )
                    .await;
                    finish(&pb);
                    print_output(updated?, output_format)?;
                }
                None => started(&resource, resource.update().await?, output_format)?,
            }
            Ok(())
        }
        ResourceCommands::Delete { target, wait } => {
            let (resource, wait_settings) = bind(conn_mgr, profile_name, target, wait)?;
            info!(kind = %target.kind, name = %target.name, "Deleting resource");

            match wait_settings {
                Some(settings) => {
                    let (pb, callback) = spinner(&target.name, output_format);
                    let ctrl_c = CtrlC::watch();
                    let deleted = delete_and_wait(
                        &resource,
                        resource.source(),
                        settings,
                        Some(callback),
                        Some(ctrl_c.token()),
                    )
                    .await;
                    finish(&pb);
                    deleted?;
                    match output_format {
                        OutputFormat::Auto => {
                            println!("Deleted {} {}", target.kind, target.name)
                        }
                        _ => print_output(
                            serde_json::json!({
                                "kind": target.kind,
                                "name": target.name,
                                "deleted": true,
                            }),
                            output_format,
                        )?,
                    }
                }
                None => started(&resource, resource.delete().await?, output_format)?,
            }
            Ok(())
        }
    }
}

/// Bind a target to a client; poll settings are returned only with --wait
fn bind(
    conn_mgr: &ConnectionManager,
    profile_name: Option<&str>,
    target: &ResourceTarget,
    wait: &WaitArgs,
) -> CliResult<(ScopedResource, Option<gcectl_core::PollSettings>)> {
    let (client, settings) = conn_mgr.create_client(profile_name)?;
    let resource = ScopedResource::new(
        client,
        target.kind,
        target.scope.scope(),
        target.name.as_str(),
    )?;
    let settings = wait.wait.then(|| wait.poll.apply(settings));
    Ok((resource, settings))
}

fn finish(pb: &indicatif::ProgressBar) {
    if !pb.is_finished() {
        pb.finish_and_clear();
    }
}

/// Report an operation started without --wait
fn started(
    resource: &ScopedResource,
    operation: Operation,
    output_format: OutputFormat,
) -> CliResult<()> {
    print_operation(&operation, output_format)?;
    if output_format == OutputFormat::Auto && !operation.is_done() {
        // Operations carry their own scope; fall back to the resource's
        let scope = match operation.scope() {
            OperationScope::Global => resource.scope().clone(),
            scope => scope,
        };
        let scope_flag = match scope {
            OperationScope::Zonal(zone) => format!(" --zone {}", zone),
            OperationScope::Regional(region) => format!(" --region {}", region),
            OperationScope::Global => String::new(),
        };
        println!(
            "To wait for completion, run: gcectl operation wait {}{}",
            operation.display_name(),
            scope_flag
        );
    }
    Ok(())
}

/// Read a JSON object from a file, or stdin for '-'
fn read_body(path: &Path) -> CliResult<Value> {
    let display = path.display().to_string();
    let content = if display == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| GcectlError::FileError {
                path: display.clone(),
                message: e.to_string(),
            })?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|e| GcectlError::FileError {
            path: display.clone(),
            message: e.to_string(),
        })?
    };

    let body: Value = serde_json::from_str(&content).map_err(|e| GcectlError::FileError {
        path: display.clone(),
        message: format!("invalid JSON: {}", e),
    })?;
    if !body.is_object() {
        return Err(GcectlError::FileError {
            path: display,
            message: "expected a JSON object".to_string(),
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_read_body_rejects_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = read_body(&path).unwrap_err();
        assert!(err.to_string().contains("expected a JSON object"), "{err}");

        std::fs::write(&path, r#"{"network": "global/networks/default"}"#).unwrap();
        assert_eq!(
            read_body(&path).unwrap()["network"],
            "global/networks/default"
        );
    }

    #[test]
    fn test_read_body_missing_file() {
        let err = read_body(&PathBuf::from("/nonexistent/gcectl/body.json")).unwrap_err();
        assert!(matches!(err, GcectlError::FileError { .. }));
    }
}
