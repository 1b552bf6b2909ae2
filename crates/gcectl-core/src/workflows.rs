//! Mutation workflows
//!
//! These compose a [`ComputeResource`] mutation with the completion tracker:
//! start the mutation, wait for its operation, surface provider failures as
//! errors, and read the resource back where that makes sense.

use crate::client::OperationSource;
use crate::completion::Completion;
use crate::error::Result;
use crate::operation::Operation;
use crate::progress::{OperationPoller, PollSettings, ProgressCallback};
use crate::resource::ComputeResource;
use tokio_util::sync::CancellationToken;
use tracing::info;

async fn wait<S>(
    source: &S,
    operation: Operation,
    settings: PollSettings,
    on_progress: Option<ProgressCallback>,
    cancel: Option<CancellationToken>,
) -> Result<Completion>
where
    S: OperationSource + ?Sized,
{
    let poller = OperationPoller::new(source, settings);
    let poller = match on_progress {
        Some(callback) => poller.on_progress(callback),
        None => poller,
    };
    let poller = match cancel {
        Some(token) => poller.cancel_on(token),
        None => poller,
    };
    poller.wait(operation).await
}

/// Create a resource and wait for completion
///
/// This is a convenience workflow that:
/// 1. Starts the create (returns an operation)
/// 2. Polls the operation until completion
/// 3. Reads and returns the created resource
///
/// A cancelled `cancel` token stops the wait with
/// [`CoreError::Cancelled`](crate::CoreError::Cancelled);
/// the mutation itself is not rolled back.
///
/// # Example
///
/// ```rust,ignore
/// use gcectl_core::{ResourceKind, ScopedResource, OperationScope, PollSettings, create_and_wait};
/// use serde_json::json;
/// use std::time::Duration;
///
/// let firewall = ScopedResource::new(client.clone(), ResourceKind::Firewall, OperationScope::Global, "allow-ssh")?
///     .with_body(json!({"network": "global/networks/default", "allowed": [{"IPProtocol": "tcp", "ports": ["22"]}]}));
///
/// let created = create_and_wait(
///     &firewall,
///     &client,
///     PollSettings::new(Duration::from_secs(60)),
///     None,  // No progress callback
///     None,  // Not cancellable
/// ).await?;
/// ```
pub async fn create_and_wait<R, S>(
    resource: &R,
    source: &S,
    settings: PollSettings,
    on_progress: Option<ProgressCallback>,
    cancel: Option<CancellationToken>,
) -> Result<R::Resource>
where
    R: ComputeResource + ?Sized,
    S: OperationSource + ?Sized,
{
    // Step 1: Create (returns operation)
    let operation = resource.create().await?;

    // Step 2: Poll until complete
    wait(source, operation, settings, on_progress, cancel)
        .await?
        .into_result()?;

    // Step 3: Fetch the created resource
    resource.read().await
}

/// Update a resource and wait for completion
///
/// Returns the resource as read back after the update finished.
pub async fn update_and_wait<R, S>(
    resource: &R,
    source: &S,
    settings: PollSettings,
    on_progress: Option<ProgressCallback>,
    cancel: Option<CancellationToken>,
) -> Result<R::Resource>
where
    R: ComputeResource + ?Sized,
    S: OperationSource + ?Sized,
{
    let operation = resource.update().await?;

    wait(source, operation, settings, on_progress, cancel)
        .await?
        .into_result()?;

    resource.read().await
}

/// Delete a resource and wait for completion
///
/// A resource that is already gone (404 on the delete call) counts as deleted.
pub async fn delete_and_wait<R, S>(
    resource: &R,
    source: &S,
    settings: PollSettings,
    on_progress: Option<ProgressCallback>,
    cancel: Option<CancellationToken>,
) -> Result<()>
where
    R: ComputeResource + ?Sized,
    S: OperationSource + ?Sized,
{
    let operation = match resource.delete().await {
        Ok(operation) => operation,
        Err(e) if e.is_not_found() => {
            info!("Resource already deleted");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    wait(source, operation, settings, on_progress, cancel)
        .await?
        .into_result()?;

    Ok(())
}
