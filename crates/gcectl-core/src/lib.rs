//! # gcectl-core
//!
//! Shared engine for tools that drive Compute Engine resources: the operation
//! model, the completion tracker that waits on asynchronous operations, the
//! REST client, configuration profiles, and create/update/delete workflows.
//!
//! Every mutating Compute Engine call returns an [`Operation`]. Callers hand it
//! to [`wait_for_completion`] (or an [`OperationPoller`] when they need
//! progress callbacks or cancellation) and get back a [`Completion`]:
//!
//! ```rust,ignore
//! use gcectl_core::{ComputeClient, DEFAULT_API_URL, wait_for_completion};
//! use std::time::Duration;
//!
//! let client = ComputeClient::new(DEFAULT_API_URL, "my-project", Some(token))?;
//! let operation = client.delete(&scope, "firewalls", "allow-ssh").await?;
//! let completion = wait_for_completion(&client, operation, Duration::from_secs(60)).await?;
//! completion.into_result()?;
//! ```
//!
//! ## Layout
//!
//! ```text
//! gcectl-core/
//! ├── src/
//! │   ├── lib.rs
//! │   ├── error.rs        # CoreError
//! │   ├── operation.rs    # Operation reference model
//! │   ├── scope.rs        # zonal / regional / global dispatch
//! │   ├── completion.rs   # Success / Failure / Unknown
//! │   ├── progress.rs     # the polling loop
//! │   ├── client/         # reqwest-backed Compute client
//! │   ├── resource.rs     # resource kinds and the CRUD capability
//! │   ├── workflows.rs    # create / update / delete and wait
//! │   └── config/         # profiles
//! ```

pub mod client;
pub mod completion;
pub mod config;
pub mod error;
pub mod operation;
pub mod progress;
pub mod resource;
pub mod scope;
pub mod workflows;

pub use client::{ComputeClient, ComputeError, DEFAULT_API_URL, OperationSource};
pub use completion::Completion;
pub use config::{Config, ConfigError, PollingConfig, Profile, ResolvedProfile};
pub use error::{CoreError, Result};
pub use operation::{Operation, OperationErrorDetails, OperationErrorEntry, OperationStatus};
pub use progress::{
    DEFAULT_POLL_INTERVAL, OperationPoller, PollSettings, ProgressCallback, ProgressEvent,
    wait_for_completion,
};
pub use resource::{ComputeResource, ResourceKind, ScopeKind, ScopedResource};
pub use scope::{OperationScope, resolve_scope};
pub use workflows::{create_and_wait, delete_and_wait, update_and_wait};
