//! Resource kinds and the mutation capability
//!
//! Resource callers implement [`ComputeResource`]; the workflows in
//! [`crate::workflows`] only need that trait and an [`OperationSource`] to
//! drive a mutation to completion. [`ScopedResource`] is a generic
//! implementation that sends raw JSON bodies to a scoped collection.

use crate::client::{ComputeClient, OperationSource};
use crate::error::{CoreError, Result};
use crate::operation::Operation;
use crate::scope::OperationScope;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Create / read / update / delete for one declared resource
///
/// Mutations return the provider's [`Operation`]; waiting on it is the
/// caller's business.
#[async_trait]
pub trait ComputeResource: Send + Sync {
    /// Representation returned by [`read`](ComputeResource::read)
    type Resource: Send;

    async fn create(&self) -> Result<Operation>;
    async fn read(&self) -> Result<Self::Resource>;
    async fn update(&self) -> Result<Operation>;
    async fn delete(&self) -> Result<Operation>;
}

/// Scope variant without a location, used to describe where a kind may live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Global,
    Regional,
    Zonal,
}

impl ScopeKind {
    pub fn of(scope: &OperationScope) -> Self {
        match scope {
            OperationScope::Global => ScopeKind::Global,
            OperationScope::Regional(_) => ScopeKind::Regional,
            OperationScope::Zonal(_) => ScopeKind::Zonal,
        }
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeKind::Global => write!(f, "global"),
            ScopeKind::Regional => write!(f, "regional"),
            ScopeKind::Zonal => write!(f, "zonal"),
        }
    }
}

/// Compute Engine resource types handled by the generic collection binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Address,
    Autoscaler,
    BackendService,
    Disk,
    Firewall,
    HealthCheck,
    Instance,
    InstanceGroupManager,
    InstanceTemplate,
    Network,
    Router,
    SecurityPolicy,
    Subnetwork,
    UrlMap,
}

impl ResourceKind {
    /// API collection name
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::Address => "addresses",
            ResourceKind::Autoscaler => "autoscalers",
            ResourceKind::BackendService => "backendServices",
            ResourceKind::Disk => "disks",
            ResourceKind::Firewall => "firewalls",
            ResourceKind::HealthCheck => "healthChecks",
            ResourceKind::Instance => "instances",
            ResourceKind::InstanceGroupManager => "instanceGroupManagers",
            ResourceKind::InstanceTemplate => "instanceTemplates",
            ResourceKind::Network => "networks",
            ResourceKind::Router => "routers",
            ResourceKind::SecurityPolicy => "securityPolicies",
            ResourceKind::Subnetwork => "subnetworks",
            ResourceKind::UrlMap => "urlMaps",
        }
    }

    /// Scopes the API exposes this collection in
    pub fn allowed_scopes(self) -> &'static [ScopeKind] {
        use ScopeKind::*;
        match self {
            ResourceKind::Firewall | ResourceKind::Network => &[Global],
            ResourceKind::Router | ResourceKind::Subnetwork => &[Regional],
            ResourceKind::Instance => &[Zonal],
            ResourceKind::Address
            | ResourceKind::BackendService
            | ResourceKind::HealthCheck
            | ResourceKind::InstanceTemplate
            | ResourceKind::SecurityPolicy
            | ResourceKind::UrlMap => &[Global, Regional],
            ResourceKind::Autoscaler
            | ResourceKind::Disk
            | ResourceKind::InstanceGroupManager => &[Zonal, Regional],
        }
    }

    /// Whether the collection accepts `PATCH` on a named resource
    pub fn supports_patch(self) -> bool {
        matches!(
            self,
            ResourceKind::BackendService
                | ResourceKind::Firewall
                | ResourceKind::HealthCheck
                | ResourceKind::InstanceGroupManager
                | ResourceKind::Network
                | ResourceKind::Router
                | ResourceKind::SecurityPolicy
                | ResourceKind::Subnetwork
                | ResourceKind::UrlMap
        )
    }

    /// Reject scopes the API does not expose for this kind
    pub fn check_scope(self, scope: &OperationScope) -> Result<()> {
        let kind = ScopeKind::of(scope);
        if self.allowed_scopes().contains(&kind) {
            Ok(())
        } else {
            let allowed: Vec<String> = self
                .allowed_scopes()
                .iter()
                .map(ToString::to_string)
                .collect();
            Err(CoreError::Validation(format!(
                "{} resources cannot be {kind}; expected {}",
                self.collection(),
                allowed.join(" or ")
            )))
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// A named resource in a scoped collection, with its desired JSON body
///
/// No field translation happens here: the body is sent as-is, with `name`
/// filled in when missing.
#[derive(Debug, Clone)]
pub struct ScopedResource {
    client: ComputeClient,
    kind: ResourceKind,
    scope: OperationScope,
    name: String,
    body: Value,
}

impl ScopedResource {
    pub fn new(
        client: ComputeClient,
        kind: ResourceKind,
        scope: OperationScope,
        name: impl Into<String>,
    ) -> Result<Self> {
        kind.check_scope(&scope)?;
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::Validation(
                "resource name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            client,
            kind,
            scope,
            name,
            body: Value::Object(Default::default()),
        })
    }

    /// Set the desired state sent on create and update
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn scope(&self) -> &OperationScope {
        &self.scope
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client, for waiting on the returned operations
    pub fn source(&self) -> &dyn OperationSource {
        &self.client
    }

    fn named_body(&self) -> Result<Value> {
        let mut body = self.body.clone();
        let Some(object) = body.as_object_mut() else {
            return Err(CoreError::Validation(format!(
                "{} body must be a JSON object",
                self.kind
            )));
        };
        match object.get("name").and_then(Value::as_str) {
            Some(existing) if existing != self.name => {
                return Err(CoreError::Validation(format!(
                    "body name '{existing}' does not match resource name '{}'",
                    self.name
                )));
            }
            Some(_) => {}
            None => {
                object.insert("name".to_string(), Value::String(self.name.clone()));
            }
        }
        Ok(body)
    }
}

#[async_trait]
impl ComputeResource for ScopedResource {
    type Resource = Value;

    async fn create(&self) -> Result<Operation> {
        debug!(kind = %self.kind, name = %self.name, scope = %self.scope, "Creating resource");
        let body = self.named_body()?;
        Ok(self
            .client
            .insert(&self.scope, self.kind.collection(), &body)
            .await?)
    }

    async fn read(&self) -> Result<Value> {
        Ok(self
            .client
            .get_resource(&self.scope, self.kind.collection(), &self.name)
            .await?)
    }

    async fn update(&self) -> Result<Operation> {
        if !self.kind.supports_patch() {
            return Err(CoreError::Validation(format!(
                "{} cannot be updated in place",
                self.kind
            )));
        }
        debug!(kind = %self.kind, name = %self.name, scope = %self.scope, "Updating resource");
        let body = self.named_body()?;
        Ok(self
            .client
            .patch(&self.scope, self.kind.collection(), &self.name, &body)
            .await?)
    }

    async fn delete(&self) -> Result<Operation> {
        debug!(kind = %self.kind, name = %self.name, scope = %self.scope, "Deleting resource");
        Ok(self
            .client
            .delete(&self.scope, self.kind.collection(), &self.name)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_API_URL;
    use serde_json::json;

    fn client() -> ComputeClient {
        ComputeClient::new(DEFAULT_API_URL, "p", None).unwrap()
    }

    #[test]
    fn test_scope_checks() {
        assert!(ResourceKind::Firewall.check_scope(&OperationScope::Global).is_ok());
        assert!(
            ResourceKind::Firewall
                .check_scope(&OperationScope::Zonal("us-east1-b".to_string()))
                .is_err()
        );
        assert!(
            ResourceKind::Disk
                .check_scope(&OperationScope::Regional("us-east1".to_string()))
                .is_ok()
        );
        let err = ResourceKind::Router
            .check_scope(&OperationScope::Global)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: routers resources cannot be global; expected regional"
        );
    }

    #[test]
    fn test_named_body_fills_in_name() {
        let resource = ScopedResource::new(client(), ResourceKind::Firewall, OperationScope::Global, "allow-ssh")
            .unwrap()
            .with_body(json!({"network": "global/networks/default"}));
        let body = resource.named_body().unwrap();
        assert_eq!(body["name"], "allow-ssh");
        assert_eq!(body["network"], "global/networks/default");
    }

    #[test]
    fn test_named_body_rejects_mismatch_and_non_objects() {
        let resource = ScopedResource::new(client(), ResourceKind::Firewall, OperationScope::Global, "a")
            .unwrap()
            .with_body(json!({"name": "b"}));
        assert!(resource.named_body().is_err());

        let resource = ScopedResource::new(client(), ResourceKind::Firewall, OperationScope::Global, "a")
            .unwrap()
            .with_body(json!(["not", "an", "object"]));
        assert!(resource.named_body().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(
            ScopedResource::new(client(), ResourceKind::Network, OperationScope::Global, "")
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_update_rejected_without_patch_support() {
        let resource = ScopedResource::new(
            client(),
            ResourceKind::Disk,
            OperationScope::Zonal("us-east1-b".to_string()),
            "data",
        )
        .unwrap();
        let err = resource.update().await.unwrap_err();
        assert!(err.is_bad_request(), "{err:?}");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ResourceKind::BackendService.to_string(), "backendServices");
        assert_eq!(
            serde_json::to_value(ResourceKind::InstanceTemplate).unwrap(),
            json!("instance-template")
        );
    }
}
