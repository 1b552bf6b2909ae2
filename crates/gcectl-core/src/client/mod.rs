//! Compute Engine REST client
//!
//! A thin `reqwest` wrapper that knows how to address scoped collections and
//! operations, and maps HTTP failures onto [`ComputeError`].

mod error;

pub use error::ComputeError;

use crate::error::{CoreError, Result};
use crate::operation::Operation;
use crate::scope::OperationScope;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Base URL of the Compute Engine v1 API
pub const DEFAULT_API_URL: &str = "https://compute.googleapis.com/compute/v1";

/// Upper bound on any single API call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// User agent string for gcectl HTTP requests
const GCECTL_USER_AGENT: &str = concat!("gcectl/", env!("CARGO_PKG_VERSION"));

/// Fetches the latest state of an operation from its scoped endpoint
///
/// This is the only capability the poller needs. A "not found" response must
/// surface as [`ComputeError::NotFound`].
#[async_trait]
pub trait OperationSource: Send + Sync {
    async fn get_operation(
        &self,
        scope: &OperationScope,
        name: &str,
    ) -> std::result::Result<Operation, ComputeError>;
}

/// Authenticated client bound to a single project
#[derive(Clone, Debug)]
pub struct ComputeClient {
    http: reqwest::Client,
    base_url: Url,
    project: String,
    access_token: Option<String>,
}

/// Google API error envelope: `{"error": {"code": 404, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

impl ComputeClient {
    /// Create a client for `project` against `api_url`
    pub fn new(
        api_url: &str,
        project: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self> {
        let project = project.into();
        if project.trim().is_empty() {
            return Err(CoreError::Validation("project must not be empty".to_string()));
        }

        let base_url = Url::parse(api_url)
            .map_err(|e| CoreError::Validation(format!("invalid API URL '{api_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::Validation(format!(
                "API URL '{api_url}' cannot be used as a base URL"
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ComputeError::from)?;

        Ok(Self {
            http,
            base_url,
            project,
            access_token,
        })
    }

    /// The project every request is made against
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Build `{base}/projects/{project}/{segments...}`
    pub fn project_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base() was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("projects")
                .push(&self.project)
                .extend(segments);
        }
        url
    }

    /// Get an operation from the zonal, regional or global operations endpoint
    pub async fn get_operation(
        &self,
        scope: &OperationScope,
        name: &str,
    ) -> std::result::Result<Operation, ComputeError> {
        let url = self.project_url(&scope.operation_segments(name));
        self.send(self.request(Method::GET, url)).await
    }

    /// Insert a resource into a scoped collection
    pub async fn insert(
        &self,
        scope: &OperationScope,
        collection: &str,
        body: &Value,
    ) -> std::result::Result<Operation, ComputeError> {
        let url = self.project_url(&scope.collection_segments(collection));
        self.send(self.request(Method::POST, url).json(body)).await
    }

    /// Patch a named resource in a scoped collection
    pub async fn patch(
        &self,
        scope: &OperationScope,
        collection: &str,
        name: &str,
        body: &Value,
    ) -> std::result::Result<Operation, ComputeError> {
        let mut segments = scope.collection_segments(collection);
        segments.push(name);
        let url = self.project_url(&segments);
        self.send(self.request(Method::PATCH, url).json(body)).await
    }

    /// Delete a named resource from a scoped collection
    pub async fn delete(
        &self,
        scope: &OperationScope,
        collection: &str,
        name: &str,
    ) -> std::result::Result<Operation, ComputeError> {
        let mut segments = scope.collection_segments(collection);
        segments.push(name);
        let url = self.project_url(&segments);
        self.send(self.request(Method::DELETE, url)).await
    }

    /// Get a named resource from a scoped collection as raw JSON
    pub async fn get_resource(
        &self,
        scope: &OperationScope,
        collection: &str,
        name: &str,
    ) -> std::result::Result<Value, ComputeError> {
        let mut segments = scope.collection_segments(collection);
        segments.push(name);
        let url = self.project_url(&segments);
        self.send(self.request(Method::GET, url)).await
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let builder = self
            .http
            .request(method, url)
            .header(USER_AGENT, GCECTL_USER_AGENT)
            .header(ACCEPT, "application/json");
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<T, ComputeError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        trace!(status = status.as_u16(), body = %body, "Compute API response");

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|envelope| envelope.error.message)
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body.clone()
                }
            });
        debug!(status = status.as_u16(), error = %message, "Compute API error");
        Err(ComputeError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl OperationSource for ComputeClient {
    async fn get_operation(
        &self,
        scope: &OperationScope,
        name: &str,
    ) -> std::result::Result<Operation, ComputeError> {
        ComputeClient::get_operation(self, scope, name).await
    }
}
