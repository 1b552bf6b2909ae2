//! Operation scope dispatch
//!
//! Compute Engine tracks operations per zone, per region, or globally, and each
//! has its own "get operation" endpoint. The scope is derived from the `zone`
//! and `region` URLs carried on the operation itself.

use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an operation (or resource) lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "location", rename_all = "lowercase")]
pub enum OperationScope {
    Global,
    Regional(String),
    Zonal(String),
}

impl OperationScope {
    /// Build a scope from optional zone and region values
    ///
    /// Zone is checked before region. Either value may be a full URL or a bare
    /// name; only the last path segment is kept. Values whose last segment is
    /// empty are ignored.
    pub fn from_parts(zone: Option<&str>, region: Option<&str>) -> Self {
        if let Some(zone) = zone.and_then(last_segment) {
            return OperationScope::Zonal(zone.to_string());
        }
        if let Some(region) = region.and_then(last_segment) {
            return OperationScope::Regional(region.to_string());
        }
        OperationScope::Global
    }

    /// The zone or region name, `None` for global
    pub fn location(&self) -> Option<&str> {
        match self {
            OperationScope::Global => None,
            OperationScope::Regional(location) | OperationScope::Zonal(location) => {
                Some(location)
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OperationScope::Global => "global",
            OperationScope::Regional(_) => "regional",
            OperationScope::Zonal(_) => "zonal",
        }
    }

    /// Path segments below `projects/{project}` for a collection in this scope
    ///
    /// `zones/{zone}/{collection}`, `regions/{region}/{collection}` or
    /// `global/{collection}`.
    pub fn collection_segments<'a>(&'a self, collection: &'a str) -> Vec<&'a str> {
        match self {
            OperationScope::Global => vec!["global", collection],
            OperationScope::Regional(region) => vec!["regions", region, collection],
            OperationScope::Zonal(zone) => vec!["zones", zone, collection],
        }
    }

    /// Path segments below `projects/{project}` of an operation in this scope
    pub fn operation_segments<'a>(&'a self, operation: &'a str) -> Vec<&'a str> {
        let mut segments = self.collection_segments("operations");
        segments.push(operation);
        segments
    }
}

impl fmt::Display for OperationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationScope::Global => write!(f, "global"),
            OperationScope::Regional(region) => write!(f, "region {region}"),
            OperationScope::Zonal(zone) => write!(f, "zone {zone}"),
        }
    }
}

/// Resolve the scope of an operation from its `zone` / `region` fields
pub fn resolve_scope(operation: &Operation) -> OperationScope {
    OperationScope::from_parts(operation.zone.as_deref(), operation.region.as_deref())
}

fn last_segment(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE_URL: &str = "https://www.googleapis.com/compute/v1/projects/p/zones/us-central1-a";
    const REGION_URL: &str = "https://www.googleapis.com/compute/v1/projects/p/regions/us-central1";

    #[test]
    fn test_zone_url_resolves_to_last_segment() {
        let op = Operation::new("op").with_zone(ZONE_URL);
        let scope = resolve_scope(&op);
        assert_eq!(scope, OperationScope::Zonal("us-central1-a".to_string()));
        assert_eq!(scope.location(), Some("us-central1-a"));
        assert_eq!(scope.kind(), "zonal");
    }

    #[test]
    fn test_region_url_resolves_to_regional() {
        let op = Operation::new("op").with_region(REGION_URL);
        assert_eq!(
            resolve_scope(&op),
            OperationScope::Regional("us-central1".to_string())
        );
    }

    #[test]
    fn test_no_location_is_global() {
        let scope = resolve_scope(&Operation::new("op"));
        assert_eq!(scope, OperationScope::Global);
        assert!(scope.location().is_none());
    }

    #[test]
    fn test_zone_checked_before_region() {
        let op = Operation::new("op").with_zone(ZONE_URL).with_region(REGION_URL);
        assert_eq!(resolve_scope(&op).kind(), "zonal");
    }

    #[test]
    fn test_bare_names_and_trailing_slashes() {
        assert_eq!(
            OperationScope::from_parts(Some("europe-west4-b"), None),
            OperationScope::Zonal("europe-west4-b".to_string())
        );
        assert_eq!(
            OperationScope::from_parts(None, Some("projects/p/regions/asia-east1/")),
            OperationScope::Regional("asia-east1".to_string())
        );
    }

    #[test]
    fn test_empty_location_is_ignored() {
        assert_eq!(
            OperationScope::from_parts(Some(""), Some(REGION_URL)),
            OperationScope::Regional("us-central1".to_string())
        );
        assert_eq!(
            OperationScope::from_parts(Some("/"), None),
            OperationScope::Global
        );
    }

    #[test]
    fn test_operation_segments() {
        let zonal = OperationScope::Zonal("us-east1-b".to_string());
        assert_eq!(
            zonal.operation_segments("op-123"),
            vec!["zones", "us-east1-b", "operations", "op-123"]
        );
        let regional = OperationScope::Regional("us-east1".to_string());
        assert_eq!(
            regional.operation_segments("op-123"),
            vec!["regions", "us-east1", "operations", "op-123"]
        );
        assert_eq!(
            OperationScope::Global.operation_segments("op-123"),
            vec!["global", "operations", "op-123"]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(OperationScope::Global.to_string(), "global");
        assert_eq!(
            OperationScope::Zonal("us-east1-b".to_string()).to_string(),
            "zone us-east1-b"
        );
    }
}
