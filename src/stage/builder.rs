//! stage::builder
//!
//! Builds the per-alias stage resource.
//!
//! The stage is the alias's entry point into the shared REST surface: it
//! binds the relocated deployment to the surface imported from the base
//! template, carries the two stage variables the runtime URI splices consume,
//! and attaches the resolved per-method settings.

use serde_json::{json, Map, Value};

use crate::core::naming;
use crate::core::template::{import_value, ref_to, DependsOn, Resource};
use crate::core::types::{AliasName, StageName};

use super::options;
use super::resolver::MethodSetting;

/// Stage-level cache cluster settings, split off the service-level
/// configuration before per-method merging.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSettings {
    pub cluster_enabled: bool,
    pub cluster_size: Option<Value>,
}

impl CacheSettings {
    /// Extract the cache cluster settings from a service-level configuration.
    pub fn from_service_config(config: &Map<String, Value>) -> Self {
        Self {
            cluster_enabled: config
                .get(options::CACHE_CLUSTER_ENABLED)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            cluster_size: config.get(options::CACHE_CLUSTER_SIZE).cloned(),
        }
    }
}

/// Build the per-alias stage resource.
///
/// The stage binds to the deployment by reference and to the REST surface by
/// cross-template import; it depends explicitly on the deployment so the
/// deployment exists before the entry point.
pub fn build(
    rest_api_import: &str,
    deployment_name: &str,
    alias: &AliasName,
    stage: &StageName,
    service_name: &str,
    cache: &CacheSettings,
    method_settings: &[MethodSetting],
) -> Resource {
    let mut properties = json!({
        "StageName": alias.as_str(),
        "DeploymentId": ref_to(deployment_name),
        "RestApiId": import_value(rest_api_import),
        "Variables": {
            (naming::ALIAS_STAGE_VARIABLE): alias.as_str(),
            (naming::STAGE_STAGE_VARIABLE): stage.as_str(),
        },
        "Description": format!("Alias stage '{alias}' for {service_name}"),
    });

    // Cache clustering is shared across the stage, never per method; the
    // size is set only when explicitly requested.
    if cache.cluster_enabled {
        properties["CacheClusterEnabled"] = json!(true);
        if let Some(size) = &cache.cluster_size {
            properties["CacheClusterSize"] = size.clone();
        }
    }

    if !method_settings.is_empty() {
        properties["MethodSettings"] =
            Value::Array(method_settings.iter().map(MethodSetting::to_value).collect());
    }

    let mut resource = Resource::new(naming::STAGE_TYPE, properties);
    resource.depends_on = Some(DependsOn::Many(vec![deployment_name.to_string()]));
    resource
}
