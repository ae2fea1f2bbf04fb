//! stage::resolver
//!
//! Three-level stage configuration overlay resolution.
//!
//! # Precedence
//!
//! Endpoint-level configuration takes precedence over function-level
//! configuration, which takes precedence over service-level configuration.
//! The merge is shallow per key: the first-defined value wins, nested option
//! values are never deep-merged.
//!
//! # Contract
//!
//! Resolution validates every endpoint of every function against the closed
//! option registry and fails on the first unknown key or invalid value.
//! Callers run resolution to completion before mutating any template, so a
//! configuration error leaves all templates untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::options::{self, StageOption};

/// Errors from stage configuration validation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A configured key is not in the option registry.
    #[error("invalid stage config '{key}' at method '{method} /{path}'")]
    UnknownOption {
        key: String,
        method: String,
        path: String,
    },

    /// A configured value fails its option's validator.
    #[error("invalid value for stage config '{key}: {value}' at method '{method} /{path}'")]
    InvalidValue {
        key: String,
        value: Value,
        method: String,
        path: String,
    },
}

/// An HTTP endpoint of a function, with its endpoint-level overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpEndpoint {
    pub method: String,
    pub path: String,
    pub alias_stage: Map<String, Value>,
}

/// A function with its endpoints and function-level overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionEndpoints {
    pub name: String,
    pub alias_stage: Map<String, Value>,
    pub endpoints: Vec<HttpEndpoint>,
}

/// One resolved per-method settings entry.
///
/// Serializes flat: the mapped properties plus `HttpMethod` and
/// `ResourcePath`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSetting {
    pub http_method: String,
    pub resource_path: String,
    pub properties: Map<String, Value>,
}

impl MethodSetting {
    /// Render as the flat settings-list entry.
    pub fn to_value(&self) -> Value {
        let mut map = self.properties.clone();
        map.insert("HttpMethod".into(), Value::String(self.http_method.clone()));
        map.insert(
            "ResourcePath".into(),
            Value::String(self.resource_path.clone()),
        );
        Value::Object(map)
    }
}

/// Render an endpoint path in the settings-list addressing convention:
/// a leading `/`, with interior slashes escaped to `~1`.
pub fn escape_resource_path(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/').replace('/', "~1"))
}

/// Resolve the per-method settings for every endpoint of every function.
///
/// The service-level configuration is consulted after the stage-level cache
/// keys are split off. The output carries one entry per (method, path) pair
/// with at least one non-default option; an option resolving to its declared
/// default is elided.
///
/// # Errors
///
/// Fails with [`ConfigError`] on the first unknown key or invalid value,
/// naming the offending method and path. No template is touched by this
/// function.
pub fn resolve(
    service_config: &Map<String, Value>,
    functions: &[FunctionEndpoints],
) -> Result<Vec<MethodSetting>, ConfigError> {
    let mut service = service_config.clone();
    service.remove(options::CACHE_CLUSTER_ENABLED);
    service.remove(options::CACHE_CLUSTER_SIZE);

    let mut settings = Vec::new();

    for function in functions {
        let function_config = overlay(&function.alias_stage, &service);

        for endpoint in &function.endpoints {
            let endpoint_config = overlay(&endpoint.alias_stage, &function_config);
            if endpoint_config.is_empty() {
                continue;
            }

            let method = endpoint.method.to_uppercase();
            let mut properties = Map::new();

            for (key, value) in &endpoint_config {
                let option = lookup(key, &method, &endpoint.path)?;
                if !option.validate.accepts(value) {
                    return Err(ConfigError::InvalidValue {
                        key: key.clone(),
                        value: value.clone(),
                        method: method.clone(),
                        path: display_path(&endpoint.path),
                    });
                }
                let at_default = option
                    .default
                    .map_or(false, |default| default.matches(value));
                if !at_default {
                    properties.insert(option.property.to_string(), value.clone());
                }
            }

            if !properties.is_empty() {
                settings.push(MethodSetting {
                    http_method: method,
                    resource_path: escape_resource_path(&endpoint.path),
                    properties,
                });
            }
        }
    }

    Ok(settings)
}

/// Shallow overlay: `primary` wins, `fallback` fills the gaps.
fn overlay(primary: &Map<String, Value>, fallback: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = primary.clone();
    for (key, value) in fallback {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn lookup(key: &str, method: &str, path: &str) -> Result<&'static StageOption, ConfigError> {
    options::lookup(key).ok_or_else(|| ConfigError::UnknownOption {
        key: key.to_string(),
        method: method.to_string(),
        path: display_path(path),
    })
}

fn display_path(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}
