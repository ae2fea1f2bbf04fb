//! stage::options
//!
//! The closed registry of per-method stage options.
//!
//! Each option maps a configuration key to the property it sets on a method
//! setting, the validator its value must satisfy, and optionally a declared
//! default. A key resolving to its default is elided from generated settings.

use serde_json::Value;

/// Service-level key enabling the shared stage cache cluster.
///
/// Split off before per-method merging: cache clustering is a stage-level
/// concern, not a method setting.
pub const CACHE_CLUSTER_ENABLED: &str = "cacheClusterEnabled";

/// Service-level key sizing the shared stage cache cluster.
pub const CACHE_CLUSTER_SIZE: &str = "cacheClusterSize";

/// Validation rule for an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Boolean,
    Integer,
    Number,
    /// One of `OFF`, `INFO`, `ERROR`.
    LoggingLevel,
}

impl Validator {
    /// Whether the value satisfies this rule.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
            Self::Number => value.is_number(),
            Self::LoggingLevel => matches!(value.as_str(), Some("OFF" | "INFO" | "ERROR")),
        }
    }
}

/// A declared default, comparable against configured values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Str(&'static str),
}

impl DefaultValue {
    /// Whether the configured value equals this default.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::Bool(default) => value.as_bool() == Some(*default),
            Self::Str(default) => value.as_str() == Some(*default),
        }
    }
}

/// One entry of the option registry.
#[derive(Debug, Clone, Copy)]
pub struct StageOption {
    /// Configuration key, as written by the caller.
    pub key: &'static str,
    /// Property name on the generated method setting.
    pub property: &'static str,
    /// Validation rule for the value.
    pub validate: Validator,
    /// Declared default; values equal to it are elided.
    pub default: Option<DefaultValue>,
}

/// The fixed, closed option registry.
pub const STAGE_OPTIONS: [StageOption; 8] = [
    StageOption {
        key: "cacheDataEncrypted",
        property: "CacheDataEncrypted",
        validate: Validator::Boolean,
        default: Some(DefaultValue::Bool(false)),
    },
    StageOption {
        key: "cacheTtlInSeconds",
        property: "CacheTtlInSeconds",
        validate: Validator::Integer,
        default: None,
    },
    StageOption {
        key: "cachingEnabled",
        property: "CachingEnabled",
        validate: Validator::Boolean,
        default: Some(DefaultValue::Bool(false)),
    },
    StageOption {
        key: "dataTraceEnabled",
        property: "DataTraceEnabled",
        validate: Validator::Boolean,
        default: Some(DefaultValue::Bool(false)),
    },
    StageOption {
        key: "loggingLevel",
        property: "LoggingLevel",
        validate: Validator::LoggingLevel,
        default: Some(DefaultValue::Str("OFF")),
    },
    StageOption {
        key: "metricsEnabled",
        property: "MetricsEnabled",
        validate: Validator::Boolean,
        default: Some(DefaultValue::Bool(false)),
    },
    StageOption {
        key: "throttlingBurstLimit",
        property: "ThrottlingBurstLimit",
        validate: Validator::Integer,
        default: None,
    },
    StageOption {
        key: "throttlingRateLimit",
        property: "ThrottlingRateLimit",
        validate: Validator::Number,
        default: None,
    },
];

/// Look up a registry entry by configuration key.
pub fn lookup(key: &str) -> Option<&'static StageOption> {
    STAGE_OPTIONS.iter().find(|option| option.key == key)
}
