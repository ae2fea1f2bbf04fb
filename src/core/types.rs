//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`AliasName`] - Validated deployment alias name
//! - [`StageName`] - Validated deployment stage name
//!
//! # Validation
//!
//! These types enforce validity at construction time. An alias name is
//! appended to template logical ids when resources are renamed per alias, so
//! it must itself be a valid logical-id fragment. Invalid values cannot be
//! represented.
//!
//! # Examples
//!
//! ```
//! use stackalias::core::types::{AliasName, StageName};
//!
//! let alias = AliasName::new("prod").unwrap();
//! assert_eq!(alias.as_str(), "prod");
//!
//! assert!(AliasName::new("").is_err());
//! assert!(AliasName::new("my-alias").is_err());
//! assert!(StageName::new("dev").is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid alias name: {0}")]
    InvalidAliasName(String),

    #[error("invalid stage name: {0}")]
    InvalidStageName(String),
}

/// A validated deployment alias name.
///
/// Alias names are appended verbatim to logical ids (`MyAuthorizer` becomes
/// `MyAuthorizerprod`), so they are restricted to ASCII alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AliasName(String);

impl AliasName {
    /// Create a new validated alias name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidAliasName` if the name is empty or contains
    /// anything but ASCII alphanumerics.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidAliasName(
                "alias name cannot be empty".into(),
            ));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TypeError::InvalidAliasName(format!(
                "alias name '{name}' must contain only ASCII alphanumerics"
            )));
        }
        Ok(Self(name))
    }

    /// Get the alias name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AliasName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AliasName> for String {
    fn from(name: AliasName) -> Self {
        name.0
    }
}

impl AsRef<str> for AliasName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AliasName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated deployment stage name.
///
/// Stage names only appear as stage-variable values and in descriptions, so
/// the rules are looser than for [`AliasName`]: alphanumerics plus `-` and
/// `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StageName(String);

impl StageName {
    /// Create a new validated stage name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidStageName` if the name is empty or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidStageName(
                "stage name cannot be empty".into(),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TypeError::InvalidStageName(format!(
                "stage name '{name}' must contain only ASCII alphanumerics, '-' or '_'"
            )));
        }
        Ok(Self(name))
    }

    /// Get the stage name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StageName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<StageName> for String {
    fn from(name: StageName) -> Self {
        name.0
    }
}

impl AsRef<str> for StageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_name_accepts_alphanumerics() {
        assert_eq!(AliasName::new("prod").unwrap().as_str(), "prod");
        assert_eq!(AliasName::new("dev2").unwrap().as_str(), "dev2");
    }

    #[test]
    fn alias_name_rejects_invalid() {
        assert!(AliasName::new("").is_err());
        assert!(AliasName::new("my-alias").is_err());
        assert!(AliasName::new("has space").is_err());
        assert!(AliasName::new("weird/char").is_err());
    }

    #[test]
    fn stage_name_accepts_dashes_and_underscores() {
        assert!(StageName::new("dev").is_ok());
        assert!(StageName::new("pre-prod").is_ok());
        assert!(StageName::new("us_east").is_ok());
    }

    #[test]
    fn stage_name_rejects_invalid() {
        assert!(StageName::new("").is_err());
        assert!(StageName::new("has space").is_err());
        assert!(StageName::new("a/b").is_err());
    }

    #[test]
    fn alias_name_serde_roundtrip() {
        let alias = AliasName::new("prod").unwrap();
        let json = serde_json::to_string(&alias).unwrap();
        assert_eq!(json, "\"prod\"");
        let parsed: AliasName = serde_json::from_str(&json).unwrap();
        assert_eq!(alias, parsed);
    }

    #[test]
    fn alias_name_serde_rejects_invalid() {
        let parsed: Result<AliasName, _> = serde_json::from_str("\"not valid\"");
        assert!(parsed.is_err());
    }
}
