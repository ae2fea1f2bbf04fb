//! engine::report
//!
//! Diagnostic counters for a partition pass.
//!
//! Silent skips are intentionally non-fatal, but they indicate unusual or
//! transitional states; the report makes them observable so operators do not
//! have to guess.

use serde::Serialize;

/// What a partition pass did, and what it skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionReport {
    /// Whether the surface was exposed at all. When false, nothing else
    /// happened.
    pub exposed: bool,

    /// The surface was exposed but no deployment resource was found, so
    /// relocation and everything after it was skipped.
    pub deployment_missing: bool,

    /// Function-backed method integrations redirected through the alias
    /// selector.
    pub methods_redirected: usize,

    /// Authorizers renamed (and their references rewritten).
    pub authorizers_renamed: usize,

    /// Invocation permissions relocated into the alias template.
    pub permissions_relocated: usize,

    /// Invocation permissions with no matching version/alias, dropped from
    /// both templates.
    pub permissions_dropped: usize,
}

impl PartitionReport {
    /// Whether the pass completed without any silent skip.
    pub fn is_clean(&self) -> bool {
        !self.deployment_missing && self.permissions_dropped == 0
    }

    /// Merge another report into this one.
    ///
    /// Boolean flags OR together; counters add. Useful when a caller runs
    /// one pass per surface and wants a single summary.
    pub fn merge(&mut self, other: &PartitionReport) {
        self.exposed |= other.exposed;
        self.deployment_missing |= other.deployment_missing;
        self.methods_redirected += other.methods_redirected;
        self.authorizers_renamed += other.authorizers_renamed;
        self.permissions_relocated += other.permissions_relocated;
        self.permissions_dropped += other.permissions_dropped;
    }
}
