//! engine
//!
//! Orchestrates the partition pass: validate -> exposure -> exports -> guard
//! -> deployment -> stage -> methods -> authorizers -> permissions.
//!
//! # Architecture
//!
//! The engine is a pure, synchronous, single-pass transformation over the
//! supplied template trees. Validation is fully separated from mutation:
//! stage configuration and rename targets are checked up front, so a
//! configuration error leaves the templates byte-identical to their inputs.
//! Each resource category is then processed by its own stage module, in a
//! fixed order, mutating the set in place; the pass returns a diagnostic
//! [`PartitionReport`].
//!
//! # Stage order
//!
//! 1. [`exposure`] - detect/recover the surface, publish exports, guard
//!    against the retired per-endpoint alias layout
//! 2. [`deployment`] - relocate the deployment and attach the alias stage
//! 3. [`methods`] - redirect function-backed method targets
//! 4. [`authorizers`] - redirect, rename, and rewrite authorizers
//! 5. [`permissions`] - rebind invocation permissions to function aliases
//!
//! # Invariants
//!
//! - No mutation before validation completes
//! - No stage is retried or revisited
//! - A renamed resource's old name survives in no reference or dependency

pub mod authorizers;
pub mod deployment;
pub mod exposure;
pub mod methods;
pub mod permissions;
pub mod report;

pub use report::PartitionReport;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::naming;
use crate::core::template::{Resource, Template};
use crate::core::types::{AliasName, StageName};
use crate::stage::resolver::{self, ConfigError, FunctionEndpoints};

/// Caller-supplied context for one partition pass.
#[derive(Debug, Clone)]
pub struct PartitionContext {
    /// Human-readable service name, used in descriptions.
    pub service_name: String,

    /// Deployed stack name; prefixes every cross-template export.
    pub stack_name: String,

    /// The deployment alias this pass partitions for.
    pub alias: AliasName,

    /// The deployment stage backing the alias.
    pub stage: StageName,

    /// Service-level stage configuration, including the stage-level cache
    /// cluster keys.
    pub service_config: Map<String, Value>,

    /// Per-function endpoint descriptors with their configuration overlays.
    pub functions: Vec<FunctionEndpoints>,

    /// Caller-supplied resource overrides, keyed by resource name. Each
    /// entry is consumed at most once.
    pub overrides: Map<String, Value>,
}

/// The template trees one partition pass reads and mutates.
///
/// `base` and `alias` are the pair being built this pass and are mutated in
/// place; the three deployed trees are read-only inputs. The alias template
/// arrives pre-seeded with the function-aliasing pass's alias and version
/// resources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSet {
    /// Current base template (being built; mutated).
    pub base: Template,

    /// Current alias template (being built; mutated).
    pub alias: Template,

    /// Deployed base template; recovery source for the surface resource.
    pub deployed_base: Template,

    /// Deployed template of this alias; subject of the legacy-layout guard.
    pub deployed_alias: Template,

    /// Deployed templates of all other aliases; never mutated.
    pub other_aliases: Vec<Template>,
}

/// Errors from a partition pass.
#[derive(Debug, Error)]
pub enum PartitionError {
    /// Stage configuration failed validation; no template was touched.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Renaming an authorizer for the alias would collide with an existing
    /// resource; no template was touched.
    #[error("renaming '{name}' for alias '{alias}' collides with existing resource '{renamed}'")]
    NameCollision {
        name: String,
        alias: String,
        renamed: String,
    },

    /// A deployed alias template still owns per-endpoint resources directly.
    /// The layout is retired and cannot be partitioned; remove the alias
    /// stacks and the alias's API stage, then redeploy.
    #[error(
        "alias templates own per-endpoint API resources, a retired layout: \
         remove the alias stacks and the API stage for the alias, then redeploy"
    )]
    LegacyLayout,

    /// A caller-supplied override did not merge into a valid resource.
    #[error("override for resource '{name}' could not be applied: {source}")]
    InvalidOverride {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Run one partition pass, mutating `templates` in place.
///
/// Resolves and validates all configuration first; on success, relocates,
/// renames, and rewrites resources across the base/alias pair and returns a
/// diagnostic report.
///
/// # Errors
///
/// [`PartitionError::Config`] and [`PartitionError::NameCollision`] abort
/// before any mutation, leaving `templates` identical to its input.
/// [`PartitionError::LegacyLayout`] aborts after export publication, the
/// single partial-mutation case; callers must discard the trees rather than
/// retry.
pub fn partition(
    ctx: &PartitionContext,
    templates: &mut TemplateSet,
) -> Result<PartitionReport, PartitionError> {
    let mut report = PartitionReport::default();

    // Validate everything before touching any template.
    let method_settings = resolver::resolve(&ctx.service_config, &ctx.functions)?;
    validate_rename_targets(&templates.base, &ctx.alias)?;

    if !exposure::ensure_exposed(templates) {
        debug!("surface is not exposed; templates returned unchanged");
        return Ok(report);
    }
    report.exposed = true;
    debug!("processing exposed API surface");

    exposure::publish_exports(&mut templates.base, &ctx.stack_name);
    exposure::guard_legacy_layout(templates)?;

    if !deployment::relocate_and_attach(templates, ctx, &method_settings) {
        report.deployment_missing = true;
        warn!(
            alias = %ctx.alias,
            "surface is exposed but owns no deployment resource; skipping alias partitioning"
        );
        return Ok(report);
    }

    // The override pool is consumed entry by entry as categories claim
    // their resources.
    let mut overrides = ctx.overrides.clone();

    methods::redirect(&mut templates.base, &mut overrides, &mut report)?;
    authorizers::redirect_and_rename(&mut templates.base, ctx, &mut overrides, &mut report)?;
    permissions::rebind(templates, ctx, &mut report)?;

    Ok(report)
}

/// Fail on any authorizer whose aliased name collides with an existing
/// resource. Runs before any mutation.
fn validate_rename_targets(base: &Template, alias: &AliasName) -> Result<(), PartitionError> {
    for name in base.names_of_type(naming::AUTHORIZER_TYPE) {
        let renamed = naming::aliased_logical_id(&name, alias);
        if base.has_resource(&renamed) {
            return Err(PartitionError::NameCollision {
                name,
                alias: alias.to_string(),
                renamed,
            });
        }
    }
    Ok(())
}

/// Apply and consume a caller-supplied override for `name`, if one exists.
pub(crate) fn apply_override(
    resource: &mut Resource,
    name: &str,
    overrides: &mut Map<String, Value>,
) -> Result<(), PartitionError> {
    if let Some(overlay) = overrides.remove(name) {
        resource
            .merge_overlay(&overlay)
            .map_err(|source| PartitionError::InvalidOverride {
                name: name.to_string(),
                source,
            })?;
    }
    Ok(())
}
