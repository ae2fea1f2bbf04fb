//! engine::authorizers
//!
//! Authorizer redirection, renaming, and reference rewriting.
//!
//! Stage variables are not allowed in authorizer URIs the way they are in
//! integration URIs, so the splice anchors on the `/invocations` tail
//! instead of the function reference. Authorizers stay base-owned but are
//! renamed per alias - both logical id and display name - so multiple alias
//! templates can coexist; every reference and dependency naming the old id
//! is rewritten via the walker.

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::naming;
use crate::core::template::{ref_to, Resource, Template};
use crate::core::walker;

use super::{apply_override, PartitionContext, PartitionError, PartitionReport};

/// Redirect, rename, and rewrite every authorizer in the base template.
pub(crate) fn redirect_and_rename(
    base: &mut Template,
    ctx: &PartitionContext,
    overrides: &mut Map<String, Value>,
    report: &mut PartitionReport,
) -> Result<(), PartitionError> {
    for name in base.names_of_type(naming::AUTHORIZER_TYPE) {
        let aliased = naming::aliased_logical_id(&name, &ctx.alias);

        let Some(mut authorizer) = base.remove_resource(&name) else {
            continue;
        };

        if is_token_authorizer(&authorizer) {
            splice_alias_selector(&mut authorizer);
        }

        if let Some(display) = authorizer.property("Name").and_then(Value::as_str) {
            let renamed = naming::aliased_display_name(display, &ctx.alias);
            authorizer.set_property("Name", Value::String(renamed));
        }

        apply_override(&mut authorizer, &name, overrides)?;

        rewrite_references(base, &name, &aliased);
        rewrite_dependencies(base, &name, &aliased);

        debug!(authorizer = %name, renamed = %aliased, "renamed authorizer for alias");
        base.insert_resource(aliased, authorizer);
        report.authorizers_renamed += 1;
    }
    Ok(())
}

/// Whether the authorizer validates a token (and thus carries a function
/// invocation URI).
fn is_token_authorizer(authorizer: &Resource) -> bool {
    authorizer.property("Type").and_then(Value::as_str) == Some(naming::TOKEN_AUTHORIZER)
}

/// Splice the alias selector into the authorizer URI, immediately before
/// the `/invocations` tail.
fn splice_alias_selector(authorizer: &mut Resource) -> bool {
    let parts = match authorizer
        .properties
        .pointer_mut("/AuthorizerUri/Fn::Join/1")
        .and_then(Value::as_array_mut)
    {
        Some(parts) => parts,
        None => return false,
    };

    let Some(invocations_ix) = parts
        .iter()
        .position(|part| part.as_str() == Some(naming::INVOCATIONS_SEGMENT))
    else {
        return false;
    };

    parts.insert(
        invocations_ix,
        Value::String(naming::ALIAS_URI_SELECTOR.to_string()),
    );
    true
}

/// Rewrite every reference to `old` anywhere in the base template to a
/// `{Ref: new}` node.
fn rewrite_references(base: &mut Template, old: &str, new: &str) {
    for resource in base.resources.values_mut() {
        for path in walker::find_references(&resource.properties, &[old]) {
            if let Some(node) = path.resolve_mut(&mut resource.properties) {
                *node = ref_to(new);
            }
        }
    }
}

/// Rewrite every dependency declaration naming `old` to name `new`.
fn rewrite_dependencies(base: &mut Template, old: &str, new: &str) {
    for resource in base.resources.values_mut() {
        if let Some(depends_on) = resource.depends_on.as_mut() {
            depends_on.replace(old, new);
        }
    }
}
