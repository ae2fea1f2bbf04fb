//! engine::methods
//!
//! Per-endpoint method redirection.
//!
//! Methods stay owned by the base template; only their runtime target is
//! redirected. For function-backed integrations the target URI is built with
//! a join over parts, and there is no direct link to the function - the
//! function reference is located structurally as the `Fn::GetAtt` part, and
//! the alias selector is spliced in right after it so invocation resolves
//! through the active alias.

use serde_json::{Map, Value};
use tracing::debug;

use crate::core::naming;
use crate::core::template::{Resource, Template, GET_ATT_KEY};

use super::{apply_override, PartitionError, PartitionReport};

/// Redirect every function-backed method integration through the alias
/// selector, applying caller overrides along the way.
pub(crate) fn redirect(
    base: &mut Template,
    overrides: &mut Map<String, Value>,
    report: &mut PartitionReport,
) -> Result<(), PartitionError> {
    for name in base.names_of_type(naming::METHOD_TYPE) {
        let Some(method) = base.resource_mut(&name) else {
            continue;
        };

        if is_function_backed(method) && splice_alias_selector(method) {
            debug!(method = %name, "redirected method target through alias selector");
            report.methods_redirected += 1;
        }

        apply_override(method, &name, overrides)?;
    }
    Ok(())
}

/// Whether the method's integration targets a function.
fn is_function_backed(method: &Resource) -> bool {
    method
        .properties
        .pointer("/Integration/Type")
        .and_then(Value::as_str)
        .map_or(false, |kind| {
            naming::FUNCTION_INTEGRATION_TYPES.contains(&kind)
        })
}

/// Splice the alias selector into the integration URI, immediately after
/// the part referencing the target function.
fn splice_alias_selector(method: &mut Resource) -> bool {
    let parts = match method
        .properties
        .pointer_mut("/Integration/Uri/Fn::Join/1")
        .and_then(Value::as_array_mut)
    {
        Some(parts) => parts,
        None => return false,
    };

    let Some(function_ix) = parts.iter().position(|part| part.get(GET_ATT_KEY).is_some())
    else {
        return false;
    };

    parts.insert(
        function_ix + 1,
        Value::String(naming::ALIAS_URI_SELECTOR.to_string()),
    );
    true
}
