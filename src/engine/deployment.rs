//! engine::deployment
//!
//! Deployment relocation and alias stage attachment.
//!
//! The alias is the owner of the API stage, so the deployment moves with it:
//! its stage binding is stripped (the stage is a separate resource now), its
//! surface binding becomes a cross-template import, and its in-stack
//! dependency list is cleared - those dependencies are imports after the
//! move.

use tracing::debug;

use crate::core::naming;
use crate::core::template::{import_value, DependsOn};
use crate::stage::builder::{self, CacheSettings};
use crate::stage::resolver::MethodSetting;

use super::{PartitionContext, TemplateSet};

/// Move the deployment from the base template into the alias template and
/// attach the alias stage behind it.
///
/// Returns false when the base template owns no deployment resource; the
/// caller records the skip and ends the pass.
pub(crate) fn relocate_and_attach(
    templates: &mut TemplateSet,
    ctx: &PartitionContext,
    method_settings: &[MethodSetting],
) -> bool {
    let deployment_name = match templates.base.first_name_of_type(naming::DEPLOYMENT_TYPE) {
        Some(name) => name.to_string(),
        None => return false,
    };
    let Some(mut deployment) = templates.base.remove_resource(&deployment_name) else {
        return false;
    };

    let rest_api_import = naming::rest_api_export(&ctx.stack_name);

    deployment.remove_property("StageName");
    deployment.set_property("RestApiId", import_value(&rest_api_import));
    deployment.depends_on = Some(DependsOn::Many(Vec::new()));
    templates
        .alias
        .insert_resource(deployment_name.clone(), deployment);

    debug!(deployment = %deployment_name, "configuring alias stage");
    let stage = builder::build(
        &rest_api_import,
        &deployment_name,
        &ctx.alias,
        &ctx.stage,
        &ctx.service_name,
        &CacheSettings::from_service_config(&ctx.service_config),
        method_settings,
    );
    templates
        .alias
        .insert_resource(naming::STAGE_LOGICAL_ID, stage);

    true
}
