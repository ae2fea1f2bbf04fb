//! engine::exposure
//!
//! Surface exposure detection, export publication, and the legacy-layout
//! guard.
//!
//! A surface is exposed if the current base template owns the REST API
//! resource, or if another alias already depends on the surface (it owns a
//! deployment) and the resource can be recovered from the deployed base
//! template. An unexposed surface short-circuits the whole pass.

use tracing::warn;

use crate::core::naming;
use crate::core::template::{get_att, ref_to, Export, Output, Template};

use super::{PartitionError, TemplateSet};

/// Detect whether the surface is exposed, recovering the REST API resource
/// from the deployed base template when another alias still needs it.
///
/// Returns false when the surface is not exposed; the templates are then
/// returned to the caller unchanged.
pub(crate) fn ensure_exposed(templates: &mut TemplateSet) -> bool {
    if templates.base.has_resource(naming::REST_API_LOGICAL_ID) {
        return true;
    }

    let another_alias_depends_on_surface = templates
        .other_aliases
        .iter()
        .any(|template| template.has_resource_of_type(naming::DEPLOYMENT_TYPE));
    if !another_alias_depends_on_surface {
        return false;
    }

    match templates.deployed_base.resource(naming::REST_API_LOGICAL_ID) {
        Some(rest_api) => {
            let recovered = rest_api.clone();
            templates
                .base
                .insert_resource(naming::REST_API_LOGICAL_ID, recovered);
            true
        }
        None => {
            warn!(
                "another alias owns an API deployment but the deployed base template \
                 no longer carries '{}'; treating the surface as unexposed",
                naming::REST_API_LOGICAL_ID
            );
            false
        }
    }
}

/// Publish the surface's identifier and root-resource identifier as named
/// exports on the base template, so alias templates import rather than
/// duplicate them.
pub(crate) fn publish_exports(base: &mut Template, stack_name: &str) {
    base.outputs.insert(
        naming::REST_API_LOGICAL_ID.to_string(),
        Output {
            description: Some("API Gateway API".to_string()),
            value: ref_to(naming::REST_API_LOGICAL_ID),
            export: Some(Export {
                name: naming::rest_api_export(stack_name),
            }),
        },
    );

    base.outputs.insert(
        naming::ROOT_RESOURCE_OUTPUT_ID.to_string(),
        Output {
            description: Some("API Gateway API root resource".to_string()),
            value: get_att(
                naming::REST_API_LOGICAL_ID,
                naming::ROOT_RESOURCE_ATTRIBUTE,
            ),
            export: Some(Export {
                name: naming::root_resource_export(stack_name),
            }),
        },
    );
}

/// Fail when any deployed alias template still owns per-endpoint method
/// resources directly - a retired layout that cannot be migrated in place.
pub(crate) fn guard_legacy_layout(templates: &TemplateSet) -> Result<(), PartitionError> {
    let legacy = templates
        .other_aliases
        .iter()
        .chain(std::iter::once(&templates.deployed_alias))
        .any(|template| template.has_resource_of_type(naming::METHOD_TYPE));

    if legacy {
        Err(PartitionError::LegacyLayout)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::template::Resource;
    use serde_json::json;

    fn rest_api() -> Resource {
        Resource::new("AWS::ApiGateway::RestApi", json!({ "Name": "svc" }))
    }

    fn deployment() -> Resource {
        Resource::new(naming::DEPLOYMENT_TYPE, json!({}))
    }

    fn method() -> Resource {
        Resource::new(naming::METHOD_TYPE, json!({}))
    }

    #[test]
    fn exposed_when_base_owns_rest_api() {
        let mut templates = TemplateSet::default();
        templates
            .base
            .insert_resource(naming::REST_API_LOGICAL_ID, rest_api());
        assert!(ensure_exposed(&mut templates));
    }

    #[test]
    fn not_exposed_when_nothing_owns_surface() {
        let mut templates = TemplateSet::default();
        assert!(!ensure_exposed(&mut templates));
        assert_eq!(templates, TemplateSet::default());
    }

    #[test]
    fn recovered_from_deployed_base_when_another_alias_needs_it() {
        let mut templates = TemplateSet::default();
        templates
            .deployed_base
            .insert_resource(naming::REST_API_LOGICAL_ID, rest_api());
        let mut other = Template::new();
        other.insert_resource("Deployment123", deployment());
        templates.other_aliases.push(other);

        assert!(ensure_exposed(&mut templates));
        assert!(templates.base.has_resource(naming::REST_API_LOGICAL_ID));
    }

    #[test]
    fn unexposed_when_recovery_source_is_gone() {
        let mut templates = TemplateSet::default();
        let mut other = Template::new();
        other.insert_resource("Deployment123", deployment());
        templates.other_aliases.push(other);

        assert!(!ensure_exposed(&mut templates));
        assert!(!templates.base.has_resource(naming::REST_API_LOGICAL_ID));
    }

    #[test]
    fn exports_publish_surface_and_root_resource() {
        let mut base = Template::new();
        publish_exports(&mut base, "svc-staging");

        let api = base.outputs.get("ApiGatewayRestApi").unwrap();
        assert_eq!(api.value, json!({ "Ref": "ApiGatewayRestApi" }));
        assert_eq!(
            api.export.as_ref().unwrap().name,
            "svc-staging-ApiGatewayRestApi"
        );

        let root = base.outputs.get("ApiGatewayRestApiRootResource").unwrap();
        assert_eq!(
            root.value,
            json!({ "Fn::GetAtt": ["ApiGatewayRestApi", "RootResourceId"] })
        );
        assert_eq!(
            root.export.as_ref().unwrap().name,
            "svc-staging-ApiGatewayRestApiRootResource"
        );
    }

    #[test]
    fn legacy_guard_rejects_methods_in_other_alias_templates() {
        let mut templates = TemplateSet::default();
        let mut other = Template::new();
        other.insert_resource("OldMethod", method());
        templates.other_aliases.push(other);

        assert!(matches!(
            guard_legacy_layout(&templates),
            Err(PartitionError::LegacyLayout)
        ));
    }

    #[test]
    fn legacy_guard_rejects_methods_in_deployed_alias_template() {
        let mut templates = TemplateSet::default();
        templates.deployed_alias.insert_resource("OldMethod", method());

        assert!(matches!(
            guard_legacy_layout(&templates),
            Err(PartitionError::LegacyLayout)
        ));
    }

    #[test]
    fn legacy_guard_passes_clean_templates() {
        let templates = TemplateSet::default();
        assert!(guard_legacy_layout(&templates).is_ok());
    }
}
