//! engine::permissions
//!
//! Invocation permission rebinding and relocation.
//!
//! There is no structural link from a permission to its function; the
//! function name is derived from the permission's own name by the fixed
//! suffix convention, and the function's pre-built alias and version
//! resources (owned by the alias template) are located by name prefix. A
//! permission whose function has no matching version and alias is not owned
//! by any alias template and is dropped entirely.

use serde_json::{json, Value};
use tracing::warn;

use crate::core::naming;
use crate::core::template::{import_value, ref_to, DependsOn, Resource};

use super::{PartitionContext, PartitionError, PartitionReport, TemplateSet};

/// Rebind every API Gateway invocation permission to its function alias and
/// relocate it into the alias template.
pub(crate) fn rebind(
    templates: &mut TemplateSet,
    ctx: &PartitionContext,
    report: &mut PartitionReport,
) -> Result<(), PartitionError> {
    let names: Vec<String> = templates
        .base
        .resources_of_type(naming::PERMISSION_TYPE)
        .filter(|(_, resource)| has_api_gateway_principal(resource))
        .map(|(name, _)| name.clone())
        .collect();

    let version_names = templates.alias.names_of_type(naming::LAMBDA_VERSION_TYPE);
    let alias_names = templates.alias.names_of_type(naming::LAMBDA_ALIAS_TYPE);
    let rest_api_import = naming::rest_api_export(&ctx.stack_name);

    for name in names {
        let Some(mut permission) = templates.base.remove_resource(&name) else {
            continue;
        };

        let Some(function_name) = naming::permission_function(&name) else {
            report.permissions_dropped += 1;
            warn!(
                permission = %name,
                "permission name does not follow the function suffix convention; dropping"
            );
            continue;
        };

        let version = find_prefixed(&version_names, function_name);
        let function_alias = find_prefixed(&alias_names, function_name);
        let (Some(version), Some(function_alias)) = (version, function_alias) else {
            // The function was not aliased in this pass, so the permission
            // belongs to no alias template.
            report.permissions_dropped += 1;
            warn!(
                permission = %name,
                function = %function_name,
                "no matching version/alias resource for permission; dropping"
            );
            continue;
        };

        permission.set_property("FunctionName", ref_to(function_alias));
        if permission.property("SourceArn").is_some() {
            // Authorizer-invocation permissions carry no SourceArn.
            permission.set_property("SourceArn", execute_api_arn(&rest_api_import));
        }
        permission.depends_on = Some(DependsOn::Many(vec![
            version.to_string(),
            function_alias.to_string(),
        ]));

        templates.alias.insert_resource(name, permission);
        report.permissions_relocated += 1;
    }

    Ok(())
}

/// Whether the permission grants invocation to API Gateway.
fn has_api_gateway_principal(permission: &Resource) -> bool {
    permission.property("Principal").and_then(Value::as_str)
        == Some(naming::API_GATEWAY_PRINCIPAL)
}

/// First name starting with `prefix`, in template order.
fn find_prefixed<'a>(names: &'a [String], prefix: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|name| name.starts_with(prefix))
        .map(String::as_str)
}

/// The execute-api source restriction over the imported surface, with a
/// wildcard stage/method suffix.
fn execute_api_arn(rest_api_import: &str) -> Value {
    json!({
        "Fn::Join": ["", [
            "arn:aws:execute-api:",
            { "Ref": "AWS::Region" },
            ":",
            { "Ref": "AWS::AccountId" },
            ":",
            import_value(rest_api_import),
            "/*/*"
        ]]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AliasName, StageName};
    use serde_json::Map;

    fn ctx() -> PartitionContext {
        PartitionContext {
            service_name: "svc".into(),
            stack_name: "svc-staging".into(),
            alias: AliasName::new("prod").unwrap(),
            stage: StageName::new("staging").unwrap(),
            service_config: Map::new(),
            functions: Vec::new(),
            overrides: Map::new(),
        }
    }

    fn permission(with_source_arn: bool) -> Resource {
        let mut properties = json!({
            "FunctionName": { "Fn::GetAtt": ["HelloLambdaFunction", "Arn"] },
            "Action": "lambda:InvokeFunction",
            "Principal": "apigateway.amazonaws.com"
        });
        if with_source_arn {
            properties["SourceArn"] = json!({ "Fn::Join": ["", ["arn:aws:execute-api:", "old"]] });
        }
        Resource::new(naming::PERMISSION_TYPE, properties)
    }

    fn aliased_templates() -> TemplateSet {
        let mut templates = TemplateSet::default();
        templates.alias.insert_resource(
            "HelloLambdaVersionXYZ",
            Resource::new(naming::LAMBDA_VERSION_TYPE, json!({})),
        );
        templates.alias.insert_resource(
            "Helloprod",
            Resource::new(naming::LAMBDA_ALIAS_TYPE, json!({})),
        );
        templates
    }

    #[test]
    fn rebinds_and_relocates_matching_permission() {
        let mut templates = aliased_templates();
        templates
            .base
            .insert_resource("HelloLambdaPermissionApiGateway", permission(true));
        let mut report = PartitionReport::default();

        rebind(&mut templates, &ctx(), &mut report).unwrap();

        assert!(!templates.base.has_resource("HelloLambdaPermissionApiGateway"));
        let moved = templates
            .alias
            .resource("HelloLambdaPermissionApiGateway")
            .unwrap();
        assert_eq!(
            moved.property("FunctionName"),
            Some(&json!({ "Ref": "Helloprod" }))
        );
        assert_eq!(
            moved.depends_on,
            Some(DependsOn::Many(vec![
                "HelloLambdaVersionXYZ".into(),
                "Helloprod".into()
            ]))
        );
        assert_eq!(report.permissions_relocated, 1);
        assert_eq!(report.permissions_dropped, 0);
    }

    #[test]
    fn source_arn_rebuilds_over_the_imported_surface() {
        let mut templates = aliased_templates();
        templates
            .base
            .insert_resource("HelloLambdaPermissionApiGateway", permission(true));
        let mut report = PartitionReport::default();

        rebind(&mut templates, &ctx(), &mut report).unwrap();

        let moved = templates
            .alias
            .resource("HelloLambdaPermissionApiGateway")
            .unwrap();
        assert_eq!(
            moved.property("SourceArn"),
            Some(&json!({
                "Fn::Join": ["", [
                    "arn:aws:execute-api:",
                    { "Ref": "AWS::Region" },
                    ":",
                    { "Ref": "AWS::AccountId" },
                    ":",
                    { "Fn::ImportValue": "svc-staging-ApiGatewayRestApi" },
                    "/*/*"
                ]]
            }))
        );
    }

    #[test]
    fn authorizer_permissions_carry_no_source_arn() {
        let mut templates = aliased_templates();
        templates
            .base
            .insert_resource("HelloLambdaPermissionApiGateway", permission(false));
        let mut report = PartitionReport::default();

        rebind(&mut templates, &ctx(), &mut report).unwrap();

        let moved = templates
            .alias
            .resource("HelloLambdaPermissionApiGateway")
            .unwrap();
        assert!(moved.property("SourceArn").is_none());
    }

    #[test]
    fn orphan_permission_lands_in_neither_template() {
        let mut templates = TemplateSet::default();
        templates
            .base
            .insert_resource("GhostLambdaPermissionApiGateway", permission(true));
        let mut report = PartitionReport::default();

        rebind(&mut templates, &ctx(), &mut report).unwrap();

        assert!(!templates.base.has_resource("GhostLambdaPermissionApiGateway"));
        assert!(!templates.alias.has_resource("GhostLambdaPermissionApiGateway"));
        assert_eq!(report.permissions_dropped, 1);
        assert_eq!(report.permissions_relocated, 0);
    }

    #[test]
    fn unconventional_permission_names_are_dropped() {
        let mut templates = aliased_templates();
        templates
            .base
            .insert_resource("SomethingElse", {
                let mut p = permission(true);
                p.set_property("Principal", json!("apigateway.amazonaws.com"));
                p
            });
        let mut report = PartitionReport::default();

        rebind(&mut templates, &ctx(), &mut report).unwrap();

        assert!(!templates.base.has_resource("SomethingElse"));
        assert!(!templates.alias.has_resource("SomethingElse"));
        assert_eq!(report.permissions_dropped, 1);
    }

    #[test]
    fn non_api_gateway_permissions_are_untouched() {
        let mut templates = aliased_templates();
        let mut s3_permission = permission(true);
        s3_permission.set_property("Principal", json!("s3.amazonaws.com"));
        templates
            .base
            .insert_resource("HelloLambdaPermissionS3", s3_permission);
        let mut report = PartitionReport::default();

        rebind(&mut templates, &ctx(), &mut report).unwrap();

        assert!(templates.base.has_resource("HelloLambdaPermissionS3"));
        assert_eq!(report.permissions_dropped, 0);
    }
}
