//! core::naming
//!
//! Every name convention in one place.
//!
//! The engine relies on deterministic name conventions rather than structural
//! links: permissions derive their function from a fixed suffix, renamed
//! authorizers gain the alias as a suffix, and cross-template exports are
//! addressed by `<stack>-<logical id>`. Producers and consumers of these
//! names all go through this module.

use super::types::AliasName;

// ---------------------------------------------------------------------------
// Well-known logical ids and attributes
// ---------------------------------------------------------------------------

/// Logical id of the REST API surface resource.
pub const REST_API_LOGICAL_ID: &str = "ApiGatewayRestApi";

/// Logical id of the root-resource output published on the base template.
pub const ROOT_RESOURCE_OUTPUT_ID: &str = "ApiGatewayRestApiRootResource";

/// Attribute carrying the API's root resource id.
pub const ROOT_RESOURCE_ATTRIBUTE: &str = "RootResourceId";

/// Logical id of the per-alias stage resource.
pub const STAGE_LOGICAL_ID: &str = "ApiGatewayStage";

/// Suffix convention linking an invocation permission to its function.
pub const PERMISSION_SUFFIX: &str = "LambdaPermissionApiGateway";

// ---------------------------------------------------------------------------
// Resource types and fixed property values
// ---------------------------------------------------------------------------

/// Deployment resources relocate into the alias template.
pub const DEPLOYMENT_TYPE: &str = "AWS::ApiGateway::Deployment";

/// Per-endpoint method resources stay base-owned but get redirected.
pub const METHOD_TYPE: &str = "AWS::ApiGateway::Method";

/// Authorizer resources are renamed per alias.
pub const AUTHORIZER_TYPE: &str = "AWS::ApiGateway::Authorizer";

/// The per-alias entry-point resource built by this crate.
pub const STAGE_TYPE: &str = "AWS::ApiGateway::Stage";

/// Invocation permission resources rebind to function aliases.
pub const PERMISSION_TYPE: &str = "AWS::Lambda::Permission";

/// Function alias resources, supplied by the function-aliasing pass.
pub const LAMBDA_ALIAS_TYPE: &str = "AWS::Lambda::Alias";

/// Function version resources, supplied by the function-aliasing pass.
pub const LAMBDA_VERSION_TYPE: &str = "AWS::Lambda::Version";

/// Principal marking a permission as an API Gateway invocation permission.
pub const API_GATEWAY_PRINCIPAL: &str = "apigateway.amazonaws.com";

/// Integration types whose target URI points at a function.
pub const FUNCTION_INTEGRATION_TYPES: [&str; 2] = ["AWS", "AWS_PROXY"];

/// Authorizer type whose URI accepts the alias selector splice.
pub const TOKEN_AUTHORIZER: &str = "TOKEN";

// ---------------------------------------------------------------------------
// Stage variables and the runtime alias selector
// ---------------------------------------------------------------------------

/// Stage variable carrying the alias name at invocation time.
pub const ALIAS_STAGE_VARIABLE: &str = "SERVERLESS_ALIAS";

/// Stage variable carrying the deployment stage name at invocation time.
pub const STAGE_STAGE_VARIABLE: &str = "SERVERLESS_STAGE";

/// URI segment spliced after a function reference so invocation resolves
/// through the active alias rather than a fixed version.
pub const ALIAS_URI_SELECTOR: &str = ":${stageVariables.SERVERLESS_ALIAS}";

/// URI segment identifying the invocation tail of an authorizer URI.
pub const INVOCATIONS_SEGMENT: &str = "/invocations";

// ---------------------------------------------------------------------------
// Derived names
// ---------------------------------------------------------------------------

/// Export name of the REST API id on the base template.
pub fn rest_api_export(stack_name: &str) -> String {
    format!("{stack_name}-{REST_API_LOGICAL_ID}")
}

/// Export name of the REST API root resource id on the base template.
pub fn root_resource_export(stack_name: &str) -> String {
    format!("{stack_name}-{ROOT_RESOURCE_OUTPUT_ID}")
}

/// Logical id of a resource renamed for an alias (`MyAuthorizer` + `prod`
/// becomes `MyAuthorizerprod`).
pub fn aliased_logical_id(name: &str, alias: &AliasName) -> String {
    format!("{name}{alias}")
}

/// Display name of a resource renamed for an alias (`authorizer` + `prod`
/// becomes `authorizer-prod`).
pub fn aliased_display_name(name: &str, alias: &AliasName) -> String {
    format!("{name}-{alias}")
}

/// Derive the function name an invocation permission belongs to, per the
/// fixed suffix convention. Returns `None` when the permission does not
/// follow the convention.
pub fn permission_function(permission_name: &str) -> Option<&str> {
    permission_name
        .strip_suffix(PERMISSION_SUFFIX)
        .filter(|function| !function.is_empty())
}
