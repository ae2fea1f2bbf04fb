//! core::template
//!
//! The template grammar: templates, resources, outputs, and the literal
//! reference forms.
//!
//! # Grammar
//!
//! A template is `{ Resources: mapping<name, Resource>, Outputs: mapping<name,
//! Output> }`. Resource properties are arbitrary nested trees, represented as
//! `serde_json::Value`. References take exactly two literal forms:
//!
//! - `{ "Ref": "<name>" }`
//! - `{ "Fn::GetAtt": ["<name>", "<attribute>"] }`
//!
//! References interpolated inside string-building expressions (`Fn::Join`,
//! `Fn::Sub`) are not part of the grammar this crate resolves.
//!
//! # Invariants
//!
//! - Resource names are unique within a template (enforced by the map)
//! - Unknown resource and template keys round-trip untouched

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Key of the plain reference form.
pub const REF_KEY: &str = "Ref";

/// Key of the attribute reference form.
pub const GET_ATT_KEY: &str = "Fn::GetAtt";

/// Key of the cross-template import operator.
pub const IMPORT_VALUE_KEY: &str = "Fn::ImportValue";

/// Key of the string-joining operator (not resolved, but spliced into).
pub const JOIN_KEY: &str = "Fn::Join";

/// Build a `{Ref: name}` reference node.
pub fn ref_to(name: &str) -> Value {
    json!({ REF_KEY: name })
}

/// Build a `{Fn::GetAtt: [name, attribute]}` reference node.
pub fn get_att(name: &str, attribute: &str) -> Value {
    json!({ GET_ATT_KEY: [name, attribute] })
}

/// Build a `{Fn::ImportValue: name}` import node.
pub fn import_value(name: &str) -> Value {
    json!({ IMPORT_VALUE_KEY: name })
}

/// A dependency declaration: a bare name or a sequence of names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    One(String),
    Many(Vec<String>),
}

impl DependsOn {
    /// Whether the declaration names `name`.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::One(n) => n == name,
            Self::Many(names) => names.iter().any(|n| n == name),
        }
    }

    /// The declared names, in order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::One(n) => vec![n.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Replace every occurrence of `old` with `new`.
    ///
    /// In list form the old entry is removed and the new name appended, so a
    /// rewritten list ends with the renamed dependency.
    pub fn replace(&mut self, old: &str, new: &str) {
        match self {
            Self::One(n) => {
                if n == old {
                    *n = new.to_string();
                }
            }
            Self::Many(names) => {
                if names.iter().any(|n| n == old) {
                    names.retain(|n| n != old);
                    names.push(new.to_string());
                }
            }
        }
    }
}

/// A named resource: a type, an arbitrary property tree, and optional
/// dependencies. Keys this crate does not model (Condition, Metadata, ...)
/// pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resource {
    #[serde(rename = "Type")]
    pub kind: String,

    #[serde(rename = "Properties", skip_serializing_if = "Value::is_null")]
    pub properties: Value,

    #[serde(rename = "DependsOn", skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    /// Create a resource of the given type with the given properties.
    pub fn new(kind: impl Into<String>, properties: Value) -> Self {
        Self {
            kind: kind.into(),
            properties,
            depends_on: None,
            extra: Map::new(),
        }
    }

    /// Whether the resource has the given type.
    pub fn is_type(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// A top-level property, if present.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Set a top-level property, creating the property mapping if needed.
    pub fn set_property(&mut self, key: &str, value: Value) {
        if !self.properties.is_object() {
            self.properties = Value::Object(Map::new());
        }
        if let Some(map) = self.properties.as_object_mut() {
            map.insert(key.to_string(), value);
        }
    }

    /// Remove and return a top-level property.
    pub fn remove_property(&mut self, key: &str) -> Option<Value> {
        self.properties.as_object_mut().and_then(|map| map.remove(key))
    }

    /// Deep-merge a partial resource tree onto this resource.
    ///
    /// The overlay uses the serialized grammar (`Type`, `Properties`,
    /// `DependsOn`, ...). Mappings merge per key, sequences merge index-wise,
    /// scalars replace.
    ///
    /// # Errors
    ///
    /// Fails if the merged tree no longer parses as a resource (for example
    /// an overlay that turns `DependsOn` into a number).
    pub fn merge_overlay(&mut self, overlay: &Value) -> Result<(), serde_json::Error> {
        let mut tree = serde_json::to_value(&*self)?;
        super::walker::deep_merge(&mut tree, overlay);
        *self = serde_json::from_value(tree)?;
        Ok(())
    }
}

/// A named template output with an optional cross-template export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Value")]
    pub value: Value,

    #[serde(rename = "Export", skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

/// The export half of an output: the name other templates import by.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Export {
    #[serde(rename = "Name")]
    pub name: String,
}

/// A compiled infrastructure template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    #[serde(rename = "Resources", skip_serializing_if = "IndexMap::is_empty")]
    pub resources: IndexMap<String, Resource>,

    #[serde(rename = "Outputs", skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Template {
    /// Create an empty template.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a resource with the given name exists.
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Look up a resource by name.
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Look up a resource by name, mutably.
    pub fn resource_mut(&mut self, name: &str) -> Option<&mut Resource> {
        self.resources.get_mut(name)
    }

    /// Insert a resource, replacing any resource with the same name.
    pub fn insert_resource(&mut self, name: impl Into<String>, resource: Resource) {
        self.resources.insert(name.into(), resource);
    }

    /// Remove and return a resource, preserving the order of the rest.
    pub fn remove_resource(&mut self, name: &str) -> Option<Resource> {
        self.resources.shift_remove(name)
    }

    /// Iterate over resources of the given type, in template order.
    pub fn resources_of_type<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources.iter().filter(move |(_, r)| r.kind == kind)
    }

    /// The names of every resource of the given type, in template order.
    pub fn names_of_type(&self, kind: &str) -> Vec<String> {
        self.resources_of_type(kind)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// The first resource name of the given type, in template order.
    pub fn first_name_of_type(&self, kind: &str) -> Option<&str> {
        self.resources
            .iter()
            .find(|(_, r)| r.kind == kind)
            .map(|(name, _)| name.as_str())
    }

    /// Whether any resource of the given type exists.
    pub fn has_resource_of_type(&self, kind: &str) -> bool {
        self.resources.values().any(|r| r.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_constructors() {
        assert_eq!(ref_to("MyResource"), json!({ "Ref": "MyResource" }));
        assert_eq!(
            get_att("MyResource", "Arn"),
            json!({ "Fn::GetAtt": ["MyResource", "Arn"] })
        );
        assert_eq!(
            import_value("stack-Export"),
            json!({ "Fn::ImportValue": "stack-Export" })
        );
    }

    #[test]
    fn depends_on_replace_string_form() {
        let mut deps = DependsOn::One("Old".to_string());
        deps.replace("Old", "New");
        assert_eq!(deps, DependsOn::One("New".to_string()));

        deps.replace("Missing", "Other");
        assert_eq!(deps, DependsOn::One("New".to_string()));
    }

    #[test]
    fn depends_on_replace_list_appends_new_name() {
        let mut deps = DependsOn::Many(vec!["A".into(), "Old".into(), "B".into()]);
        deps.replace("Old", "New");
        assert_eq!(
            deps,
            DependsOn::Many(vec!["A".into(), "B".into(), "New".into()])
        );
    }

    #[test]
    fn depends_on_serde_forms() {
        let one: DependsOn = serde_json::from_value(json!("Single")).unwrap();
        assert_eq!(one, DependsOn::One("Single".into()));

        let many: DependsOn = serde_json::from_value(json!(["A", "B"])).unwrap();
        assert_eq!(many.names(), vec!["A", "B"]);

        assert_eq!(serde_json::to_value(&one).unwrap(), json!("Single"));
    }

    #[test]
    fn resource_roundtrip_preserves_unknown_keys() {
        let value = json!({
            "Type": "AWS::ApiGateway::Method",
            "Properties": { "HttpMethod": "GET" },
            "DependsOn": "Other",
            "Condition": "IsProd"
        });
        let resource: Resource = serde_json::from_value(value.clone()).unwrap();
        assert!(resource.is_type("AWS::ApiGateway::Method"));
        assert_eq!(resource.extra.get("Condition"), Some(&json!("IsProd")));
        assert_eq!(serde_json::to_value(&resource).unwrap(), value);
    }

    #[test]
    fn resource_set_property_on_null_properties() {
        let mut resource = Resource::new("AWS::Lambda::Permission", Value::Null);
        resource.set_property("FunctionName", ref_to("MyAlias"));
        assert_eq!(resource.property("FunctionName"), Some(&ref_to("MyAlias")));
    }

    #[test]
    fn resource_merge_overlay() {
        let mut resource = Resource::new(
            "AWS::ApiGateway::Method",
            json!({ "HttpMethod": "GET", "Integration": { "Type": "AWS" } }),
        );
        resource
            .merge_overlay(&json!({
                "Properties": { "Integration": { "TimeoutInMillis": 5000 } }
            }))
            .unwrap();
        assert_eq!(
            resource.property("Integration"),
            Some(&json!({ "Type": "AWS", "TimeoutInMillis": 5000 }))
        );
    }

    #[test]
    fn resource_merge_overlay_rejects_malformed() {
        let mut resource = Resource::new("AWS::ApiGateway::Method", json!({}));
        let result = resource.merge_overlay(&json!({ "DependsOn": 42 }));
        assert!(result.is_err());
    }

    #[test]
    fn template_type_queries_follow_template_order() {
        let mut template = Template::new();
        template.insert_resource("B", Resource::new("AWS::ApiGateway::Method", json!({})));
        template.insert_resource("A", Resource::new("AWS::ApiGateway::Method", json!({})));
        template.insert_resource("D", Resource::new("AWS::ApiGateway::Deployment", json!({})));

        assert_eq!(template.names_of_type("AWS::ApiGateway::Method"), ["B", "A"]);
        assert_eq!(
            template.first_name_of_type("AWS::ApiGateway::Deployment"),
            Some("D")
        );
        assert!(template.has_resource_of_type("AWS::ApiGateway::Method"));
        assert!(!template.has_resource_of_type("AWS::Lambda::Permission"));
    }

    #[test]
    fn template_roundtrip_preserves_extra_keys() {
        let value = json!({
            "AWSTemplateFormatVersion": "2010-09-09",
            "Resources": {
                "Api": { "Type": "AWS::ApiGateway::RestApi", "Properties": {} }
            },
            "Outputs": {
                "ApiId": {
                    "Description": "The API",
                    "Value": { "Ref": "Api" },
                    "Export": { "Name": "stack-ApiId" }
                }
            }
        });
        let template: Template = serde_json::from_value(value.clone()).unwrap();
        assert!(template.has_resource("Api"));
        assert_eq!(
            template.outputs.get("ApiId").unwrap().export.as_ref().unwrap().name,
            "stack-ApiId"
        );
        assert_eq!(serde_json::to_value(&template).unwrap(), value);
    }
}
