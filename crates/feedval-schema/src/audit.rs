//! # Schema Audit
//!
//! Static inspection of a schema tree. Nothing here validates documents.
//!
//! - [`audit_additional_properties`] lists object nodes that silently
//!   accept undeclared members, so that a misspelled key such as
//!   `monitor-url` passes validation instead of failing it.
//! - [`audit_deprecated`] lists properties carrying the `deprecated`
//!   annotation, i.e. the sources of the warning tier.
//!
//! Findings are located by JSON Pointers into the schema.

use std::fmt;

use feedval_core::DocumentPath;
use serde::Serialize;
use serde_json::Value;

/// Keywords whose value is a single subschema.
const SUBSCHEMA_KEYWORDS: &[&str] = &["items", "additionalItems", "not", "if", "then", "else"];

/// Keywords whose value is a list of subschemas.
const SUBSCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf"];

/// Keywords whose value maps names to subschemas.
const SUBSCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties", "definitions"];

/// A finding about `additionalProperties` configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdditionalPropertiesFinding {
    /// JSON Pointer to the object schema node.
    pub schema_path: String,
    /// Current value of `additionalProperties`.
    pub current_value: String,
    /// Recommended action.
    pub recommendation: String,
}

impl fmt::Display for AdditionalPropertiesFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.schema_path.is_empty() {
            "(root)"
        } else {
            self.schema_path.as_str()
        };
        write!(
            f,
            "{}: additionalProperties {} -> {}",
            location, self.current_value, self.recommendation
        )
    }
}

/// A property annotated `"deprecated": true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeprecatedProperty {
    /// JSON Pointer to the property's subschema.
    pub schema_path: String,
    /// The property name as it appears in documents.
    pub property: String,
    /// The property's `description`, if any.
    pub description: Option<String>,
}

impl fmt::Display for DeprecatedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: \"{}\" is deprecated", self.schema_path, self.property)?;
        if let Some(description) = &self.description {
            write!(f, " ({description})")?;
        }
        Ok(())
    }
}

/// Audit every object node of a schema for open `additionalProperties`.
///
/// A node counts as an object node when it declares `"type": "object"` or
/// lists `properties`. Nodes whose `additionalProperties` is `false` or a
/// subschema (a typed map, e.g. Kafka `configs`) are fine; `true` and
/// absent are reported.
pub fn audit_additional_properties(schema: &Value) -> Vec<AdditionalPropertiesFinding> {
    let mut findings = Vec::new();
    walk(schema, &DocumentPath::root(), &mut |node, location| {
        if !is_object_node(node) {
            return;
        }
        let current_value = match node.get("additionalProperties") {
            Some(Value::Bool(false)) | Some(Value::Object(_)) => return,
            Some(Value::Bool(true)) => "true".to_string(),
            None => "(absent, defaults to true)".to_string(),
            Some(other) => other.to_string(),
        };
        findings.push(AdditionalPropertiesFinding {
            schema_path: location.to_string(),
            current_value,
            recommendation: "Set to false so misspelled keys are rejected".to_string(),
        });
    });
    findings
}

/// List every property annotated `"deprecated": true`.
pub fn audit_deprecated(schema: &Value) -> Vec<DeprecatedProperty> {
    let mut found = Vec::new();
    walk(schema, &DocumentPath::root(), &mut |node, location| {
        let Some(properties) = node.get("properties").and_then(Value::as_object) else {
            return;
        };
        for (name, property) in properties {
            if property.get("deprecated") == Some(&Value::Bool(true)) {
                found.push(DeprecatedProperty {
                    schema_path: location.key("properties").key(name.as_str()).to_string(),
                    property: name.clone(),
                    description: property
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                });
            }
        }
    });
    found
}

fn is_object_node(node: &Value) -> bool {
    node.get("type") == Some(&Value::String("object".to_string()))
        || node.get("properties").is_some_and(Value::is_object)
}

/// Visit every subschema in document order, pre-order.
fn walk(node: &Value, location: &DocumentPath, visit: &mut dyn FnMut(&Value, &DocumentPath)) {
    if !node.is_object() {
        return;
    }
    visit(node, location);

    for keyword in SUBSCHEMA_KEYWORDS {
        match node.get(*keyword) {
            Some(Value::Array(list)) => {
                for (i, sub) in list.iter().enumerate() {
                    walk(sub, &location.key(*keyword).index(i), visit);
                }
            }
            Some(sub) => walk(sub, &location.key(*keyword), visit),
            None => {}
        }
    }
    for keyword in SUBSCHEMA_LIST_KEYWORDS {
        if let Some(list) = node.get(*keyword).and_then(Value::as_array) {
            for (i, sub) in list.iter().enumerate() {
                walk(sub, &location.key(*keyword).index(i), visit);
            }
        }
    }
    for keyword in SUBSCHEMA_MAP_KEYWORDS {
        if let Some(map) = node.get(*keyword).and_then(Value::as_object) {
            for (name, sub) in map {
                walk(sub, &location.key(*keyword).key(name.as_str()), visit);
            }
        }
    }
    if let Some(sub) = node.get("additionalProperties") {
        walk(sub, &location.key("additionalProperties"), visit);
    }
    if let Some(deps) = node.get("dependencies").and_then(Value::as_object) {
        for (name, sub) in deps {
            walk(sub, &location.key("dependencies").key(name.as_str()), visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn locked_schema_has_no_findings() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": {
                "commit": {
                    "type": "object",
                    "additionalProperties": false,
                    "properties": { "success-uri": { "type": "string" } }
                },
                "configs": {
                    "type": "object",
                    "additionalProperties": { "type": "string" }
                }
            }
        });
        let findings = audit_additional_properties(&schema);
        assert!(findings.is_empty(), "Locked schema should produce no findings, got: {findings:?}");
    }

    #[test]
    fn open_nodes_are_reported_with_locations() {
        let schema = json!({
            "type": "array",
            "items": { "$ref": "#/definitions/feed" },
            "definitions": {
                "feed": {
                    "type": "object",
                    "additionalProperties": true,
                    "properties": {
                        "file-watcher": { "properties": { "interval": { "type": "integer" } } }
                    }
                }
            }
        });
        let findings = audit_additional_properties(&schema);
        let paths: Vec<&str> = findings.iter().map(|f| f.schema_path.as_str()).collect();
        assert_eq!(
            paths,
            ["/definitions/feed", "/definitions/feed/properties/file-watcher"]
        );
        assert_eq!(findings[0].current_value, "true");
        assert_eq!(findings[1].current_value, "(absent, defaults to true)");
    }

    #[test]
    fn required_only_branches_are_not_object_nodes() {
        let schema = json!({
            "type": "object",
            "additionalProperties": false,
            "properties": { "a": {}, "b": {} },
            "oneOf": [{ "required": ["a"] }, { "required": ["b"] }]
        });
        assert!(audit_additional_properties(&schema).is_empty());
    }

    #[test]
    fn root_finding_displays_as_root() {
        let findings = audit_additional_properties(&json!({ "type": "object" }));
        assert_eq!(findings.len(), 1);
        assert!(findings[0].to_string().starts_with("(root): "));
    }

    #[test]
    fn deprecated_properties_are_listed() {
        let schema = json!({
            "definitions": {
                "dataset": {
                    "properties": {
                        "trailing-delimiter": { "type": "boolean" },
                        "trailing-delimeter": { "type": "boolean", "deprecated": true, "description": "Legacy spelling." }
                    }
                }
            }
        });
        let found = audit_deprecated(&schema);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].property, "trailing-delimeter");
        assert_eq!(
            found[0].schema_path,
            "/definitions/dataset/properties/trailing-delimeter"
        );
        assert_eq!(found[0].description.as_deref(), Some("Legacy spelling."));
    }

    #[test]
    fn bundled_feeds_schema_is_locked_down() {
        let validator = crate::SchemaValidator::feeds().unwrap();
        let findings = audit_additional_properties(validator.schema());
        assert!(findings.is_empty(), "bundled schema has open object nodes: {findings:?}");

        let deprecated = audit_deprecated(validator.schema());
        let names: Vec<&str> = deprecated.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(names, ["trailing-delimeter"]);
    }
}
