//! # Schema Validation
//!
//! Structural validation of feed documents against a JSON Schema
//! (draft-07).
//!
//! ## Error Tier
//!
//! Assertion keywords (`type`, `required`, `enum`, `items`,
//! `additionalProperties`, `minimum`, `oneOf`, ...) are evaluated by the
//! `jsonschema` crate. Every failed assertion becomes one
//! [`Severity::Error`] violation located by a JSON Pointer into the
//! document. Validation collects all of them; it never stops at the first.
//!
//! ## Warning Tier
//!
//! Draft-07 has no warning severity. Properties annotated with
//! `"deprecated": true` produce a [`Severity::Warning`] violation whenever
//! the document uses them. The annotation walk follows local `$ref`s
//! (`#/definitions/...`), `properties`, `items` and `allOf`. Warnings never
//! affect [`SchemaReport::valid`].
//!
//! ## Schema Lifecycle
//!
//! A schema is compiled once, at construction, and is immutable afterwards.
//! A schema that is not valid JSON or does not conform to the draft-07
//! meta-schema is a [`SchemaError`]. Documents never are.

use std::fmt;
use std::path::Path;

use feedval_core::{Document, DocumentPath};
use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Name under which the bundled feeds schema is reported.
pub const FEEDS_SCHEMA_NAME: &str = "feeds.schema.json";

const FEEDS_SCHEMA_SOURCE: &str = include_str!("../../../schemas/feeds.schema.json");

/// Bound on schema steps taken without descending into the document.
/// Keeps the annotation walk finite on cyclic `$ref` chains.
const MAX_SCHEMA_HOPS: usize = 64;

/// Error constructing a [`SchemaValidator`].
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema source could not be parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    Load {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The schema parsed but is not a valid draft-07 schema.
    #[error("schema definition error in '{schema_name}': {reason}")]
    Definition {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be compiled.
        reason: String,
    },

    /// The schema file could not be read.
    #[error("cannot read schema file '{path}': {source}")]
    Io {
        /// Path of the schema file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Severity of a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// A failed assertion. Makes the document invalid.
    Error,
    /// An advisory finding. Never makes the document invalid.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A single schema finding with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location of the offending node in the document.
    pub path: DocumentPath,
    /// JSON Pointer into the schema naming the keyword that fired.
    pub schema_path: String,
    /// Error or Warning.
    pub severity: Severity,
    /// Human-readable description of the finding.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Outcome of validating one document against one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    /// True iff no [`Severity::Error`] violation was found.
    pub valid: bool,
    /// Errors in validator order, followed by warnings in document order.
    pub violations: Vec<Violation>,
}

impl SchemaReport {
    fn from_violations(violations: Vec<Violation>) -> Self {
        let valid = !violations.iter().any(|v| v.severity == Severity::Error);
        Self { valid, violations }
    }

    /// Error-severity violations.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    /// Warning-severity violations.
    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }
}

/// A compiled schema, ready to validate documents.
///
/// ## Thread Safety
///
/// `SchemaValidator` is `Send + Sync` and holds no interior mutability.
/// Share it behind an `Arc` to validate documents on several threads.
pub struct SchemaValidator {
    name: String,
    schema: Value,
    compiled: Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compile a parsed schema tree.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Definition`] if the root is neither an object
    /// nor a boolean, or if the schema does not conform to the draft-07
    /// meta-schema.
    pub fn new(name: impl Into<String>, schema: Value) -> Result<Self, SchemaError> {
        let name = name.into();
        if !(schema.is_object() || schema.is_boolean()) {
            return Err(SchemaError::Definition {
                schema_name: name,
                reason: format!(
                    "schema root must be an object or a boolean, found {}",
                    feedval_core::NodeKind::of(&schema)
                ),
            });
        }

        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft7);
        let compiled = opts
            .build(&schema)
            .map_err(|e| SchemaError::Definition {
                schema_name: name.clone(),
                reason: e.to_string(),
            })?;

        debug!(schema = %name, "compiled schema");
        Ok(Self {
            name,
            schema,
            compiled,
        })
    }

    /// The bundled feed-configuration schema.
    ///
    /// # Errors
    ///
    /// Only if the embedded schema is itself broken.
    pub fn feeds() -> Result<Self, SchemaError> {
        let schema: Value =
            serde_json::from_str(FEEDS_SCHEMA_SOURCE).map_err(|e| SchemaError::Load {
                schema_name: FEEDS_SCHEMA_NAME.to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;
        Self::new(FEEDS_SCHEMA_NAME, schema)
    }

    /// Read and compile a JSON schema file.
    ///
    /// The validator is named after the file name.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());

        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| SchemaError::Load {
            schema_name: name.clone(),
            reason: format!("invalid JSON: {e}"),
        })?;
        Self::new(name, schema)
    }

    /// Schema filename or identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema tree this validator was compiled from.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Quick conformance check; skips message rendering and warnings.
    pub fn is_valid(&self, document: &Document) -> bool {
        self.compiled.is_valid(document.as_value())
    }

    /// Validate a document, collecting every error and warning.
    ///
    /// Never fails: malformed input always degrades to violations.
    pub fn validate(&self, document: &Document) -> SchemaReport {
        let instance = document.as_value();

        let mut violations: Vec<Violation> = self
            .compiled
            .iter_errors(instance)
            .map(|e| Violation {
                path: DocumentPath::from_pointer(&e.instance_path.to_string(), instance),
                schema_path: e.schema_path.to_string(),
                severity: Severity::Error,
                message: e.to_string(),
            })
            .collect();

        let mut walk = DeprecatedWalk::new(&self.schema);
        walk.visit(
            &self.schema,
            DocumentPath::root(),
            instance,
            &DocumentPath::root(),
            0,
        );
        violations.extend(walk.found);

        let report = SchemaReport::from_violations(violations);
        debug!(
            schema = %self.name,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "schema validation finished"
        );
        report
    }
}

// ---------------------------------------------------------------------------
// Deprecated-property annotation walk
// ---------------------------------------------------------------------------

struct DeprecatedWalk<'s> {
    root: &'s Value,
    found: Vec<Violation>,
}

impl<'s> DeprecatedWalk<'s> {
    fn new(root: &'s Value) -> Self {
        Self {
            root,
            found: Vec::new(),
        }
    }

    /// Follow local `$ref`s to the node that carries keywords.
    ///
    /// Remote references are not followed; the referencing node is used as is.
    fn resolve(
        &self,
        mut node: &'s Value,
        mut location: DocumentPath,
        hops: &mut usize,
    ) -> Option<(&'s Value, DocumentPath)> {
        while let Some(reference) = node.get("$ref").and_then(Value::as_str) {
            let Some(pointer) = reference.strip_prefix('#') else {
                break;
            };
            *hops += 1;
            if *hops > MAX_SCHEMA_HOPS {
                return None;
            }
            node = self.root.pointer(pointer)?;
            location = DocumentPath::from_pointer(pointer, self.root);
        }
        Some((node, location))
    }

    fn is_deprecated(&self, node: &'s Value, location: &DocumentPath) -> bool {
        let flagged = |n: &Value| n.get("deprecated") == Some(&Value::Bool(true));
        if flagged(node) {
            return true;
        }
        let mut hops = 0;
        self.resolve(node, location.clone(), &mut hops)
            .is_some_and(|(target, _)| flagged(target))
    }

    fn visit(
        &mut self,
        schema: &'s Value,
        location: DocumentPath,
        instance: &Value,
        path: &DocumentPath,
        mut hops: usize,
    ) {
        let Some((schema, location)) = self.resolve(schema, location, &mut hops) else {
            return;
        };

        if let Some(all_of) = schema.get("allOf").and_then(Value::as_array) {
            for (i, branch) in all_of.iter().enumerate() {
                let branch_location = location.key("allOf").index(i);
                self.visit(branch, branch_location, instance, path, hops + 1);
            }
        }

        match instance {
            Value::Object(members) => {
                let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
                    return;
                };
                for (key, property) in properties {
                    let Some(child) = members.get(key) else {
                        continue;
                    };
                    let child_path = path.key(key.as_str());
                    let property_location = location.key("properties").key(key.as_str());
                    if self.is_deprecated(property, &property_location) {
                        self.found.push(Violation {
                            path: child_path.clone(),
                            schema_path: property_location.key("deprecated").to_string(),
                            severity: Severity::Warning,
                            message: deprecation_message(key, property),
                        });
                    }
                    self.visit(property, property_location, child, &child_path, 0);
                }
            }
            Value::Array(elements) => match schema.get("items") {
                Some(Value::Array(tuple)) => {
                    for (i, (item_schema, element)) in tuple.iter().zip(elements).enumerate() {
                        let item_location = location.key("items").index(i);
                        self.visit(item_schema, item_location, element, &path.index(i), 0);
                    }
                }
                Some(item_schema) => {
                    for (i, element) in elements.iter().enumerate() {
                        let item_location = location.key("items");
                        self.visit(item_schema, item_location, element, &path.index(i), 0);
                    }
                }
                None => {}
            },
            _ => {}
        }
    }
}

fn deprecation_message(key: &str, property: &Value) -> String {
    match property.get("description").and_then(Value::as_str) {
        Some(description) => format!("\"{key}\" is deprecated: {description}"),
        None => format!("\"{key}\" is deprecated"),
    }
}
