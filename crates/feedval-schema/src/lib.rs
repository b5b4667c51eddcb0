//! # feedval-schema — Structural Validation Layer
//!
//! The first of the two validation layers. Checks a [`Document`] against a
//! static JSON Schema and reports every structural non-conformance as a
//! [`Violation`] located by a JSON Pointer.
//!
//! ## Runtime Validation (`validate`)
//!
//! [`SchemaValidator`] compiles a schema once (draft-07) and is then shared
//! read-only between any number of validations. Key entry points:
//!
//! - [`SchemaValidator::feeds`] — the bundled feed-configuration schema,
//!   embedded at compile time.
//! - [`SchemaValidator::validate`] — validate one document, returning a
//!   [`SchemaReport`] with Error and Warning violations.
//!
//! ## Schema Audit (`audit`)
//!
//! The [`audit`] module inspects a schema tree without validating anything:
//! it lists object nodes that accept undeclared members and properties
//! marked `deprecated`.
//!
//! ## Crate Policy
//!
//! - Depends only on `feedval-core` internally.
//! - Malformed documents always produce violations, never errors. Only a
//!   malformed schema is an error ([`SchemaError`]), raised at construction.
//!
//! [`Document`]: feedval_core::Document

pub mod audit;
pub mod validate;

pub use audit::{
    audit_additional_properties, audit_deprecated, AdditionalPropertiesFinding,
    DeprecatedProperty,
};
pub use validate::{
    SchemaError, SchemaReport, SchemaValidator, Severity, Violation, FEEDS_SCHEMA_NAME,
};
