//! Property tests: schema validation is total and deterministic over
//! arbitrary documents.

use feedval_core::Document;
use feedval_schema::{SchemaValidator, Severity};
use proptest::prelude::*;
use serde_json::Value;

/// Trees biased towards feed-shaped keys so validation reaches nested
/// subschemas instead of failing at the root.
fn feedish_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..200).prop_map(|n| serde_json::json!(n)),
        prop_oneof![Just("gzip".to_string()), Just("none".to_string()), "[a-z]{0,8}"]
            .prop_map(Value::String),
    ];
    leaf.prop_recursive(5, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![
                    Just("name".to_string()),
                    Just("file-watcher".to_string()),
                    Just("interval".to_string()),
                    Just("inbound-datasets".to_string()),
                    Just("compression".to_string()),
                    Just("trailing-delimeter".to_string()),
                    "[a-z]{1,8}"
                ],
                inner,
                0..5
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Validation never panics and repeated runs agree.
    #[test]
    fn validation_is_deterministic(value in feedish_json()) {
        let validator = SchemaValidator::feeds().unwrap();
        let doc = Document::new(value);
        let first = validator.validate(&doc);
        let second = validator.validate(&doc);
        prop_assert_eq!(first, second);
    }

    /// `valid` is exactly "no error-severity violation", and matches the
    /// fast path.
    #[test]
    fn valid_flag_tracks_error_violations(value in feedish_json()) {
        let validator = SchemaValidator::feeds().unwrap();
        let doc = Document::new(value);
        let report = validator.validate(&doc);
        let has_errors = report.violations.iter().any(|v| v.severity == Severity::Error);
        prop_assert_eq!(report.valid, !has_errors);
        prop_assert_eq!(validator.is_valid(&doc), report.valid);
    }

    /// Every violation points at a node that exists in the document, or
    /// at its root.
    #[test]
    fn violation_paths_resolve(value in feedish_json()) {
        let validator = SchemaValidator::feeds().unwrap();
        let doc = Document::new(value);
        for violation in validator.validate(&doc).violations {
            prop_assert!(
                doc.get(&violation.path).is_some(),
                "{} does not resolve",
                violation.path
            );
        }
    }
}
