//! # Orchestration
//!
//! [`run`] composes the schema layer and the rule layer for one document.
//! [`ValidationEngine`] holds both as shared read-only configuration.

use std::sync::Arc;

use feedval_core::{decode_document, Document};
use feedval_rules::RuleRegistry;
use feedval_schema::SchemaValidator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::verdict::Verdict;

/// Validate one document against a schema and a rule registry.
///
/// Business rules run only when the schema reports no Error-severity
/// violation. Entries that pass the schema but still cannot be decoded
/// (possible with a schema looser than the typed model) become error
/// entries; the remaining entries are still checked by the rules.
pub fn run(schema: &SchemaValidator, rules: &RuleRegistry, document: &Document) -> Verdict {
    let mut verdict = Verdict::ok();
    let report = schema.validate(document);

    for warning in report.warnings() {
        verdict.add_warning(warning.to_string());
    }

    if !report.valid {
        for error in report.errors() {
            verdict.add_error(error.to_string());
        }
        info!(
            schema = schema.name(),
            errors = verdict.errors.len(),
            warnings = verdict.warnings.len(),
            "document failed schema validation; business rules skipped"
        );
        return verdict;
    }

    let entries = match decode_document(document) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "schema-valid document could not be decoded");
            verdict.add_error(e.to_string());
            return verdict;
        }
    };

    verdict.rules_evaluated = true;
    for (index, entry) in entries.iter().enumerate() {
        match entry {
            Ok(feed) => {
                verdict.feeds_decoded += 1;
                for violation in rules.evaluate_feed(index, feed) {
                    verdict.add_error(violation.to_string());
                }
            }
            Err(e) => {
                warn!(feed_index = index, error = %e, "schema-valid feed could not be decoded");
                verdict.add_error(e.to_string());
            }
        }
    }

    info!(
        valid = verdict.valid,
        feeds = verdict.feeds_decoded,
        rules = rules.len(),
        errors = verdict.errors.len(),
        warnings = verdict.warnings.len(),
        "document validated"
    );
    verdict
}

/// Engine-level settings, typically read from the CLI config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct EngineSettings {
    /// Rule ids removed from the registry.
    pub disabled_rules: Vec<String>,
    /// Treat warnings as failures in [`ValidationEngine::passes`].
    pub deny_warnings: bool,
}

/// A schema and a rule registry, shared read-only across validations.
///
/// Cloning is cheap; clones share the compiled schema and the rules.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    schema: Arc<SchemaValidator>,
    rules: Arc<RuleRegistry>,
    settings: EngineSettings,
}

impl ValidationEngine {
    /// Combine a schema and a registry with default settings.
    pub fn new(schema: SchemaValidator, rules: RuleRegistry) -> Self {
        Self {
            schema: Arc::new(schema),
            rules: Arc::new(rules),
            settings: EngineSettings::default(),
        }
    }

    /// Combine a schema and a registry, removing the rules the settings
    /// disable.
    ///
    /// # Errors
    ///
    /// [`EngineError::Rules`] if a disabled id names no registered rule.
    pub fn with_settings(
        schema: SchemaValidator,
        rules: RuleRegistry,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        let rules = rules.without(settings.disabled_rules.as_slice())?;
        debug!(
            schema = schema.name(),
            rules = ?rules.ids(),
            deny_warnings = settings.deny_warnings,
            "validation engine configured"
        );
        Ok(Self {
            schema: Arc::new(schema),
            rules: Arc::new(rules),
            settings,
        })
    }

    /// The bundled feeds schema with the standard rule set.
    pub fn standard(settings: EngineSettings) -> Result<Self, EngineError> {
        Self::with_settings(SchemaValidator::feeds()?, RuleRegistry::standard(), settings)
    }

    pub fn schema(&self) -> &SchemaValidator {
        &self.schema
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Validate one document.
    pub fn validate(&self, document: &Document) -> Verdict {
        run(&self.schema, &self.rules, document)
    }

    /// Validate many documents in parallel. Verdicts keep input order.
    pub fn validate_batch(&self, documents: &[Document]) -> Vec<Verdict> {
        debug!(documents = documents.len(), "validating batch");
        documents
            .par_iter()
            .map(|document| self.validate(document))
            .collect()
    }

    /// Whether a verdict passes under this engine's `deny_warnings` setting.
    pub fn passes(&self, verdict: &Verdict) -> bool {
        verdict.passes(self.settings.deny_warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use feedval_rules::{FnRule, RuleOutcome};
    use serde_json::json;

    fn counting_registry(calls: Arc<AtomicUsize>) -> RuleRegistry {
        let mut registry = RuleRegistry::standard();
        registry
            .register(FnRule::new("count", "Counts invocations", move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                RuleOutcome::pass()
            }))
            .unwrap();
        registry
    }

    fn watcher_feed(name: &str, interval: u64, monitor_uri: &str) -> serde_json::Value {
        json!({
            "name": name,
            "file-watcher": {
                "name": "w",
                "interval": interval,
                "inbound-uri": "/in",
                "monitor-uri": monitor_uri
            },
            "inbound-datasets": []
        })
    }

    #[test]
    fn schema_errors_skip_business_rules() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rules = counting_registry(calls.clone());
        let schema = SchemaValidator::feeds().unwrap();

        let verdict = run(&schema, &rules, &Document::new(json!([{ "name": "x" }])));
        assert!(!verdict.valid);
        assert!(!verdict.rules_evaluated);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(verdict.errors.iter().any(|e| e.starts_with("/0: ")), "{:?}", verdict.errors);
    }

    #[test]
    fn valid_documents_reach_every_rule_for_every_feed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let rules = counting_registry(calls.clone());
        let schema = SchemaValidator::feeds().unwrap();

        let doc = Document::new(json!([
            watcher_feed("a", 60, ""),
            watcher_feed("b", 60, ""),
            watcher_feed("c", 60, "")
        ]));
        let verdict = run(&schema, &rules, &doc);
        assert!(verdict.valid, "{:?}", verdict.errors);
        assert!(verdict.rules_evaluated);
        assert_eq!(verdict.feeds_decoded, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn rule_failures_are_errors_tagged_with_feed() {
        let engine = ValidationEngine::standard(EngineSettings::default()).unwrap();
        let doc = Document::new(json!([
            watcher_feed("ok", 20, "/mon"),
            watcher_feed("fast", 20, "")
        ]));
        let verdict = engine.validate(&doc);
        assert!(!verdict.valid);
        assert_eq!(verdict.errors.len(), 1);
        assert!(
            verdict.errors[0].starts_with("feed[1] 'fast': [file-watcher-monitor-uri] "),
            "{}",
            verdict.errors[0]
        );
    }

    #[test]
    fn warnings_are_kept_when_rules_fail_and_when_schema_fails() {
        let engine = ValidationEngine::standard(EngineSettings::default()).unwrap();
        let mut feed = watcher_feed("legacy", 20, "");
        feed["inbound-datasets"] = json!([{ "name": "d", "pattern": "*", "trailing-delimeter": true }]);

        let verdict = engine.validate(&Document::new(json!([feed.clone()])));
        assert!(verdict.rules_evaluated);
        assert_eq!(verdict.errors.len(), 1);
        assert_eq!(verdict.warnings.len(), 1);

        feed["layer"] = json!(7);
        let verdict = engine.validate(&Document::new(json!([feed])));
        assert!(!verdict.rules_evaluated);
        assert_eq!(verdict.warnings.len(), 1);
    }

    #[test]
    fn decode_failures_do_not_hide_other_feeds() {
        // A schema that accepts anything lets undecodable entries through.
        let schema = SchemaValidator::new("open.schema.json", json!({})).unwrap();
        let doc = Document::new(json!([
            { "name": "no-source" },
            watcher_feed("fast", 10, "")
        ]));
        let verdict = run(&schema, &RuleRegistry::standard(), &doc);
        assert!(!verdict.valid);
        assert!(verdict.rules_evaluated);
        assert_eq!(verdict.feeds_decoded, 1);
        assert_eq!(verdict.errors.len(), 2);
        assert!(verdict.errors[0].starts_with("feed[0] cannot be decoded"), "{}", verdict.errors[0]);
        assert!(verdict.errors[1].contains("[file-watcher-monitor-uri]"));
    }

    #[test]
    fn non_array_document_under_open_schema_is_an_error() {
        let schema = SchemaValidator::new("open.schema.json", json!(true)).unwrap();
        let verdict = run(&schema, &RuleRegistry::standard(), &Document::new(json!("text")));
        assert!(!verdict.valid);
        assert!(verdict.errors[0].contains("must be an array"));
    }

    #[test]
    fn empty_document_is_valid() {
        let engine = ValidationEngine::standard(EngineSettings::default()).unwrap();
        let verdict = engine.validate(&Document::new(json!([])));
        assert!(verdict.valid);
        assert!(verdict.rules_evaluated);
        assert_eq!(verdict.feeds_decoded, 0);
    }

    #[test]
    fn disabled_rules_are_not_evaluated() {
        let settings = EngineSettings {
            disabled_rules: vec!["file-watcher-monitor-uri".to_string()],
            deny_warnings: false,
        };
        let engine = ValidationEngine::standard(settings).unwrap();
        assert_eq!(engine.rules().len(), 4);
        let verdict = engine.validate(&Document::new(json!([watcher_feed("fast", 5, "")])));
        assert!(verdict.valid);
    }

    #[test]
    fn unknown_disabled_rule_is_a_configuration_error() {
        let settings = EngineSettings {
            disabled_rules: vec!["gzip-max-filesize".to_string()],
            deny_warnings: false,
        };
        let err = ValidationEngine::standard(settings).unwrap_err();
        assert!(matches!(err, EngineError::Rules(_)));
        assert!(err.to_string().contains("gzip-max-filesize"));
    }

    #[test]
    fn deny_warnings_setting_drives_passes() {
        let mut verdict = Verdict::ok();
        verdict.add_warning("w");
        let lenient = ValidationEngine::standard(EngineSettings::default()).unwrap();
        let strict = ValidationEngine::standard(EngineSettings {
            deny_warnings: true,
            ..EngineSettings::default()
        })
        .unwrap();
        assert!(lenient.passes(&verdict));
        assert!(!strict.passes(&verdict));
    }

    #[test]
    fn batch_keeps_input_order() {
        let engine = ValidationEngine::standard(EngineSettings::default()).unwrap();
        let documents: Vec<Document> = (0..32)
            .map(|i| {
                if i % 3 == 0 {
                    Document::new(json!([watcher_feed("fast", 5, "")]))
                } else {
                    Document::new(json!([watcher_feed("slow", 60, "")]))
                }
            })
            .collect();
        let verdicts = engine.validate_batch(&documents);
        assert_eq!(verdicts.len(), documents.len());
        for (i, verdict) in verdicts.iter().enumerate() {
            assert_eq!(verdict.valid, i % 3 != 0, "document {i}");
            assert_eq!(verdict, &engine.validate(&documents[i]));
        }
    }

    #[test]
    fn settings_parse_from_kebab_case() {
        let settings: EngineSettings =
            serde_json::from_value(json!({ "disabled-rules": ["kafka-ssl-port"], "deny-warnings": true }))
                .unwrap();
        assert_eq!(settings.disabled_rules, ["kafka-ssl-port"]);
        assert!(settings.deny_warnings);
        let empty: EngineSettings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty, EngineSettings::default());
    }
}
