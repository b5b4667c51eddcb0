//! Property tests for the rule registry: evaluation is deterministic and
//! independent of registration order.

use std::collections::BTreeSet;
use std::sync::Arc;

use feedval_core::{decode_feed, FeedConfig};
use feedval_rules::builtin::standard_rules;
use feedval_rules::{BusinessRule, RuleRegistry, RuleViolation};
use proptest::prelude::*;
use serde_json::{json, Value};

fn file_watcher_feed() -> impl Strategy<Value = Value> {
    (
        0u64..90,
        prop::option::of(prop_oneof![Just(String::new()), Just("/mon".to_string())]),
        prop::option::of(prop_oneof![Just("gzip"), Just("zip"), Just("none")]),
        prop::option::of(0u64..300 * 1024 * 1024),
        any::<bool>(),
    )
        .prop_map(|(interval, monitor, compression, size, with_tx)| {
            let mut fw = json!({ "name": "w", "interval": interval, "inbound-uri": "/in" });
            if let Some(m) = monitor {
                fw["monitor-uri"] = json!(m);
            }
            if with_tx {
                fw["transaction"] = json!({ "rollback": { "failure-uri": "/f" } });
            }
            let mut ds = json!({ "name": "d", "pattern": "*" });
            if let Some(c) = compression {
                ds["compression"] = json!(c);
            }
            if let Some(s) = size {
                ds["max-file-size"] = json!(s);
            }
            json!({ "name": "fw", "file-watcher": fw, "inbound-datasets": [ds] })
        })
}

fn kafka_feed() -> impl Strategy<Value = Value> {
    (
        prop_oneof![Just("SSL"), Just("SASL_SSL"), Just("PLAINTEXT")],
        prop::option::of(prop_oneof![Just(json!(9093)), Just(json!("9093")), Just(json!(9092))]),
        prop::option::of(any::<bool>()),
        prop::option::of(prop_oneof![Just(""), Just("com.x.Flow")]),
        any::<bool>(),
    )
        .prop_map(|(protocol, port, active, flow_class, replay)| {
            let mut configs = json!({ "security.protocol": protocol });
            if let Some(p) = port {
                configs["port"] = p;
            }
            if replay {
                let mut source = json!({ "name": "r", "configs": configs });
                if let Some(a) = active {
                    source["active"] = json!(a);
                }
                if let Some(fc) = flow_class {
                    source["flow-class"] = json!(fc);
                }
                json!({ "name": "replay", "kafka-file-replay": source, "inbound-datasets": [] })
            } else {
                json!({
                    "name": "topic",
                    "kafka-topic": { "name": "t", "bootstrap-servers": "b", "topics": "x", "configs": configs },
                    "inbound-datasets": []
                })
            }
        })
}

fn feeds() -> impl Strategy<Value = Vec<FeedConfig>> {
    prop::collection::vec(prop_oneof![file_watcher_feed(), kafka_feed()], 0..8).prop_map(|values| {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| decode_feed(i, v).unwrap())
            .collect()
    })
}

fn run(registry: &RuleRegistry, feeds: &[FeedConfig]) -> Vec<RuleViolation> {
    registry.evaluate(feeds.iter().enumerate())
}

proptest! {
    /// Permuting the registry changes at most the order of violations.
    #[test]
    fn registry_order_does_not_change_failures(
        feeds in feeds(),
        shuffled in Just(standard_rules()).prop_shuffle(),
    ) {
        let canonical = RuleRegistry::standard();
        let permuted = RuleRegistry::from_rules(shuffled).unwrap();

        let expected: BTreeSet<String> = run(&canonical, &feeds).iter().map(ToString::to_string).collect();
        let actual: BTreeSet<String> = run(&permuted, &feeds).iter().map(ToString::to_string).collect();
        prop_assert_eq!(expected, actual);
    }

    /// Evaluating the same feeds twice yields identical violations.
    #[test]
    fn evaluation_is_deterministic(feeds in feeds()) {
        let registry = RuleRegistry::standard();
        prop_assert_eq!(run(&registry, &feeds), run(&registry, &feeds));
    }

    /// A rule contributes at most one violation per feed.
    #[test]
    fn at_most_one_violation_per_rule_and_feed(feeds in feeds()) {
        let violations = run(&RuleRegistry::standard(), &feeds);
        let keys: BTreeSet<(usize, &str)> =
            violations.iter().map(|v| (v.feed_index, v.rule_id.as_str())).collect();
        prop_assert_eq!(keys.len(), violations.len());
    }

    /// Disabling a rule removes exactly that rule's violations.
    #[test]
    fn disabling_a_rule_removes_only_its_violations(
        feeds in feeds(),
        victim in 0usize..5,
    ) {
        let registry = RuleRegistry::standard();
        let id = registry.ids()[victim].to_string();
        let trimmed = registry.without(&[id.as_str()]).unwrap();

        let expected: Vec<RuleViolation> =
            run(&registry, &feeds).into_iter().filter(|v| v.rule_id != id).collect();
        prop_assert_eq!(run(&trimmed, &feeds), expected);
    }
}

#[test]
fn one_feed_can_break_several_rules() {
    let feed = decode_feed(
        0,
        &json!({
            "name": "everything-wrong",
            "file-watcher": {
                "name": "w",
                "interval": 5,
                "inbound-uri": "/in",
                "transaction": { "commit": { "success-uri": "" } }
            },
            "inbound-datasets": [
                { "name": "big", "pattern": "*", "compression": "gzip", "max-file-size": 209715200 }
            ]
        }),
    )
    .unwrap();
    let violations = RuleRegistry::standard().evaluate_feed(0, &feed);
    let ids: Vec<&str> = violations.iter().map(|v| v.rule_id.as_str()).collect();
    assert_eq!(ids, ["file-watcher-monitor-uri", "gzip-max-file-size", "transaction-commit"]);
}

#[test]
fn custom_rules_join_without_touching_the_loop() {
    #[derive(Debug)]
    struct LayerRequired;

    impl BusinessRule for LayerRequired {
        fn id(&self) -> &str {
            "layer-required"
        }
        fn description(&self) -> &str {
            "Every feed declares a layer"
        }
        fn evaluate(&self, feed: &FeedConfig) -> feedval_rules::RuleOutcome {
            feedval_rules::RuleOutcome::check(feed.layer.is_some(), || "layer must be set".to_string())
        }
    }

    let mut rules = standard_rules();
    rules.push(Arc::new(LayerRequired));
    let registry = RuleRegistry::from_rules(rules).unwrap();

    let feed = decode_feed(
        1,
        &json!({ "name": "no-layer", "file-watcher": { "interval": 60 }, "inbound-datasets": [] }),
    )
    .unwrap();
    let violations = registry.evaluate_feed(1, &feed);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].to_string(), "feed[1] 'no-layer': [layer-required] layer must be set");
}
