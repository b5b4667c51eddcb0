//! # Standard Rules
//!
//! The cross-field policies every feed document is held to. Each rule is a
//! unit struct implementing [`BusinessRule`]; [`standard_rules`] lists them
//! in registry order.
//!
//! | Id | Policy |
//! |----|--------|
//! | `file-watcher-monitor-uri` | polling faster than every 30 s needs a monitor location |
//! | `kafka-ssl-port` | SSL / SASL_SSL Kafka clients connect on port 9093 |
//! | `gzip-max-file-size` | gzip datasets cap single files at 100 MiB |
//! | `kafka-file-replay-flow-class` | an active replay source names its flow class |
//! | `transaction-commit` | a file-watcher transaction declares where commits go |
//!
//! A rule whose condition does not apply to a feed (wrong source kind,
//! field absent) is satisfied.

use std::sync::Arc;

use feedval_core::{Compression, FeedConfig};

use crate::rule::{BusinessRule, RuleOutcome};

/// File-watcher intervals below this many seconds require a monitor URI.
pub const FAST_POLL_THRESHOLD_SECS: u64 = 30;

/// Port that SSL-secured Kafka clients must use.
pub const KAFKA_SSL_PORT: u16 = 9093;

/// Kafka `security.protocol` values that count as SSL.
pub const SSL_PROTOCOLS: &[&str] = &["SSL", "SASL_SSL"];

/// Largest single-file size allowed for gzip datasets (100 MiB).
pub const GZIP_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// The standard rules, in registry order.
pub fn standard_rules() -> Vec<Arc<dyn BusinessRule>> {
    vec![
        Arc::new(MonitorUriForFastPolling),
        Arc::new(KafkaSslPort),
        Arc::new(GzipMaxFileSize),
        Arc::new(ReplayFlowClass),
        Arc::new(TransactionCommit),
    ]
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

/// `file-watcher.interval < 30` requires a non-empty `monitor-uri`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorUriForFastPolling;

impl BusinessRule for MonitorUriForFastPolling {
    fn id(&self) -> &str {
        "file-watcher-monitor-uri"
    }

    fn description(&self) -> &str {
        "A file-watcher polling more often than every 30 seconds must set monitor-uri"
    }

    fn evaluate(&self, feed: &FeedConfig) -> RuleOutcome {
        let Some(fw) = feed.file_watcher() else {
            return RuleOutcome::pass();
        };
        match fw.interval {
            Some(interval) if interval < FAST_POLL_THRESHOLD_SECS => {
                RuleOutcome::check(!is_blank(fw.monitor_uri.as_deref()), || {
                    format!(
                        "If file-watcher interval < {FAST_POLL_THRESHOLD_SECS} seconds, monitor-uri must be specified (interval is {interval})"
                    )
                })
            }
            _ => RuleOutcome::pass(),
        }
    }
}

/// SSL-secured Kafka sources with an explicit `port` must use 9093.
///
/// Applies to both Kafka source kinds. The port may be written as an
/// integer or as a decimal string.
#[derive(Debug, Clone, Copy, Default)]
pub struct KafkaSslPort;

impl BusinessRule for KafkaSslPort {
    fn id(&self) -> &str {
        "kafka-ssl-port"
    }

    fn description(&self) -> &str {
        "A Kafka source using SSL or SASL_SSL must connect on port 9093"
    }

    fn evaluate(&self, feed: &FeedConfig) -> RuleOutcome {
        let Some(configs) = feed.kafka_configs() else {
            return RuleOutcome::pass();
        };
        let uses_ssl = configs
            .get("security.protocol")
            .and_then(|p| p.as_str())
            .is_some_and(|p| SSL_PROTOCOLS.contains(&p));
        match configs.get("port") {
            Some(port) if uses_ssl => RuleOutcome::check(port.is_port(KAFKA_SSL_PORT), || {
                format!("If SSL security is used, port must be {KAFKA_SSL_PORT} (found {port})")
            }),
            _ => RuleOutcome::pass(),
        }
    }
}

/// gzip datasets with a `max-file-size` must cap it at 100 MiB.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipMaxFileSize;

impl BusinessRule for GzipMaxFileSize {
    fn id(&self) -> &str {
        "gzip-max-file-size"
    }

    fn description(&self) -> &str {
        "A gzip-compressed dataset must not allow files larger than 100 MiB"
    }

    fn evaluate(&self, feed: &FeedConfig) -> RuleOutcome {
        let oversized: Vec<String> = feed
            .inbound_datasets
            .iter()
            .enumerate()
            .filter(|(_, ds)| ds.compression == Some(Compression::Gzip))
            .filter_map(|(i, ds)| {
                let size = ds.max_file_size?;
                (size > GZIP_MAX_FILE_SIZE).then(|| {
                    let name = ds.name.clone().unwrap_or_else(|| format!("#{i}"));
                    format!("{name} ({size} bytes)")
                })
            })
            .collect();
        RuleOutcome::check(oversized.is_empty(), || {
            format!(
                "If compression is gzip, max file size must be <= 100MB ({GZIP_MAX_FILE_SIZE} bytes); offending datasets: {}",
                oversized.join(", ")
            )
        })
    }
}

/// An active kafka-file-replay source must name its `flow-class`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplayFlowClass;

impl BusinessRule for ReplayFlowClass {
    fn id(&self) -> &str {
        "kafka-file-replay-flow-class"
    }

    fn description(&self) -> &str {
        "An active kafka-file-replay source must set flow-class"
    }

    fn evaluate(&self, feed: &FeedConfig) -> RuleOutcome {
        match feed.kafka_file_replay() {
            Some(replay) if replay.active == Some(true) => {
                RuleOutcome::check(!is_blank(replay.flow_class.as_deref()), || {
                    "If kafka-file-replay is active, flow-class must be specified".to_string()
                })
            }
            _ => RuleOutcome::pass(),
        }
    }
}

/// A file-watcher `transaction` must declare a commit with a `success-uri`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionCommit;

impl BusinessRule for TransactionCommit {
    fn id(&self) -> &str {
        "transaction-commit"
    }

    fn description(&self) -> &str {
        "A file-watcher transaction must declare commit.success-uri"
    }

    fn evaluate(&self, feed: &FeedConfig) -> RuleOutcome {
        let Some(transaction) = feed.file_watcher().and_then(|fw| fw.transaction.as_ref()) else {
            return RuleOutcome::pass();
        };
        match &transaction.commit {
            None => RuleOutcome::fail("If a transaction is declared, commit must be specified"),
            Some(commit) => RuleOutcome::check(!is_blank(commit.success_uri.as_deref()), || {
                "If a transaction is declared, commit.success-uri must be specified".to_string()
            }),
        }
    }
}
