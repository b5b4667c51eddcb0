//! # Reports
//!
//! Renders verdicts and configuration summaries for the terminal (text) or
//! for other tools (JSON). Rendering returns strings; the subcommands own
//! stdout.

use std::fmt::Write as _;

use feedval_core::{decode_document, Document, FeedConfig};
use feedval_engine::Verdict;
use serde::Serialize;

/// One validated file, as emitted in JSON reports.
#[derive(Debug, Serialize)]
pub struct FileReport<'a> {
    pub file: String,
    /// Verdict under the effective `deny-warnings` setting.
    pub passed: bool,
    #[serde(flatten)]
    pub verdict: &'a Verdict,
}

/// Render one verdict as text.
pub fn render_text(file: &str, verdict: &Verdict, passed: bool) -> String {
    let mut out = String::new();
    let status = if !verdict.valid {
        "INVALID"
    } else if passed {
        "VALID"
    } else {
        "VALID (warnings denied)"
    };
    let _ = writeln!(out, "=== {file} ===");
    let _ = writeln!(out, "Overall Status: {status}");

    if !verdict.errors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "ERRORS ({}):", verdict.errors.len());
        for (i, error) in verdict.errors.iter().enumerate() {
            let _ = writeln!(out, "{}. {error}", i + 1);
        }
    }
    if !verdict.warnings.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "WARNINGS ({}):", verdict.warnings.len());
        for (i, warning) in verdict.warnings.iter().enumerate() {
            let _ = writeln!(out, "{}. {warning}", i + 1);
        }
    }

    let _ = writeln!(out);
    let closing = if !verdict.valid {
        "Configuration has validation errors that need to be fixed."
    } else if passed {
        "Configuration is valid and ready for use!"
    } else {
        "Configuration is valid but has warnings, which are denied."
    };
    let _ = writeln!(out, "{closing}");
    out
}

/// Render every file's verdict as one JSON array.
pub fn render_json(reports: &[FileReport<'_>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

// ---------------------------------------------------------------------------
// Configuration summary
// ---------------------------------------------------------------------------

/// Overview of one decoded feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSummary {
    pub name: String,
    pub active: bool,
    pub layer: Option<String>,
    pub source_kind: &'static str,
    pub source_name: Option<String>,
    /// Polling interval in seconds, for file watchers.
    pub interval: Option<u64>,
    pub datasets: usize,
}

impl From<&FeedConfig> for FeedSummary {
    fn from(feed: &FeedConfig) -> Self {
        Self {
            name: feed.name.clone(),
            active: feed.active,
            layer: feed.layer.clone(),
            source_kind: feed.source.kind().as_str(),
            source_name: feed.source.name().map(str::to_string),
            interval: feed.file_watcher().and_then(|fw| fw.interval),
            datasets: feed.inbound_datasets.len(),
        }
    }
}

/// Overview of a whole document. Entries that do not decode are listed
/// with the reason instead of a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSummary {
    pub feeds: Vec<Result<FeedSummary, String>>,
}

impl ConfigSummary {
    /// Summarize a document.
    ///
    /// # Errors
    ///
    /// The reason, when the document root is not a list of feeds.
    pub fn of(document: &Document) -> Result<Self, String> {
        let decoded = decode_document(document).map_err(|e| e.to_string())?;
        let feeds = decoded
            .iter()
            .map(|entry| match entry {
                Ok(feed) => Ok(FeedSummary::from(feed)),
                Err(e) => Err(e.to_string()),
            })
            .collect();
        Ok(Self { feeds })
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Configuration Summary ===");
        let _ = writeln!(out, "Number of configurations: {}", self.feeds.len());
        for (i, entry) in self.feeds.iter().enumerate() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Configuration {}:", i + 1);
            match entry {
                Ok(feed) => {
                    let _ = writeln!(out, "  Name: {}", feed.name);
                    let _ = writeln!(out, "  Active: {}", feed.active);
                    let _ = writeln!(out, "  Layer: {}", feed.layer.as_deref().unwrap_or("N/A"));
                    let _ = writeln!(
                        out,
                        "  Source: {} ({})",
                        feed.source_kind,
                        feed.source_name.as_deref().unwrap_or("N/A")
                    );
                    if let Some(interval) = feed.interval {
                        let _ = writeln!(out, "  Interval: {interval} seconds");
                    }
                    let _ = writeln!(out, "  Datasets: {}", feed.datasets);
                }
                Err(reason) => {
                    let _ = writeln!(out, "  (not decodable: {reason})");
                }
            }
        }
        out
    }
}
