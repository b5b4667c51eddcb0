//! # Validate Subcommand
//!
//! Loads each file, validates all documents in parallel with one shared
//! engine, and reports every verdict in input order.
//!
//! ```bash
//! feedval validate fixtures/feed_file_1.yaml fixtures/feed_kafka_1.yaml
//! feedval validate --deny-warnings --format json feeds.yaml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use feedval_core::Document;
use feedval_engine::ValidationEngine;
use feedval_rules::RuleRegistry;
use tracing::info;

use crate::config::{ConfigFile, OutputFormat, Overrides};
use crate::loader::load_document;
use crate::report::{render_json, render_text, FileReport};
use crate::{load_schema, EXIT_INVALID, EXIT_VALID};

/// Arguments for `feedval validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Feed configuration files (.yaml, .yml or .json).
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// JSON schema to validate against instead of the bundled feeds schema.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Fail when a document has warnings.
    #[arg(long)]
    pub deny_warnings: bool,

    /// Disable a business rule by id. Repeatable.
    #[arg(long = "disable-rule", value_name = "ID")]
    pub disable_rules: Vec<String>,
}

/// Rendered report and exit code of a validate run.
#[derive(Debug)]
pub struct ValidateOutcome {
    pub report: String,
    pub exit_code: u8,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, config: ConfigFile) -> Result<u8> {
    let outcome = validate_files(args, config)?;
    print!("{}", outcome.report);
    Ok(outcome.exit_code)
}

/// Validate the files named by `args` and render the report.
///
/// # Errors
///
/// Fatal conditions only: an unusable schema, an unknown disabled rule id,
/// or a file that cannot be loaded. Invalid documents are not errors.
pub fn validate_files(args: &ValidateArgs, config: ConfigFile) -> Result<ValidateOutcome> {
    let resolved = config.resolve(Overrides {
        schema: args.schema.clone(),
        disabled_rules: args.disable_rules.clone(),
        deny_warnings: args.deny_warnings,
        format: args.format,
    });

    let schema = load_schema(resolved.schema.as_deref())?;
    let engine =
        ValidationEngine::with_settings(schema, RuleRegistry::standard(), resolved.engine)?;

    let documents: Vec<Document> = args
        .files
        .iter()
        .map(|path| {
            load_document(path).with_context(|| format!("failed to load {}", path.display()))
        })
        .collect::<Result<_>>()?;

    let verdicts = engine.validate_batch(&documents);
    let names: Vec<String> = args.files.iter().map(|p| p.display().to_string()).collect();

    let mut all_pass = true;
    let mut reports = Vec::with_capacity(verdicts.len());
    for (file, verdict) in names.into_iter().zip(&verdicts) {
        let passed = engine.passes(verdict);
        info!(
            file = %file,
            valid = verdict.valid,
            errors = verdict.errors.len(),
            warnings = verdict.warnings.len(),
            "validated"
        );
        all_pass &= passed;
        reports.push(FileReport {
            file,
            passed,
            verdict,
        });
    }

    let report = match resolved.format {
        OutputFormat::Text => reports
            .iter()
            .map(|r| render_text(&r.file, r.verdict, r.passed))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            let mut json = render_json(&reports).context("failed to serialize report")?;
            json.push('\n');
            json
        }
    };

    Ok(ValidateOutcome {
        report,
        exit_code: if all_pass { EXIT_VALID } else { EXIT_INVALID },
    })
}
