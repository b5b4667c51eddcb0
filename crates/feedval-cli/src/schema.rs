//! # Schema Subcommand
//!
//! Compiles a schema (fatal on definition errors) and audits it: object
//! nodes that still accept unknown keys, and properties marked deprecated.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use feedval_schema::{audit_additional_properties, audit_deprecated};

use crate::config::ConfigFile;
use crate::{load_schema, EXIT_VALID};

/// Arguments for `feedval schema`.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Schema to audit instead of the configured or bundled one.
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

/// Execute the schema subcommand.
pub fn run_schema(args: &SchemaArgs, config: &ConfigFile) -> Result<u8> {
    print!("{}", audit_report(args, config)?);
    Ok(EXIT_VALID)
}

/// Compile the selected schema and render the audit.
pub fn audit_report(args: &SchemaArgs, config: &ConfigFile) -> Result<String> {
    let path = args.schema.as_deref().or(config.schema.as_deref());
    let validator = load_schema(path)?;

    let open = audit_additional_properties(validator.schema());
    let deprecated = audit_deprecated(validator.schema());

    let mut lines = vec![format!("Schema: {} (compiled)", validator.name())];
    lines.push(String::new());
    if open.is_empty() {
        lines.push("All object nodes reject unknown properties.".to_string());
    } else {
        lines.push(format!("Open object nodes ({}):", open.len()));
        lines.extend(open.iter().map(|f| format!("  {f}")));
    }
    if !deprecated.is_empty() {
        lines.push(String::new());
        lines.push(format!("Deprecated properties ({}):", deprecated.len()));
        lines.extend(deprecated.iter().map(|d| format!("  {d}")));
    }
    lines.push(String::new());
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_schema_is_closed() {
        let report = audit_report(&SchemaArgs { schema: None }, &ConfigFile::default()).unwrap();
        assert!(report.starts_with("Schema: feeds.schema.json (compiled)\n"));
        assert!(report.contains("All object nodes reject unknown properties."));
        assert!(report.contains("Deprecated properties (1):"));
        assert!(report.contains("\"trailing-delimeter\" is deprecated"));
    }

    #[test]
    fn open_nodes_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("open.schema.json");
        std::fs::write(
            &path,
            r#"{"type": "array", "items": {"type": "object", "properties": {"name": {"type": "string"}}}}"#,
        )
        .unwrap();
        let report = audit_report(&SchemaArgs { schema: Some(path) }, &ConfigFile::default()).unwrap();
        assert!(report.contains("Open object nodes (1):"), "{report}");
    }

    #[test]
    fn flag_wins_over_config_schema() {
        let config = ConfigFile {
            schema: Some(PathBuf::from("does/not/exist.json")),
            ..ConfigFile::default()
        };
        assert!(audit_report(&SchemaArgs { schema: None }, &config).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closed.schema.json");
        std::fs::write(&path, r#"{"type": "array"}"#).unwrap();
        let report = audit_report(&SchemaArgs { schema: Some(path) }, &config).unwrap();
        assert!(report.starts_with("Schema: closed.schema.json (compiled)"));
    }

    #[test]
    fn broken_schema_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.schema.json");
        std::fs::write(&path, r#"{"type": "array", "minItems": "one"}"#).unwrap();
        assert!(run_schema(&SchemaArgs { schema: Some(path) }, &ConfigFile::default()).is_err());
    }
}
