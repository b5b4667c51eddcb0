//! # Rules Subcommand
//!
//! Lists the business rules a `validate` run would apply: the standard
//! registry minus the rules disabled in the config file.

use anyhow::{Context, Result};
use clap::Args;
use feedval_rules::{RuleDescriptor, RuleRegistry};

use crate::config::{ConfigFile, OutputFormat};
use crate::EXIT_VALID;

/// Arguments for `feedval rules`.
#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Listing format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the rules subcommand.
pub fn run_rules(args: &RulesArgs, config: &ConfigFile) -> Result<u8> {
    let descriptors = active_rules(config)?;
    match args.format {
        OutputFormat::Text => {
            println!("Active rules:");
            println!();
            for rule in &descriptors {
                println!("  {:<30} {}", rule.id, rule.description);
            }
            println!();
            println!("Total: {} rules", descriptors.len());
        }
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&descriptors).context("failed to serialize rules")?;
            println!("{json}");
        }
    }
    Ok(EXIT_VALID)
}

/// Descriptors of the rules left after applying `disabled-rules`.
pub fn active_rules(config: &ConfigFile) -> Result<Vec<RuleDescriptor>> {
    let registry = RuleRegistry::standard()
        .without(config.disabled_rules.as_slice())
        .context("invalid disabled-rules in config file")?;
    Ok(registry.descriptors())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_standard_rules_are_active_by_default() {
        let ids: Vec<String> = active_rules(&ConfigFile::default())
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(
            ids,
            [
                "file-watcher-monitor-uri",
                "kafka-ssl-port",
                "gzip-max-file-size",
                "kafka-file-replay-flow-class",
                "transaction-commit",
            ]
        );
    }

    #[test]
    fn disabled_rules_are_hidden() {
        let config = ConfigFile {
            disabled_rules: vec!["gzip-max-file-size".into()],
            ..ConfigFile::default()
        };
        let rules = active_rules(&config).unwrap();
        assert_eq!(rules.len(), 4);
        assert!(rules.iter().all(|r| r.id != "gzip-max-file-size"));
    }

    #[test]
    fn unknown_disabled_rule_is_an_error() {
        let config = ConfigFile {
            disabled_rules: vec!["typo".into()],
            ..ConfigFile::default()
        };
        assert!(run_rules(&RulesArgs { format: OutputFormat::Text }, &config).is_err());
    }
}
