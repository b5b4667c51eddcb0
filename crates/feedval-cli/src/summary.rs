//! # Summary Subcommand
//!
//! Prints an overview of the feeds in one configuration file. The summary
//! does not validate; entries that cannot be decoded are listed as such.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::loader::load_document;
use crate::report::ConfigSummary;
use crate::{EXIT_INVALID, EXIT_VALID};

/// Arguments for `feedval summary`.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Feed configuration file (.yaml, .yml or .json).
    pub file: PathBuf,
}

/// Execute the summary subcommand.
pub fn run_summary(args: &SummaryArgs) -> Result<u8> {
    let document = load_document(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    match ConfigSummary::of(&document) {
        Ok(summary) => {
            print!("{}", summary.render_text());
            Ok(EXIT_VALID)
        }
        Err(reason) => {
            println!("{}: {reason}", args.file.display());
            Ok(EXIT_INVALID)
        }
    }
}
