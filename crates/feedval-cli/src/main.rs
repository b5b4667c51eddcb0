//! # feedval CLI entry point
//!
//! Parses command-line arguments, installs logging, reads the config file
//! and dispatches to the subcommand handlers. Reports go to stdout, logs
//! to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use feedval_cli::config::ConfigFile;
use feedval_cli::rules::{run_rules, RulesArgs};
use feedval_cli::schema::{run_schema, SchemaArgs};
use feedval_cli::summary::{run_summary, SummaryArgs};
use feedval_cli::validate::{run_validate, ValidateArgs};
use feedval_cli::EXIT_FATAL;

/// Validate feed configuration files against the feeds schema and the
/// business rules.
#[derive(Parser, Debug)]
#[command(name = "feedval", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file (default: ./feedval.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate feed configuration files.
    Validate(ValidateArgs),

    /// Print an overview of the feeds in a configuration file.
    Summary(SummaryArgs),

    /// List the active business rules.
    Rules(RulesArgs),

    /// Compile a schema and audit it for open objects and deprecated keys.
    Schema(SchemaArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("feedval v{} starting", env!("CARGO_PKG_VERSION"));

    match dispatch(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn dispatch(cli: Cli) -> Result<u8> {
    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    let config = ConfigFile::discover(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Validate(args) => run_validate(&args, config),
        Commands::Summary(args) => run_summary(&args),
        Commands::Rules(args) => run_rules(&args, &config),
        Commands::Schema(args) => run_schema(&args, &config),
    }
}
