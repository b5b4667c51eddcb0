//! # feedval-cli — Command-Line Front End for feedval
//!
//! Provides the `feedval` binary. The library half holds everything the
//! binary needs besides argument parsing, so it can be tested directly.
//!
//! ## Subcommands
//!
//! - `feedval validate <FILE>...` — validate feed configuration files.
//! - `feedval summary <FILE>` — print an overview of the configured feeds.
//! - `feedval rules` — list the active business rules.
//! - `feedval schema` — compile a schema and audit it.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | every document valid |
//! | 1 | at least one document invalid (or warnings with `--deny-warnings`) |
//! | 2 | fatal: bad config, unreadable document, broken schema, unknown rule id |
//!
//! ```bash
//! feedval validate fixtures/feed_file_1.yaml
//! feedval -v validate --format json --disable-rule kafka-ssl-port feeds/*.yaml
//! ```

pub mod config;
pub mod loader;
pub mod report;
pub mod rules;
pub mod schema;
pub mod summary;
pub mod validate;

use std::path::Path;

use feedval_schema::{SchemaError, SchemaValidator};

pub const EXIT_VALID: u8 = 0;
pub const EXIT_INVALID: u8 = 1;
pub const EXIT_FATAL: u8 = 2;

/// Compile the schema at `path`, or the bundled feeds schema when `None`.
pub fn load_schema(path: Option<&Path>) -> Result<SchemaValidator, SchemaError> {
    match path {
        Some(path) => SchemaValidator::from_file(path),
        None => SchemaValidator::feeds(),
    }
}
