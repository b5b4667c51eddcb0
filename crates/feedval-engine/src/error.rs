//! Engine construction errors. Validating a document never fails.

use feedval_rules::RuleError;
use feedval_schema::SchemaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The schema could not be loaded or compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The rule registry could not be assembled from the settings.
    #[error("invalid rule settings: {0}")]
    Rules(#[from] RuleError),
}
