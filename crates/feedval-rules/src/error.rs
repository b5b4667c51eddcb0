//! Errors raised while assembling a [`RuleRegistry`](crate::RuleRegistry).

use thiserror::Error;

/// Registry construction error. Rule evaluation itself never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A rule with the same id is already registered.
    #[error("rule '{0}' is already registered")]
    DuplicateId(String),

    /// Rule ids that do not name any registered rule.
    #[error("unknown rule id(s): {}", .0.join(", "))]
    UnknownRules(Vec<String>),
}
