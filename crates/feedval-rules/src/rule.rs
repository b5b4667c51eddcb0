//! # Rule Contract
//!
//! The [`BusinessRule`] trait, its outcome type, and the violation record
//! the registry produces when a rule fails.

use std::fmt;

use feedval_core::FeedConfig;
use serde::Serialize;

// ---------------------------------------------------------------------------
// RuleOutcome
// ---------------------------------------------------------------------------

/// Result of evaluating one rule against one feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    /// Whether the feed satisfies the rule. Rules whose condition does not
    /// apply to the feed are satisfied.
    pub satisfied: bool,
    /// Rule-specific failure message; empty when satisfied.
    pub message: String,
}

impl RuleOutcome {
    /// A satisfied outcome.
    pub fn pass() -> Self {
        Self {
            satisfied: true,
            message: String::new(),
        }
    }

    /// A failed outcome with the given message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            message: message.into(),
        }
    }

    /// Pass when `holds`, otherwise fail with the lazily built message.
    pub fn check(holds: bool, message: impl FnOnce() -> String) -> Self {
        if holds {
            Self::pass()
        } else {
            Self::fail(message())
        }
    }
}

// ---------------------------------------------------------------------------
// BusinessRule
// ---------------------------------------------------------------------------

/// A cross-field predicate over one decoded feed.
///
/// Implementations must be pure: the same feed always yields the same
/// outcome, and evaluation has no side effects. Rules are shared between
/// threads, hence `Send + Sync`.
pub trait BusinessRule: Send + Sync + fmt::Debug {
    /// Stable identifier, used to disable the rule and to tag violations.
    fn id(&self) -> &str;

    /// One-line description of the policy.
    fn description(&self) -> &str;

    /// Evaluate the rule against one feed.
    fn evaluate(&self, feed: &FeedConfig) -> RuleOutcome;
}

type RuleFn = dyn Fn(&FeedConfig) -> RuleOutcome + Send + Sync;

/// A [`BusinessRule`] backed by a closure.
///
/// ```
/// use feedval_rules::{BusinessRule, FnRule, RuleOutcome};
///
/// let rule = FnRule::new("layer-set", "Every feed declares a layer", |feed| {
///     RuleOutcome::check(feed.layer.is_some(), || "layer must be set".to_string())
/// });
/// assert_eq!(rule.id(), "layer-set");
/// ```
pub struct FnRule {
    id: String,
    description: String,
    check: Box<RuleFn>,
}

impl FnRule {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        check: impl Fn(&FeedConfig) -> RuleOutcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            check: Box::new(check),
        }
    }
}

impl fmt::Debug for FnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl BusinessRule for FnRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn evaluate(&self, feed: &FeedConfig) -> RuleOutcome {
        (self.check)(feed)
    }
}

// ---------------------------------------------------------------------------
// Reporting types
// ---------------------------------------------------------------------------

/// A rule failure, tagged with the feed it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RuleViolation {
    /// Position of the feed in the document.
    pub feed_index: usize,
    /// The feed's `name`.
    pub feed_name: String,
    /// Id of the failing rule.
    pub rule_id: String,
    /// The rule's failure message.
    pub message: String,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "feed[{}] '{}': [{}] {}",
            self.feed_index, self.feed_name, self.rule_id, self.message
        )
    }
}

/// Id and description of a registered rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    pub id: String,
    pub description: String,
}

impl fmt::Display for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.description)
    }
}
