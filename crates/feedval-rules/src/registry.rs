//! # Rule Registry
//!
//! An ordered, open collection of [`BusinessRule`]s. The registry is built
//! once at startup and is read-only afterwards; clones share the rule
//! objects.
//!
//! Evaluation runs every rule against every feed and collects all failures.
//! Output order follows feed order, then registry order within a feed.

use std::collections::HashSet;
use std::sync::Arc;

use feedval_core::FeedConfig;
use tracing::{debug, trace};

use crate::builtin::standard_rules;
use crate::error::RuleError;
use crate::rule::{BusinessRule, RuleDescriptor, RuleViolation};

#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Arc<dyn BusinessRule>>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard rule set from [`builtin`](crate::builtin).
    pub fn standard() -> Self {
        Self {
            rules: standard_rules(),
        }
    }

    /// Build a registry from rules in the given order.
    ///
    /// # Errors
    ///
    /// [`RuleError::DuplicateId`] if two rules share an id.
    pub fn from_rules(
        rules: impl IntoIterator<Item = Arc<dyn BusinessRule>>,
    ) -> Result<Self, RuleError> {
        let mut registry = Self::new();
        for rule in rules {
            registry.register_arc(rule)?;
        }
        Ok(registry)
    }

    /// Append a rule.
    ///
    /// # Errors
    ///
    /// [`RuleError::DuplicateId`] if a rule with the same id is registered.
    pub fn register(&mut self, rule: impl BusinessRule + 'static) -> Result<(), RuleError> {
        self.register_arc(Arc::new(rule))
    }

    fn register_arc(&mut self, rule: Arc<dyn BusinessRule>) -> Result<(), RuleError> {
        if self.get(rule.id()).is_some() {
            return Err(RuleError::DuplicateId(rule.id().to_string()));
        }
        self.rules.push(rule);
        Ok(())
    }

    /// A copy of this registry without the named rules.
    ///
    /// # Errors
    ///
    /// [`RuleError::UnknownRules`] listing every id that names no rule, so a
    /// typo in a disable list is not silently ignored.
    pub fn without<S: AsRef<str>>(&self, ids: &[S]) -> Result<Self, RuleError> {
        let unknown: Vec<String> = ids
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| self.get(id).is_none())
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            return Err(RuleError::UnknownRules(unknown));
        }

        let removed: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        Ok(Self {
            rules: self
                .rules
                .iter()
                .filter(|rule| !removed.contains(rule.id()))
                .cloned()
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by id.
    pub fn get(&self, id: &str) -> Option<&Arc<dyn BusinessRule>> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    /// Registered rules in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn BusinessRule>> {
        self.rules.iter()
    }

    /// Ids in evaluation order.
    pub fn ids(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Id and description of every rule, in evaluation order.
    pub fn descriptors(&self) -> Vec<RuleDescriptor> {
        self.rules
            .iter()
            .map(|rule| RuleDescriptor {
                id: rule.id().to_string(),
                description: rule.description().to_string(),
            })
            .collect()
    }

    /// Evaluate every rule against one feed found at `feed_index`.
    pub fn evaluate_feed(&self, feed_index: usize, feed: &FeedConfig) -> Vec<RuleViolation> {
        let violations: Vec<RuleViolation> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let outcome = rule.evaluate(feed);
                trace!(
                    feed = %feed.name,
                    rule = rule.id(),
                    satisfied = outcome.satisfied,
                    "evaluated rule"
                );
                (!outcome.satisfied).then(|| RuleViolation {
                    feed_index,
                    feed_name: feed.name.clone(),
                    rule_id: rule.id().to_string(),
                    message: outcome.message,
                })
            })
            .collect();
        debug!(
            feed_index,
            feed = %feed.name,
            violations = violations.len(),
            "business rules evaluated"
        );
        violations
    }

    /// Evaluate every rule against every `(index, feed)` pair.
    pub fn evaluate<'a>(
        &self,
        feeds: impl IntoIterator<Item = (usize, &'a FeedConfig)>,
    ) -> Vec<RuleViolation> {
        feeds
            .into_iter()
            .flat_map(|(index, feed)| self.evaluate_feed(index, feed))
            .collect()
    }
}
