//! # feedval-rules — Business Rule Layer
//!
//! The second validation layer. Evaluates cross-field policy predicates
//! that a structural schema cannot express ("if compression is gzip, the
//! size limit must be at most 100 MiB") over decoded [`FeedConfig`]
//! entries.
//!
//! ## Rules
//!
//! A rule is any [`BusinessRule`] implementation: a stable id, a
//! description, and `evaluate(&FeedConfig) -> RuleOutcome`. Closures are
//! adapted with [`FnRule`]. The standard rule set lives in [`builtin`].
//!
//! ## Registry
//!
//! [`RuleRegistry`] is an ordered, open collection of rules. Every rule is
//! evaluated against every feed; failures are collected, never
//! short-circuited, and tagged with the feed's index and name as
//! [`RuleViolation`]s. Adding or removing a rule never touches the
//! evaluation loop.
//!
//! ## Precondition
//!
//! Rules assume the document already passed the structural layer. The
//! orchestrator in `feedval-engine` enforces that ordering.
//!
//! [`FeedConfig`]: feedval_core::FeedConfig

pub mod builtin;
pub mod error;
pub mod registry;
pub mod rule;

pub use error::RuleError;
pub use registry::RuleRegistry;
pub use rule::{BusinessRule, FnRule, RuleDescriptor, RuleOutcome, RuleViolation};
