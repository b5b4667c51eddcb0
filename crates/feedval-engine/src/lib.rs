//! # feedval-engine — Validation Orchestrator
//!
//! Composes the two validation layers into a single [`Verdict`]:
//!
//! 1. Validate the document against the schema (`feedval-schema`).
//! 2. If any Error-severity violation exists, stop: the verdict carries the
//!    structural errors and the business rules are never invoked.
//! 3. Otherwise decode the document into typed feeds (`feedval-core`) and
//!    run every registered rule against every feed (`feedval-rules`).
//! 4. Rule failures join `errors`. Schema warnings are kept in `warnings`
//!    whatever the outcome of step 2.
//!
//! The free function [`run`] is the whole algorithm. [`ValidationEngine`]
//! packages a schema and a registry as shared, immutable configuration and
//! adds [`validate_batch`](ValidationEngine::validate_batch) for validating
//! many documents on a `rayon` pool.
//!
//! ## Crate Policy
//!
//! - No I/O. Documents arrive already parsed.
//! - A verdict is a pure function of (schema, rules, document).

pub mod engine;
pub mod error;
pub mod verdict;

pub use engine::{run, EngineSettings, ValidationEngine};
pub use error::EngineError;
pub use verdict::Verdict;
