//! # Verdict
//!
//! The aggregated result of validating one document.

use serde::Serialize;

/// Pass/fail result of validating one document.
///
/// `valid` is true iff `errors` is empty. Warnings never affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the document passed both layers.
    pub valid: bool,
    /// Structural errors, or decode errors and rule failures, in document order.
    pub errors: Vec<String>,
    /// Schema warnings.
    pub warnings: Vec<String>,
    /// Whether the business-rule layer ran.
    pub rules_evaluated: bool,
    /// Number of feeds decoded and handed to the rule layer.
    pub feeds_decoded: usize,
}

impl Default for Verdict {
    fn default() -> Self {
        Self::ok()
    }
}

impl Verdict {
    /// A passing verdict with nothing recorded yet.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            rules_evaluated: false,
            feeds_decoded: 0,
        }
    }

    /// Add an error. Marks the verdict invalid.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.valid = false;
        self.errors.push(error.into());
    }

    /// Add a warning (does not affect validity).
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Whether the verdict counts as a pass, optionally treating warnings
    /// as failures.
    pub fn passes(&self, deny_warnings: bool) -> bool {
        self.valid && !(deny_warnings && !self.warnings.is_empty())
    }
}
