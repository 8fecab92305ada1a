//! Structured error types for the pwrkit crates.

use thiserror::Error;

/// Unified error type for all pwrkit operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PwrError {
    /// Caller violated an input contract (wrong number of unknowns,
    /// out-of-range probability, mismatched vector lengths, unknown name).
    #[error("validation error: {0}")]
    Validation(String),

    /// A derived quantity is invalid for the formula being evaluated
    /// (effect size sign vs. alternative, non-positive degrees of freedom).
    #[error("domain error: {0}")]
    Domain(String),

    /// Root finding could not bracket or converge within its caps.
    #[error("convergence error: {0}")]
    Convergence(String),
}

impl PwrError {
    /// Whether this is an input-contract violation.
    pub fn is_validation(&self) -> bool {
        matches!(self, PwrError::Validation(_))
    }

    /// Whether this is a domain failure of a derived quantity.
    pub fn is_domain(&self) -> bool {
        matches!(self, PwrError::Domain(_))
    }

    /// Whether the inputs were well-formed but jointly infeasible.
    pub fn is_convergence(&self) -> bool {
        matches!(self, PwrError::Convergence(_))
    }
}

/// Convenience alias used throughout the pwrkit crates.
pub type Result<T> = std::result::Result<T, PwrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_class_prefix() {
        let e = PwrError::Validation("sig_level must be between 0 and 1".into());
        assert_eq!(e.to_string(), "validation error: sig_level must be between 0 and 1");
        let e = PwrError::Convergence("no sign change".into());
        assert!(e.to_string().starts_with("convergence error"));
    }

    #[test]
    fn class_predicates() {
        assert!(PwrError::Validation(String::new()).is_validation());
        assert!(PwrError::Domain(String::new()).is_domain());
        assert!(PwrError::Convergence(String::new()).is_convergence());
        assert!(!PwrError::Domain(String::new()).is_validation());
    }
}
