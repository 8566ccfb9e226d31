//! Error types for structured error handling.
//!
//! This module provides:
//! - `ConfigError`: configuration rejected before any sampling starts
//! - `DegeneracyNotice`: informational notices attached to results when a
//!   metric fell back to a documented degenerate-case value
//!
//! Configuration errors always name the offending field so callers can point
//! the user at the exact input that failed. Degeneracies are never fatal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Categorised configuration errors.
///
/// Every variant names the field (and where relevant the variable or option)
/// that failed validation. A config that produces any of these has executed
/// nothing: validation happens strictly before sampling.
///
/// # Examples
/// ```
/// use sim_core::ConfigError;
///
/// let err = ConfigError::InvalidRunCount(50);
/// assert!(err.to_string().contains("run_count"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Run count outside the supported range [100, 100_000].
    #[error("run_count {0} outside valid range [100, 100000]")]
    InvalidRunCount(usize),

    /// Horizon outside the supported range [1, 240] months.
    #[error("horizon_months {0} outside valid range [1, 240]")]
    InvalidHorizon(u32),

    /// A run needs at least one decision option.
    #[error("options: at least one decision option is required")]
    NoOptions,

    /// Duplicate option identifier.
    #[error("options: duplicate option id '{0}'")]
    DuplicateOptionId(String),

    /// Duplicate scenario-variable identifier.
    #[error("variables: duplicate variable id '{0}'")]
    DuplicateVariableId(String),

    /// Distribution parameters are internally inconsistent.
    #[error("variable '{variable}': {reason}")]
    InvalidDistribution {
        /// Variable whose distribution failed validation.
        variable: String,
        /// What was wrong with the parameters.
        reason: String,
    },

    /// Scenario-variable weight must be strictly positive and finite.
    #[error("variable '{variable}': weight {weight} must be positive and finite")]
    InvalidWeight {
        /// Variable with the bad weight.
        variable: String,
        /// The rejected weight.
        weight: f64,
    },

    /// Dependence configuration failed shape or range validation.
    #[error("dependence: {0}")]
    InvalidDependence(String),

    /// Bayesian prior override failed validation.
    #[error("prior for variable '{variable}': {reason}")]
    InvalidPrior {
        /// Variable the prior targets.
        variable: String,
        /// What was wrong with the prior.
        reason: String,
    },

    /// Game strategy references an unknown option.
    #[error("game: strategy references unknown option id '{0}'")]
    UnknownGameOption(String),

    /// Game strategy parameter out of range.
    #[error("game strategy for option '{option}': {reason}")]
    InvalidGameStrategy {
        /// Option carrying the bad strategy.
        option: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Utility parameters out of range.
    #[error("utility: {0}")]
    InvalidUtility(String),

    /// Total-cost-of-risk parameters out of range.
    #[error("tcor: {0}")]
    InvalidTcor(String),
}

/// Kind of numeric degeneracy recovered via a documented fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegeneracyKind {
    /// Economic capital was zero; RAROC fell back to horizon-scaled EV
    /// (capital treated as one unit).
    ZeroEconomicCapital,
    /// Risk aversion was zero; the certainty equivalent equals EV.
    ZeroRiskAversion,
}

impl DegeneracyKind {
    /// Human-readable description of the fallback that was applied.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ZeroEconomicCapital => {
                "economic capital is zero; RAROC reported as horizon-scaled EV per unit capital"
            }
            Self::ZeroRiskAversion => {
                "risk aversion is zero; certainty equivalent reported as EV"
            }
        }
    }
}

/// Informational notice attached to a run result.
///
/// Notices report recovered degeneracies. They are part of the result, not a
/// failure: downstream consumers surface them alongside the metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegeneracyNotice {
    /// Option the notice applies to.
    pub option_id: String,
    /// What degenerated and how it was recovered.
    pub kind: DegeneracyKind,
}

impl DegeneracyNotice {
    /// Create a notice for the given option.
    pub fn new(option_id: impl Into<String>, kind: DegeneracyKind) -> Self {
        Self {
            option_id: option_id.into(),
            kind,
        }
    }
}
