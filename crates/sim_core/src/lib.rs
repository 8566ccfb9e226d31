//! # Sim Core (L1: Foundation)
//!
//! Domain types, configuration validation, run fingerprinting and the
//! numerical utilities shared by the simulation engine and risk layers.
//!
//! This crate provides:
//! - Scenario variables with triangular, normal and log-normal distributions
//! - Decision options, dependence, Bayesian prior, game and cost-of-risk
//!   configuration as closed tagged variants
//! - `RunConfig` with builder-style construction and field-specific validation
//! - Canonical SHA-256 run fingerprints for caching and audit identity
//! - Statistics (interpolated percentiles, Spearman rank correlation),
//!   the standard normal CDF, and correlation-matrix algebra
//!   (Cholesky, nearest-PSD repair)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             sim_core (L1)               │
//! ├─────────────────────────────────────────┤
//! │  types/       - config, results, errors │
//! │  fingerprint  - canonical SHA-256 id    │
//! │  math/        - stats, norm, matrix     │
//! └─────────────────────────────────────────┘
//!          ↑
//!   sim_engine (L3), sim_risk (L4)
//! ```

pub mod fingerprint;
pub mod math;
pub mod types;

pub use fingerprint::RunFingerprint;
pub use types::config::{
    BayesianPriorOverride, CapitalConvention, DecisionOption, DependenceConfig, Distribution,
    GameInteractionConfig, OptionGameStrategy, RunConfig, RunConfigBuilder, ScenarioVariable,
    TcorParams, UtilityParams, VariableRole, MAX_HORIZON_MONTHS, MAX_RUN_COUNT,
    MIN_HORIZON_MONTHS, MIN_RUN_COUNT,
};
pub use types::error::{ConfigError, DegeneracyKind, DegeneracyNotice};
pub use types::result::{
    AppliedPrior, DependenceFit, OptionMetrics, RunMetadata, RunOutcome, TcorComponents,
};
