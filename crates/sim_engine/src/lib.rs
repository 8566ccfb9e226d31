//! # Sim Engine (L3: Monte Carlo Kernel)
//!
//! The simulation kernel: correlated sampling, payoff evaluation and metric
//! aggregation over a validated [`sim_core::RunConfig`].
//!
//! This crate provides:
//! - Deterministic, indexable draw streams (one addressable position per
//!   `(variable, draw index)` pair; no shared mutable RNG state)
//! - Marginal sampling for triangular, normal and log-normal variables
//! - Gaussian-copula dependence with PSD repair and measured fit
//! - Bayesian prior blending ahead of sampling
//! - Per-draw payoff evaluation with game-strategy and cost-of-risk terms
//! - EV / VaR / CVaR / economic capital / RAROC / CARA utility aggregation
//! - A fingerprint-keyed, single-flight run cache
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            sim_engine (L3)              │
//! ├─────────────────────────────────────────┤
//! │  rng      - indexable ChaCha streams    │
//! │  sample   - marginal draws              │
//! │  bayes    - prior blending              │
//! │  copula   - dependence imposition       │
//! │  payoff   - per-draw option outcomes    │
//! │  metrics  - distribution reduction      │
//! │  run      - orchestration               │
//! │  cache    - single-flight by fingerprint│
//! └─────────────────────────────────────────┘
//!          ↓
//!     sim_core (L1: types, validation, math)
//! ```
//!
//! ## Example
//!
//! ```
//! use sim_core::{Distribution, RunConfig, VariableRole};
//! use sim_engine::Simulator;
//!
//! let config = RunConfig::builder()
//!     .seed(42)
//!     .run_count(10_000)
//!     .horizon_months(12)
//!     .option("a", "Option A", 50.0, 100.0)
//!     .variable(
//!         "cost-shock",
//!         Distribution::Normal { mean: 0.05, sd: 0.03 },
//!         VariableRole::Cost,
//!         50.0,
//!     )
//!     .build()
//!     .unwrap();
//!
//! let artifacts = Simulator::new(config).unwrap().run();
//! let metrics = &artifacts.outcome.metrics[0];
//! assert!(metrics.ev > 40.0 && metrics.ev < 55.0);
//! ```

pub mod bayes;
pub mod cache;
pub mod copula;
pub mod error;
pub mod metrics;
pub mod payoff;
pub mod rng;
pub mod run;
pub mod sample;

pub use cache::RunCache;
pub use error::EngineError;
pub use run::{DrawTable, OutcomeSeries, RunArtifacts, Simulator};
