//! # Sim Risk (L4: Application)
//!
//! Sensitivity and stress analysis over completed simulation runs, plus the
//! persisted-snapshot shape handed to the storage collaborator.
//!
//! This crate provides:
//! - Tornado rankings by rank-correlation attribution or one-at-a-time
//!   perturbation re-runs
//! - Named stress presets and ad hoc parameter overrides, re-executed with
//!   the baseline seed and reported as signed metric deltas
//! - Cancellable perturbation sweeps whose completed runs stay cached under
//!   their own fingerprints
//! - The `RunSnapshot` shape and the `SnapshotStore` port; the engine itself
//!   never performs storage I/O
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             sim_risk (L4)               │
//! ├─────────────────────────────────────────┤
//! │  sensitivity - tornado attribution      │
//! │  stress      - presets, overrides,      │
//! │                baseline deltas          │
//! │  sweep       - cancellable multi-runs   │
//! │  snapshot    - persisted shape + port   │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │            sim_engine (L3)              │
//! │  Monte Carlo kernel and run cache       │
//! └─────────────────────────────────────────┘
//! ```

pub mod error;
pub mod sensitivity;
pub mod snapshot;
pub mod stress;
pub mod sweep;

pub use error::AnalysisError;
pub use sensitivity::{tornado, SensitivityMethod, TornadoEntry};
pub use snapshot::{InMemorySnapshotStore, RunSnapshot, SnapshotStore, StoreError};
pub use stress::{run_stress, MetricsDelta, ParameterOverride, StressReport, StressSpec, StressPreset};
pub use sweep::{preset_sweep, CancellationToken, SweepOutcome};
