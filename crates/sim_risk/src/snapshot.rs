//! Persisted snapshot shape and storage port.
//!
//! The engine produces and consumes in-memory values only; persistence is an
//! external collaborator behind [`SnapshotStore`]. [`RunSnapshot`] is the
//! shape that collaborator stores: run identity, the inputs that matter for
//! audit (seed, run count, horizon, applied priors, achieved correlation)
//! and the metrics keyed by option id.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sim_core::{AppliedPrior, OptionMetrics, RunConfig, RunOutcome};

/// Snapshot of one completed run, as handed to the storage collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// `"run-"` followed by the 64-hex-char fingerprint.
    pub run_id: String,
    /// Identifier of the decision this run belongs to.
    pub decision_id: String,
    /// Seed the run used.
    pub seed: u64,
    /// Number of Monte Carlo draws.
    pub runs: usize,
    /// Horizon in months.
    pub horizon_months: u32,
    /// Achieved Spearman matrix (row-major over the dependence block), when
    /// dependence was configured.
    pub achieved_spearman: Option<Vec<f64>>,
    /// Prior blends applied before sampling.
    pub bayes: Vec<AppliedPrior>,
    /// Metrics keyed by option id; `BTreeMap` keeps the serialised order
    /// stable.
    pub metrics_by_option: BTreeMap<String, OptionMetrics>,
}

impl RunSnapshot {
    /// Builds the snapshot for a completed run.
    pub fn new(decision_id: impl Into<String>, config: &RunConfig, outcome: &RunOutcome) -> Self {
        Self {
            run_id: format!("run-{}", outcome.fingerprint),
            decision_id: decision_id.into(),
            seed: config.seed,
            runs: config.run_count,
            horizon_months: config.horizon_months,
            achieved_spearman: outcome
                .metadata
                .dependence_fit
                .as_ref()
                .map(|fit| fit.achieved_spearman.clone()),
            bayes: outcome.metadata.applied_priors.clone(),
            metrics_by_option: outcome
                .metrics
                .iter()
                .map(|m| (m.option_id.clone(), m.clone()))
                .collect(),
        }
    }
}

/// Storage-port failure.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("snapshot store: {0}")]
pub struct StoreError(pub String);

/// Port to whatever persists snapshots.
///
/// Implementations live outside this workspace's core; the engine only
/// produces [`RunSnapshot`] values and reads them back through this trait.
pub trait SnapshotStore {
    /// Persists a snapshot, replacing any snapshot with the same `run_id`.
    fn save(&mut self, snapshot: &RunSnapshot) -> Result<(), StoreError>;

    /// Loads a snapshot by `run_id`.
    fn load(&self, run_id: &str) -> Result<Option<RunSnapshot>, StoreError>;
}

/// In-memory store for tests and single-process embedding.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    snapshots: HashMap<String, RunSnapshot>,
}

impl InMemorySnapshotStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn save(&mut self, snapshot: &RunSnapshot) -> Result<(), StoreError> {
        self.snapshots
            .insert(snapshot.run_id.clone(), snapshot.clone());
        Ok(())
    }

    fn load(&self, run_id: &str) -> Result<Option<RunSnapshot>, StoreError> {
        Ok(self.snapshots.get(run_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{DependenceConfig, Distribution, VariableRole};
    use sim_engine::Simulator;

    fn run() -> (RunConfig, RunOutcome) {
        let config = RunConfig::builder()
            .seed(42)
            .run_count(500)
            .horizon_months(18)
            .option("a", "Option A", 50.0, 100.0)
            .option("b", "Option B", 30.0, 60.0)
            .variable(
                "x",
                Distribution::Normal { mean: 0.0, sd: 1.0 },
                VariableRole::Return,
                1.0,
            )
            .variable(
                "y",
                Distribution::Normal { mean: 0.0, sd: 1.0 },
                VariableRole::Cost,
                1.0,
            )
            .dependence(DependenceConfig::pair("x", "y", 0.5))
            .build()
            .unwrap();
        let outcome = Simulator::new(config.clone()).unwrap().run().outcome;
        (config, outcome)
    }

    #[test]
    fn snapshot_mirrors_the_run() {
        let (config, outcome) = run();
        let snapshot = RunSnapshot::new("decision-7", &config, &outcome);

        assert_eq!(snapshot.run_id, format!("run-{}", outcome.fingerprint));
        assert_eq!(snapshot.decision_id, "decision-7");
        assert_eq!(snapshot.seed, 42);
        assert_eq!(snapshot.runs, 500);
        assert_eq!(snapshot.horizon_months, 18);
        assert!(snapshot.achieved_spearman.is_some());
        assert_eq!(snapshot.metrics_by_option.len(), 2);
        assert!(snapshot.metrics_by_option.contains_key("a"));
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let (config, outcome) = run();
        let snapshot = RunSnapshot::new("decision-7", &config, &outcome);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: RunSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn in_memory_store_saves_and_loads() {
        let (config, outcome) = run();
        let snapshot = RunSnapshot::new("decision-7", &config, &outcome);

        let mut store = InMemorySnapshotStore::new();
        store.save(&snapshot).unwrap();
        assert_eq!(store.len(), 1);

        let loaded = store.load(&snapshot.run_id).unwrap();
        assert_eq!(loaded, Some(snapshot));
        assert_eq!(store.load("run-missing").unwrap(), None);
    }
}
