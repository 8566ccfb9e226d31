//! Cancellable multi-run stress sweeps.
//!
//! A sweep executes several independent stress runs against one baseline.
//! Cancellation is cooperative and checked between runs, never mid-draw, so
//! every completed run remains valid and stays cached under its own
//! fingerprint; a cancelled sweep returns the reports it finished together
//! with a flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;

use sim_core::RunConfig;
use sim_engine::{RunArtifacts, RunCache};

use crate::error::AnalysisError;
use crate::stress::{apply_overrides, MetricsDelta, StressPreset, StressReport, StressSpec};

/// Cooperative cancellation signal shared between a sweep and its caller.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; the sweep stops before its next run.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Result of a (possibly cancelled) sweep.
#[derive(Clone, Debug)]
pub struct SweepOutcome {
    /// Reports for the runs that completed, in request order.
    pub reports: Vec<StressReport>,
    /// Whether the sweep stopped early on a cancellation request.
    pub cancelled: bool,
}

/// Runs a preset sweep against a baseline, caching every stressed run.
///
/// Each preset re-executes the pipeline with the baseline seed and run
/// count through `cache`, so an identical stress requested later (or
/// concurrently) reuses the completed computation. The token is consulted
/// between runs only.
pub fn preset_sweep(
    config: &RunConfig,
    baseline: &RunArtifacts,
    presets: &[StressPreset],
    cache: &RunCache,
    token: &CancellationToken,
) -> Result<SweepOutcome, AnalysisError> {
    let mut reports = Vec::with_capacity(presets.len());

    for preset in presets {
        if token.is_cancelled() {
            info!(
                completed = reports.len(),
                requested = presets.len(),
                "stress sweep cancelled between runs"
            );
            return Ok(SweepOutcome {
                reports,
                cancelled: true,
            });
        }

        let spec = StressSpec::Preset(*preset);
        let stressed_config = apply_overrides(config, &preset.overrides(config))?;
        let artifacts = cache
            .get_or_run(&stressed_config)
            .map_err(AnalysisError::from)?;

        let deltas: Vec<MetricsDelta> = baseline
            .outcome
            .metrics
            .iter()
            .filter_map(|base| {
                artifacts
                    .outcome
                    .metrics_for(&base.option_id)
                    .map(|s| MetricsDelta::between(base, s))
            })
            .collect();

        reports.push(StressReport {
            name: match &spec {
                StressSpec::Preset(p) => p.name().to_string(),
                StressSpec::AdHoc { name, .. } => name.clone(),
            },
            baseline_fingerprint: baseline.outcome.fingerprint.clone(),
            stressed_fingerprint: artifacts.outcome.fingerprint.clone(),
            stressed: artifacts.outcome.clone(),
            deltas,
        });
    }

    Ok(SweepOutcome {
        reports,
        cancelled: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_core::{Distribution, VariableRole};
    use sim_engine::Simulator;

    fn config() -> RunConfig {
        RunConfig::builder()
            .seed(42)
            .run_count(1_000)
            .horizon_months(12)
            .option("a", "Option A", 50.0, 100.0)
            .variable(
                "demand",
                Distribution::Normal { mean: 0.0, sd: 4.0 },
                VariableRole::Return,
                1.0,
            )
            .variable(
                "fuel",
                Distribution::Normal { mean: 0.0, sd: 2.0 },
                VariableRole::Cost,
                1.0,
            )
            .build()
            .unwrap()
    }

    #[test]
    fn full_sweep_reports_every_preset() {
        let config = config();
        let baseline = Simulator::new(config.clone()).unwrap().run();
        let cache = RunCache::new();
        let outcome = preset_sweep(
            &config,
            &baseline,
            &StressPreset::all(),
            &cache,
            &CancellationToken::new(),
        )
        .unwrap();

        assert!(!outcome.cancelled);
        assert_eq!(outcome.reports.len(), 5);
        // Every stressed run is retained in the cache under its own
        // fingerprint.
        for report in &outcome.reports {
            assert!(cache.contains(&report.stressed_fingerprint));
        }
    }

    #[test]
    fn cancelled_token_stops_before_the_first_run() {
        let config = config();
        let baseline = Simulator::new(config.clone()).unwrap().run();
        let cache = RunCache::new();
        let token = CancellationToken::new();
        token.cancel();

        let outcome =
            preset_sweep(&config, &baseline, &StressPreset::all(), &cache, &token).unwrap();
        assert!(outcome.cancelled);
        assert!(outcome.reports.is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn repeated_sweep_reuses_cached_runs() {
        let config = config();
        let baseline = Simulator::new(config.clone()).unwrap().run();
        let cache = RunCache::new();
        let token = CancellationToken::new();

        let first = preset_sweep(&config, &baseline, &StressPreset::all(), &cache, &token).unwrap();
        let cached_len = cache.len();
        let second =
            preset_sweep(&config, &baseline, &StressPreset::all(), &cache, &token).unwrap();

        assert_eq!(cache.len(), cached_len, "second sweep must not recompute");
        assert_eq!(first.reports.len(), second.reports.len());
        for (a, b) in first.reports.iter().zip(&second.reports) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
