//! Stress testing against a baseline run.
//!
//! A stress re-executes the full pipeline with the baseline seed and run
//! count under a perturbed configuration, then reports the signed delta of
//! every metric per option. Perturbations come either from a named preset or
//! from ad hoc [`ParameterOverride`]s.

use serde::{Deserialize, Serialize};
use tracing::debug;

use sim_core::{OptionMetrics, RunConfig, RunOutcome};
use sim_engine::Simulator;

use crate::error::AnalysisError;

/// A single parameter perturbation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterOverride {
    /// Shift a variable's location by an absolute delta (log-space for
    /// log-normals).
    ShiftLocation {
        /// Target variable.
        variable_id: String,
        /// Location shift.
        delta: f64,
    },
    /// Scale a variable's spread.
    ScaleSpread {
        /// Target variable.
        variable_id: String,
        /// Spread multiplier.
        factor: f64,
    },
    /// Scale a variable's weight.
    ScaleWeight {
        /// Target variable.
        variable_id: String,
        /// Weight multiplier.
        factor: f64,
    },
    /// Scale all off-diagonal dependence entries toward ±1, clamped to
    /// ±0.99. A no-op without a dependence configuration.
    TightenCorrelations {
        /// Off-diagonal multiplier.
        factor: f64,
    },
}

/// Named stress presets.
///
/// Presets expand against a concrete configuration: role-targeted shifts are
/// expressed in units of each variable's own spread.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressPreset {
    /// Cost variables shift up by one spread.
    CostSurge,
    /// Return variables shift down by one spread.
    DemandErosion,
    /// Every variable's spread scales by 1.5.
    VolatilitySpike,
    /// Dependence off-diagonals scale by 1.25 toward ±1.
    CorrelationTightening,
    /// Demand erosion plus cost surge plus a 1.25 volatility scale.
    Downturn,
}

impl StressPreset {
    /// All presets, in reporting order.
    pub fn all() -> Vec<Self> {
        vec![
            Self::CostSurge,
            Self::DemandErosion,
            Self::VolatilitySpike,
            Self::CorrelationTightening,
            Self::Downturn,
        ]
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CostSurge => "Cost Surge",
            Self::DemandErosion => "Demand Erosion",
            Self::VolatilitySpike => "Volatility Spike",
            Self::CorrelationTightening => "Correlation Tightening",
            Self::Downturn => "Downturn",
        }
    }

    /// Description of the perturbation.
    pub fn description(&self) -> &'static str {
        match self {
            Self::CostSurge => "Cost-side variables shift up by one spread",
            Self::DemandErosion => "Return-side variables shift down by one spread",
            Self::VolatilitySpike => "All variable spreads scale by 1.5",
            Self::CorrelationTightening => "Dependence entries scale by 1.25 toward ±1",
            Self::Downturn => "Demand erosion, cost surge and a 1.25 volatility scale combined",
        }
    }

    /// Expands the preset into concrete overrides for `config`.
    pub fn overrides(&self, config: &RunConfig) -> Vec<ParameterOverride> {
        use sim_core::VariableRole;
        let shift_role = |role: VariableRole, direction: f64| -> Vec<ParameterOverride> {
            config
                .variables
                .iter()
                .filter(|v| v.applies_to == role)
                .map(|v| ParameterOverride::ShiftLocation {
                    variable_id: v.id.clone(),
                    delta: direction * v.distribution.spread(),
                })
                .collect()
        };
        let scale_all = |factor: f64| -> Vec<ParameterOverride> {
            config
                .variables
                .iter()
                .map(|v| ParameterOverride::ScaleSpread {
                    variable_id: v.id.clone(),
                    factor,
                })
                .collect()
        };

        match self {
            Self::CostSurge => shift_role(VariableRole::Cost, 1.0),
            Self::DemandErosion => shift_role(VariableRole::Return, -1.0),
            Self::VolatilitySpike => scale_all(1.5),
            Self::CorrelationTightening => {
                vec![ParameterOverride::TightenCorrelations { factor: 1.25 }]
            }
            Self::Downturn => {
                let mut overrides = shift_role(VariableRole::Return, -1.0);
                overrides.extend(shift_role(VariableRole::Cost, 1.0));
                overrides.extend(scale_all(1.25));
                overrides
            }
        }
    }
}

/// What to stress: a named preset or an ad hoc override list.
#[derive(Clone, Debug, PartialEq)]
pub enum StressSpec {
    /// A named preset.
    Preset(StressPreset),
    /// Caller-supplied overrides under a caller-supplied name.
    AdHoc {
        /// Report label.
        name: String,
        /// Overrides to apply.
        overrides: Vec<ParameterOverride>,
    },
}

impl StressSpec {
    fn name(&self) -> String {
        match self {
            Self::Preset(preset) => preset.name().to_string(),
            Self::AdHoc { name, .. } => name.clone(),
        }
    }

    fn overrides(&self, config: &RunConfig) -> Vec<ParameterOverride> {
        match self {
            Self::Preset(preset) => preset.overrides(config),
            Self::AdHoc { overrides, .. } => overrides.clone(),
        }
    }
}

/// Signed metric deltas (stressed − baseline) for one option.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsDelta {
    /// Option the deltas belong to.
    pub option_id: String,
    /// EV delta.
    pub ev: f64,
    /// VaR95 delta.
    pub var95: f64,
    /// CVaR95 delta.
    pub cvar95: f64,
    /// Economic-capital delta.
    pub economic_capital: f64,
    /// RAROC delta.
    pub raroc: f64,
    /// Certainty-equivalent delta, when present on both sides.
    pub certainty_equivalent: Option<f64>,
    /// Expected-utility delta, when present on both sides.
    pub expected_utility: Option<f64>,
    /// TCOR delta, when present on both sides.
    pub tcor: Option<f64>,
}

impl MetricsDelta {
    /// Delta between matching baseline and stressed metrics.
    pub fn between(baseline: &OptionMetrics, stressed: &OptionMetrics) -> Self {
        let opt = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => Some(b - a),
            _ => None,
        };
        Self {
            option_id: baseline.option_id.clone(),
            ev: stressed.ev - baseline.ev,
            var95: stressed.var95 - baseline.var95,
            cvar95: stressed.cvar95 - baseline.cvar95,
            economic_capital: stressed.economic_capital - baseline.economic_capital,
            raroc: stressed.raroc - baseline.raroc,
            certainty_equivalent: opt(baseline.certainty_equivalent, stressed.certainty_equivalent),
            expected_utility: opt(baseline.expected_utility, stressed.expected_utility),
            tcor: opt(baseline.tcor, stressed.tcor),
        }
    }
}

/// Baseline-versus-stressed comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StressReport {
    /// Preset or ad hoc name.
    pub name: String,
    /// Fingerprint of the baseline run.
    pub baseline_fingerprint: String,
    /// Fingerprint of the stressed run.
    pub stressed_fingerprint: String,
    /// Full stressed result.
    pub stressed: RunOutcome,
    /// Per-option signed deltas, in baseline option order.
    pub deltas: Vec<MetricsDelta>,
}

/// Applies overrides to a configuration, leaving the seed and run count
/// untouched.
///
/// # Errors
///
/// [`AnalysisError::UnknownVariable`] when an override targets a variable
/// that does not exist.
pub fn apply_overrides(
    config: &RunConfig,
    overrides: &[ParameterOverride],
) -> Result<RunConfig, AnalysisError> {
    let mut stressed = config.clone();
    for o in overrides {
        match o {
            ParameterOverride::ShiftLocation { variable_id, delta } => {
                let var = lookup(&mut stressed, variable_id)?;
                var.distribution = var.distribution.shift_location(*delta);
            }
            ParameterOverride::ScaleSpread {
                variable_id,
                factor,
            } => {
                let var = lookup(&mut stressed, variable_id)?;
                var.distribution = var.distribution.scale_spread(*factor);
            }
            ParameterOverride::ScaleWeight {
                variable_id,
                factor,
            } => {
                let var = lookup(&mut stressed, variable_id)?;
                var.weight *= factor;
            }
            ParameterOverride::TightenCorrelations { factor } => {
                if let Some(dep) = &mut stressed.dependence {
                    let n = dep.variable_ids.len();
                    for i in 0..n {
                        for j in 0..n {
                            if i != j {
                                let v = dep.matrix[i * n + j] * factor;
                                dep.matrix[i * n + j] = v.clamp(-0.99, 0.99);
                            }
                        }
                    }
                }
            }
        }
    }
    Ok(stressed)
}

fn lookup<'a>(
    config: &'a mut RunConfig,
    variable_id: &str,
) -> Result<&'a mut sim_core::ScenarioVariable, AnalysisError> {
    config
        .variables
        .iter_mut()
        .find(|v| v.id == variable_id)
        .ok_or_else(|| AnalysisError::UnknownVariable(variable_id.to_string()))
}

/// Runs one stress against a baseline and reports every metric's signed
/// delta.
///
/// The stressed run keeps the baseline seed and run count, so deltas isolate
/// the perturbation rather than sampling noise.
pub fn run_stress(
    config: &RunConfig,
    baseline: &RunOutcome,
    spec: &StressSpec,
) -> Result<StressReport, AnalysisError> {
    let overrides = spec.overrides(config);
    let stressed_config = apply_overrides(config, &overrides)?;
    let simulator = Simulator::new(stressed_config)?;
    debug!(
        stress = %spec.name(),
        fingerprint = %simulator.fingerprint(),
        "executing stress run"
    );
    let stressed = simulator.run().outcome;

    let deltas = baseline
        .metrics
        .iter()
        .filter_map(|base| {
            stressed
                .metrics_for(&base.option_id)
                .map(|s| MetricsDelta::between(base, s))
        })
        .collect();

    Ok(StressReport {
        name: spec.name(),
        baseline_fingerprint: baseline.fingerprint.clone(),
        stressed_fingerprint: stressed.fingerprint.clone(),
        stressed,
        deltas,
    })
}
