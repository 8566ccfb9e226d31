//! Result types produced by a simulation run.
//!
//! A run yields one [`OptionMetrics`] per decision option plus a
//! [`RunMetadata`] describing what the engine actually did: how far the
//! dependence matrix had to be repaired, which priors were blended, and any
//! degeneracy notices. Results are produced once and never mutated.

use serde::{Deserialize, Serialize};

use super::error::DegeneracyNotice;

/// Mean total cost of risk per component, horizon-scaled like the metrics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TcorComponents {
    /// Expected loss (scaled by the loss driver where configured).
    pub expected_loss: f64,
    /// Insurance premium.
    pub insurance: f64,
    /// Contingency reserve.
    pub contingency: f64,
    /// Option mitigation spend.
    pub mitigation: f64,
}

impl TcorComponents {
    /// Sum of all components.
    #[inline]
    pub fn total(&self) -> f64 {
        self.expected_loss + self.insurance + self.contingency + self.mitigation
    }
}

/// Risk-adjusted metrics for one decision option.
///
/// Flow metrics (`ev`, `var95`, `cvar95`, `tcor`) are scaled by
/// `horizon_months / 12`; `economic_capital` is scaled by the square root of
/// that factor, so `raroc = ev / economic_capital` follows the
/// `EV x h / (capital x sqrt(h))` convention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionMetrics {
    /// Option identifier.
    pub option_id: String,
    /// Option display label.
    pub option_label: String,
    /// Horizon the metrics are scaled to.
    pub horizon_months: u32,
    /// Expected value of the outcome distribution.
    pub ev: f64,
    /// Value at risk at the 95% level: the 5th percentile of outcomes,
    /// linearly interpolated between order statistics.
    pub var95: f64,
    /// Conditional value at risk: mean of outcomes at or below `var95`.
    pub cvar95: f64,
    /// Capital at risk under the configured convention.
    pub economic_capital: f64,
    /// Risk-adjusted return on capital.
    pub raroc: f64,
    /// CARA certainty equivalent, when utility parameters were supplied.
    pub certainty_equivalent: Option<f64>,
    /// Mean CARA utility, when utility parameters were supplied.
    pub expected_utility: Option<f64>,
    /// Mean total cost of risk, when TCOR parameters were supplied.
    pub tcor: Option<f64>,
    /// TCOR component breakdown, when TCOR parameters were supplied.
    pub tcor_components: Option<TcorComponents>,
    /// Standard error of the EV estimate.
    pub std_error: f64,
}

impl OptionMetrics {
    /// Returns the 95% confidence interval half-width of the EV estimate.
    #[inline]
    pub fn confidence_95(&self) -> f64 {
        1.96 * self.std_error
    }

    /// Returns the 99% confidence interval half-width of the EV estimate.
    #[inline]
    pub fn confidence_99(&self) -> f64 {
        2.576 * self.std_error
    }
}

/// Fit quality of the dependence structure actually imposed.
///
/// The requested matrix is repaired to the nearest positive semi-definite
/// correlation matrix before use; `repair_frobenius` is the Frobenius norm of
/// the adjustment (zero when the input was already PSD). The achieved
/// Spearman correlation is measured from the generated sample, never assumed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DependenceFit {
    /// Variables the matrices range over, in configuration order.
    pub variable_ids: Vec<String>,
    /// Frobenius norm of (requested − repaired).
    pub repair_frobenius: f64,
    /// Row-major rank correlation measured empirically from the sample.
    pub achieved_spearman: Vec<f64>,
}

impl DependenceFit {
    /// Achieved Spearman correlation between two configured variables.
    pub fn achieved(&self, a: &str, b: &str) -> Option<f64> {
        let n = self.variable_ids.len();
        let i = self.variable_ids.iter().position(|v| v == a)?;
        let j = self.variable_ids.iter().position(|v| v == b)?;
        self.achieved_spearman.get(i * n + j).copied()
    }
}

/// Record of one Bayesian prior blend, kept for audit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppliedPrior {
    /// Variable the prior was blended into.
    pub variable_id: String,
    /// Prior location.
    pub prior_mean: f64,
    /// Prior spread.
    pub prior_sd: f64,
    /// Configured location before blending.
    pub original_mean: f64,
    /// Configured spread before blending.
    pub original_sd: f64,
    /// Precision-weighted location used for sampling.
    pub effective_mean: f64,
    /// Precision-weighted spread used for sampling.
    pub effective_sd: f64,
}

/// Everything the engine reports about a run besides the metrics themselves.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Dependence repair magnitude and achieved correlation, when configured.
    pub dependence_fit: Option<DependenceFit>,
    /// Prior blends applied before sampling.
    pub applied_priors: Vec<AppliedPrior>,
    /// Recovered numeric degeneracies.
    pub notices: Vec<DegeneracyNotice>,
}

/// Immutable result of one simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Canonical fingerprint of the configuration that produced this result.
    pub fingerprint: String,
    /// One entry per decision option, in configuration order.
    pub metrics: Vec<OptionMetrics>,
    /// Fit, audit and notice metadata.
    pub metadata: RunMetadata,
}

impl RunOutcome {
    /// Looks up metrics by option id.
    pub fn metrics_for(&self, option_id: &str) -> Option<&OptionMetrics> {
        self.metrics.iter().find(|m| m.option_id == option_id)
    }
}
