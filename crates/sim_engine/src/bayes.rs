//! Bayesian prior blending.
//!
//! Applied priors replace a variable's location and spread with the
//! precision-weighted (inverse-variance) blend of prior and configured
//! parameters:
//!
//! ```text
//! mean' = (m_p / s_p^2 + m_v / s_v^2) / (1 / s_p^2 + 1 / s_v^2)
//! sd'   = sqrt(1 / (1 / s_p^2 + 1 / s_v^2))
//! ```
//!
//! Blending happens once per run, before any sampling, and every applied
//! blend is recorded for the run's audit snapshot. A zero spread carries
//! full precision: the blend returns that side exactly; if both spreads are
//! zero the variable's own parameters win. Log-normal variables blend in log
//! space (`mu`/`sigma`).

use sim_core::{AppliedPrior, BayesianPriorOverride, Distribution, RunConfig, ScenarioVariable};

/// Variables with priors folded in, plus the audit trail of applied blends.
#[derive(Clone, Debug)]
pub struct BlendedVariables {
    /// Effective variables, in configuration order.
    pub variables: Vec<ScenarioVariable>,
    /// One record per applied prior.
    pub applied: Vec<AppliedPrior>,
}

/// Folds applied priors into the configured variables.
pub fn blend(config: &RunConfig) -> BlendedVariables {
    let mut variables = config.variables.clone();
    let mut applied = Vec::new();

    for prior in config.priors.iter().filter(|p| p.applied) {
        let Some(var) = variables.iter_mut().find(|v| v.id == prior.variable_id) else {
            continue; // validation guarantees existence
        };
        match var.distribution {
            Distribution::Normal { mean, sd } => {
                let (eff_mean, eff_sd) = precision_blend(prior, mean, sd);
                applied.push(record(prior, mean, sd, eff_mean, eff_sd));
                var.distribution = Distribution::Normal {
                    mean: eff_mean,
                    sd: eff_sd,
                };
            }
            Distribution::LogNormal { mu, sigma } => {
                let (eff_mu, eff_sigma) = precision_blend(prior, mu, sigma);
                applied.push(record(prior, mu, sigma, eff_mu, eff_sigma));
                var.distribution = Distribution::LogNormal {
                    mu: eff_mu,
                    sigma: eff_sigma,
                };
            }
            // Validation rejects applied priors on triangular variables.
            Distribution::Triangular { .. } => {}
        }
    }

    BlendedVariables { variables, applied }
}

fn precision_blend(prior: &BayesianPriorOverride, mean: f64, sd: f64) -> (f64, f64) {
    if sd == 0.0 {
        // The variable is a point mass; no prior can move it.
        return (mean, 0.0);
    }
    if prior.prior_sd == 0.0 {
        return (prior.prior_mean, 0.0);
    }
    let w_prior = 1.0 / (prior.prior_sd * prior.prior_sd);
    let w_var = 1.0 / (sd * sd);
    let eff_mean = (prior.prior_mean * w_prior + mean * w_var) / (w_prior + w_var);
    let eff_sd = (1.0 / (w_prior + w_var)).sqrt();
    (eff_mean, eff_sd)
}

fn record(
    prior: &BayesianPriorOverride,
    original_mean: f64,
    original_sd: f64,
    effective_mean: f64,
    effective_sd: f64,
) -> AppliedPrior {
    AppliedPrior {
        variable_id: prior.variable_id.clone(),
        prior_mean: prior.prior_mean,
        prior_sd: prior.prior_sd,
        original_mean,
        original_sd,
        effective_mean,
        effective_sd,
    }
}
