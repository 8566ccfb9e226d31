//! Simulation run configuration.
//!
//! This module provides the configuration types consumed by the simulation
//! engine and a builder for constructing validated [`RunConfig`] values.
//! All adjustment axes (dependence, priors, game strategies, cost of risk,
//! utility) are closed tagged variants so the evaluator can match on them
//! exhaustively instead of probing optional fields at runtime.

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Minimum number of Monte Carlo draws per run.
pub const MIN_RUN_COUNT: usize = 100;

/// Maximum number of Monte Carlo draws per run.
pub const MAX_RUN_COUNT: usize = 100_000;

/// Minimum decision horizon in months.
pub const MIN_HORIZON_MONTHS: u32 = 1;

/// Maximum decision horizon in months.
pub const MAX_HORIZON_MONTHS: u32 = 240;

/// Probability distribution of a scenario variable.
///
/// Parameters are validated when the enclosing [`RunConfig`] is built, never
/// during sampling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// Triangular distribution on `[min, max]` with the given mode.
    Triangular {
        /// Lower bound.
        min: f64,
        /// Most likely value, in `[min, max]`.
        mode: f64,
        /// Upper bound.
        max: f64,
    },
    /// Normal distribution.
    Normal {
        /// Mean.
        mean: f64,
        /// Standard deviation, `>= 0`.
        sd: f64,
    },
    /// Log-normal distribution: `exp(N(mu, sigma))`.
    LogNormal {
        /// Mean of the underlying normal.
        mu: f64,
        /// Standard deviation of the underlying normal, `>= 0`.
        sigma: f64,
    },
}

impl Distribution {
    /// Validates parameter consistency, naming `variable` in any error.
    pub fn validate(&self, variable: &str) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::InvalidDistribution {
            variable: variable.to_string(),
            reason,
        };
        match *self {
            Distribution::Triangular { min, mode, max } => {
                if !(min.is_finite() && mode.is_finite() && max.is_finite()) {
                    return Err(fail("triangular parameters must be finite".to_string()));
                }
                if min > mode {
                    return Err(fail(format!("min {min} exceeds mode {mode}")));
                }
                if mode > max {
                    return Err(fail(format!("mode {mode} exceeds max {max}")));
                }
            }
            Distribution::Normal { mean, sd } => {
                if !mean.is_finite() || !sd.is_finite() {
                    return Err(fail("normal parameters must be finite".to_string()));
                }
                if sd < 0.0 {
                    return Err(fail(format!("sd {sd} must be non-negative")));
                }
            }
            Distribution::LogNormal { mu, sigma } => {
                if !mu.is_finite() || !sigma.is_finite() {
                    return Err(fail("log-normal parameters must be finite".to_string()));
                }
                if sigma < 0.0 {
                    return Err(fail(format!("sigma {sigma} must be non-negative")));
                }
            }
        }
        Ok(())
    }

    /// Distribution mean.
    pub fn mean(&self) -> f64 {
        match *self {
            Distribution::Triangular { min, mode, max } => (min + mode + max) / 3.0,
            Distribution::Normal { mean, .. } => mean,
            Distribution::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
        }
    }

    /// Spread proxy used for location shifts: the standard deviation for
    /// normals, sigma (log-space) for log-normals, and `(max - min) / 6` for
    /// triangulars.
    pub fn spread(&self) -> f64 {
        match *self {
            Distribution::Triangular { min, max, .. } => (max - min) / 6.0,
            Distribution::Normal { sd, .. } => sd,
            Distribution::LogNormal { sigma, .. } => sigma,
        }
    }

    /// Returns the distribution with its location shifted by `delta`
    /// (log-space for log-normals).
    pub fn shift_location(&self, delta: f64) -> Self {
        match *self {
            Distribution::Triangular { min, mode, max } => Distribution::Triangular {
                min: min + delta,
                mode: mode + delta,
                max: max + delta,
            },
            Distribution::Normal { mean, sd } => Distribution::Normal {
                mean: mean + delta,
                sd,
            },
            Distribution::LogNormal { mu, sigma } => Distribution::LogNormal {
                mu: mu + delta,
                sigma,
            },
        }
    }

    /// Returns the distribution with its spread scaled by `factor`
    /// (triangulars widen about their mode).
    pub fn scale_spread(&self, factor: f64) -> Self {
        match *self {
            Distribution::Triangular { min, mode, max } => Distribution::Triangular {
                min: mode - (mode - min) * factor,
                mode,
                max: mode + (max - mode) * factor,
            },
            Distribution::Normal { mean, sd } => Distribution::Normal {
                mean,
                sd: sd * factor,
            },
            Distribution::LogNormal { mu, sigma } => Distribution::LogNormal {
                mu,
                sigma: sigma * factor,
            },
        }
    }
}

/// Side of the payoff a scenario variable shocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    /// Variable shocks the option's return.
    Return,
    /// Variable shocks the option's cost.
    Cost,
}

/// An uncertain input to the simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioVariable {
    /// Stable identifier; unique within a run.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Sampling distribution.
    pub distribution: Distribution,
    /// Whether draws shock returns or costs.
    pub applies_to: VariableRole,
    /// Weight applied to draws before summation; `> 0`.
    pub weight: f64,
}

/// A candidate course of action. Immutable input to a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecisionOption {
    /// Stable identifier; unique within a run.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Annualised base cost.
    pub base_cost: f64,
    /// Annualised base expected return.
    pub base_expected_return: f64,
    /// Annualised spend on risk mitigation, if any.
    pub mitigation_cost: Option<f64>,
}

/// Target pairwise rank-correlation structure over a subset of variables.
///
/// The matrix is row-major over `variable_ids`, must be symmetric with unit
/// diagonal and entries in `[-1, 1]`. It does not need to be positive
/// semi-definite as supplied: the engine repairs it and reports the repair
/// magnitude together with the achieved correlation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DependenceConfig {
    /// Variables the correlation matrix ranges over.
    pub variable_ids: Vec<String>,
    /// Row-major target rank-correlation matrix.
    pub matrix: Vec<f64>,
}

impl DependenceConfig {
    /// Convenience constructor for a two-variable dependence.
    pub fn pair(a: impl Into<String>, b: impl Into<String>, rho: f64) -> Self {
        Self {
            variable_ids: vec![a.into(), b.into()],
            matrix: vec![1.0, rho, rho, 1.0],
        }
    }
}

/// Per-variable Bayesian prior to blend into configured parameters.
///
/// When `applied` is true the variable's location/spread are replaced by a
/// precision-weighted blend of `(prior_mean, prior_sd)` and the configured
/// parameters before sampling begins. Only normal and log-normal variables
/// accept priors; the blend for a log-normal happens in log space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BayesianPriorOverride {
    /// Variable the prior targets.
    pub variable_id: String,
    /// Prior mean (log-space for log-normal variables).
    pub prior_mean: f64,
    /// Prior standard deviation, `>= 0`.
    pub prior_sd: f64,
    /// Whether the prior participates in this run.
    pub applied: bool,
}

/// Assumed strategic posture of one option relative to the others.
///
/// Resolved once per draw before cost/return aggregation; the evaluator
/// matches exhaustively on the variant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionGameStrategy {
    /// No strategic response; fully exposed to rival aggression.
    Passive,
    /// Defends margin by matching rival price moves with the given
    /// intensity in `[0, 1]`.
    CompetitorPriceResponse {
        /// Fraction of rival pressure neutralised.
        intensity: f64,
    },
    /// Commits capacity up front, capturing share from passive rivals at a
    /// proportional cost; `share_shift` in `[0, 1]`.
    CapacityCommitment {
        /// Fraction of addressable share committed for.
        share_shift: f64,
    },
}

/// Game-theoretic interaction between options.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameInteractionConfig {
    /// Strategy per option id. Options without an entry are `Passive`.
    pub strategies: Vec<(String, OptionGameStrategy)>,
}

/// CARA utility parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UtilityParams {
    /// Absolute risk aversion, `>= 0`. Zero falls back to EV behaviour.
    pub risk_aversion: f64,
    /// Monetary scale normalising outcomes inside the exponential; `> 0`.
    pub scale: f64,
}

/// Total-cost-of-risk component parameters.
///
/// All amounts are annualised; the mitigation component comes from each
/// option's own `mitigation_cost`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TcorParams {
    /// Base expected loss, `>= 0`.
    pub expected_loss: f64,
    /// Optional variable id whose draw scales the expected loss
    /// (draws are floored at zero for this purpose).
    pub loss_driver: Option<String>,
    /// Insurance premium, `>= 0`.
    pub insurance: f64,
    /// Contingency reserve as a fraction of the option's base cost, `>= 0`.
    pub contingency_rate: f64,
}

/// Economic-capital formula.
///
/// The convention is explicit configuration rather than a hard-coded choice:
/// both appear in practice and they disagree whenever EV is far from zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapitalConvention {
    /// Capital = EV − VaR95 (distance from expectation to the tail quantile).
    #[default]
    EvMinusVar,
    /// Capital = |VaR95| (magnitude of the tail quantile alone).
    VarMagnitude,
}

/// Complete configuration of a simulation run.
///
/// Created by the caller (typically via [`RunConfig::builder`]) and never
/// mutated after a run starts. Construction through the builder validates
/// every field; [`RunConfig::validate`] re-checks a hand-assembled value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seed for the deterministic draw streams.
    pub seed: u64,
    /// Number of Monte Carlo draws, in `[100, 100_000]`.
    pub run_count: usize,
    /// Decision horizon in months, in `[1, 240]`.
    pub horizon_months: u32,
    /// Candidate options; at least one.
    pub options: Vec<DecisionOption>,
    /// Uncertain inputs. May be empty for a deterministic comparison.
    pub variables: Vec<ScenarioVariable>,
    /// Optional rank-correlation structure.
    pub dependence: Option<DependenceConfig>,
    /// Bayesian prior overrides; entries with `applied = false` are inert.
    #[serde(default)]
    pub priors: Vec<BayesianPriorOverride>,
    /// Optional game-theoretic interaction.
    pub game: Option<GameInteractionConfig>,
    /// Optional total-cost-of-risk components.
    pub tcor: Option<TcorParams>,
    /// Optional CARA utility parameters.
    pub utility: Option<UtilityParams>,
    /// Economic-capital convention.
    #[serde(default)]
    pub capital_convention: CapitalConvention,
}

impl RunConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// Decision horizon in years.
    #[inline]
    pub fn horizon_years(&self) -> f64 {
        f64::from(self.horizon_months) / 12.0
    }

    /// Looks up a variable by id.
    pub fn variable(&self, id: &str) -> Option<&ScenarioVariable> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// Validates the full configuration, reporting the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RUN_COUNT..=MAX_RUN_COUNT).contains(&self.run_count) {
            return Err(ConfigError::InvalidRunCount(self.run_count));
        }
        if !(MIN_HORIZON_MONTHS..=MAX_HORIZON_MONTHS).contains(&self.horizon_months) {
            return Err(ConfigError::InvalidHorizon(self.horizon_months));
        }
        if self.options.is_empty() {
            return Err(ConfigError::NoOptions);
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|o| o.id == option.id) {
                return Err(ConfigError::DuplicateOptionId(option.id.clone()));
            }
        }
        for (i, var) in self.variables.iter().enumerate() {
            if self.variables[..i].iter().any(|v| v.id == var.id) {
                return Err(ConfigError::DuplicateVariableId(var.id.clone()));
            }
            var.distribution.validate(&var.id)?;
            if !(var.weight > 0.0 && var.weight.is_finite()) {
                return Err(ConfigError::InvalidWeight {
                    variable: var.id.clone(),
                    weight: var.weight,
                });
            }
        }
        if let Some(dep) = &self.dependence {
            self.validate_dependence(dep)?;
        }
        for (i, prior) in self.priors.iter().enumerate() {
            if self.priors[..i]
                .iter()
                .any(|p| p.variable_id == prior.variable_id)
            {
                return Err(ConfigError::InvalidPrior {
                    variable: prior.variable_id.clone(),
                    reason: "duplicate prior entry".to_string(),
                });
            }
            self.validate_prior(prior)?;
        }
        if let Some(game) = &self.game {
            self.validate_game(game)?;
        }
        if let Some(utility) = &self.utility {
            if !(utility.risk_aversion >= 0.0 && utility.risk_aversion.is_finite()) {
                return Err(ConfigError::InvalidUtility(format!(
                    "risk_aversion {} must be non-negative and finite",
                    utility.risk_aversion
                )));
            }
            if !(utility.scale > 0.0 && utility.scale.is_finite()) {
                return Err(ConfigError::InvalidUtility(format!(
                    "scale {} must be positive and finite",
                    utility.scale
                )));
            }
        }
        if let Some(tcor) = &self.tcor {
            self.validate_tcor(tcor)?;
        }
        Ok(())
    }

    fn validate_dependence(&self, dep: &DependenceConfig) -> Result<(), ConfigError> {
        let n = dep.variable_ids.len();
        if n < 2 {
            return Err(ConfigError::InvalidDependence(
                "at least two variables are required".to_string(),
            ));
        }
        for (i, id) in dep.variable_ids.iter().enumerate() {
            if self.variable(id).is_none() {
                return Err(ConfigError::InvalidDependence(format!(
                    "unknown variable id '{id}'"
                )));
            }
            if dep.variable_ids[..i].contains(id) {
                return Err(ConfigError::InvalidDependence(format!(
                    "duplicate variable id '{id}'"
                )));
            }
        }
        if dep.matrix.len() != n * n {
            return Err(ConfigError::InvalidDependence(format!(
                "matrix has {} entries, expected {} for {} variables",
                dep.matrix.len(),
                n * n,
                n
            )));
        }
        for i in 0..n {
            for j in 0..n {
                let v = dep.matrix[i * n + j];
                if !v.is_finite() || !(-1.0..=1.0).contains(&v) {
                    return Err(ConfigError::InvalidDependence(format!(
                        "entry ({i}, {j}) = {v} outside [-1, 1]"
                    )));
                }
                if (dep.matrix[i * n + j] - dep.matrix[j * n + i]).abs() > 1e-12 {
                    return Err(ConfigError::InvalidDependence(format!(
                        "matrix is not symmetric at ({i}, {j})"
                    )));
                }
            }
            if (dep.matrix[i * n + i] - 1.0).abs() > 1e-12 {
                return Err(ConfigError::InvalidDependence(format!(
                    "diagonal entry {i} must be 1.0"
                )));
            }
        }
        Ok(())
    }

    fn validate_prior(&self, prior: &BayesianPriorOverride) -> Result<(), ConfigError> {
        let fail = |reason: String| ConfigError::InvalidPrior {
            variable: prior.variable_id.clone(),
            reason,
        };
        let Some(var) = self.variable(&prior.variable_id) else {
            return Err(fail("unknown variable id".to_string()));
        };
        if !prior.prior_mean.is_finite() {
            return Err(fail("prior_mean must be finite".to_string()));
        }
        if !(prior.prior_sd >= 0.0 && prior.prior_sd.is_finite()) {
            return Err(fail(format!(
                "prior_sd {} must be non-negative and finite",
                prior.prior_sd
            )));
        }
        if prior.applied && matches!(var.distribution, Distribution::Triangular { .. }) {
            return Err(fail(
                "prior blending requires a normal or log-normal distribution".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_game(&self, game: &GameInteractionConfig) -> Result<(), ConfigError> {
        for (i, (option_id, strategy)) in game.strategies.iter().enumerate() {
            if !self.options.iter().any(|o| o.id == *option_id) {
                return Err(ConfigError::UnknownGameOption(option_id.clone()));
            }
            if game.strategies[..i].iter().any(|(id, _)| id == option_id) {
                return Err(ConfigError::InvalidGameStrategy {
                    option: option_id.clone(),
                    reason: "duplicate strategy entry".to_string(),
                });
            }
            let bounded = |name: &str, value: f64| {
                if (0.0..=1.0).contains(&value) && value.is_finite() {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidGameStrategy {
                        option: option_id.clone(),
                        reason: format!("{name} {value} must lie in [0, 1]"),
                    })
                }
            };
            match *strategy {
                OptionGameStrategy::Passive => {}
                OptionGameStrategy::CompetitorPriceResponse { intensity } => {
                    bounded("intensity", intensity)?;
                }
                OptionGameStrategy::CapacityCommitment { share_shift } => {
                    bounded("share_shift", share_shift)?;
                }
            }
        }
        Ok(())
    }

    fn validate_tcor(&self, tcor: &TcorParams) -> Result<(), ConfigError> {
        let non_negative = |name: &str, value: f64| {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::InvalidTcor(format!(
                    "{name} {value} must be non-negative and finite"
                )))
            }
        };
        non_negative("expected_loss", tcor.expected_loss)?;
        non_negative("insurance", tcor.insurance)?;
        non_negative("contingency_rate", tcor.contingency_rate)?;
        if let Some(driver) = &tcor.loss_driver {
            if self.variable(driver).is_none() {
                return Err(ConfigError::InvalidTcor(format!(
                    "loss_driver references unknown variable id '{driver}'"
                )));
            }
        }
        Ok(())
    }
}

/// Builder for [`RunConfig`].
///
/// Validation happens at build time; the returned config needs no further
/// checking before it enters the engine.
///
/// # Examples
///
/// ```
/// use sim_core::{Distribution, RunConfig, VariableRole};
///
/// let config = RunConfig::builder()
///     .seed(42)
///     .run_count(10_000)
///     .horizon_months(12)
///     .option("a", "Option A", 50.0, 100.0)
///     .variable(
///         "cost-shock",
///         Distribution::Normal { mean: 0.05, sd: 0.03 },
///         VariableRole::Cost,
///         50.0,
///     )
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.run_count, 10_000);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RunConfigBuilder {
    seed: u64,
    run_count: Option<usize>,
    horizon_months: Option<u32>,
    options: Vec<DecisionOption>,
    variables: Vec<ScenarioVariable>,
    dependence: Option<DependenceConfig>,
    priors: Vec<BayesianPriorOverride>,
    game: Option<GameInteractionConfig>,
    tcor: Option<TcorParams>,
    utility: Option<UtilityParams>,
    capital_convention: CapitalConvention,
}

impl RunConfigBuilder {
    /// Sets the run seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of draws.
    pub fn run_count(mut self, run_count: usize) -> Self {
        self.run_count = Some(run_count);
        self
    }

    /// Sets the horizon in months.
    pub fn horizon_months(mut self, months: u32) -> Self {
        self.horizon_months = Some(months);
        self
    }

    /// Adds a decision option without mitigation spend.
    pub fn option(
        mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        base_cost: f64,
        base_expected_return: f64,
    ) -> Self {
        self.options.push(DecisionOption {
            id: id.into(),
            label: label.into(),
            base_cost,
            base_expected_return,
            mitigation_cost: None,
        });
        self
    }

    /// Adds a fully specified decision option.
    pub fn option_full(mut self, option: DecisionOption) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a scenario variable whose display name equals its id.
    pub fn variable(
        mut self,
        id: impl Into<String>,
        distribution: Distribution,
        applies_to: VariableRole,
        weight: f64,
    ) -> Self {
        let id = id.into();
        self.variables.push(ScenarioVariable {
            name: id.clone(),
            id,
            distribution,
            applies_to,
            weight,
        });
        self
    }

    /// Adds a fully specified scenario variable.
    pub fn variable_full(mut self, variable: ScenarioVariable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Sets the dependence configuration.
    pub fn dependence(mut self, dependence: DependenceConfig) -> Self {
        self.dependence = Some(dependence);
        self
    }

    /// Adds a Bayesian prior override.
    pub fn prior(mut self, prior: BayesianPriorOverride) -> Self {
        self.priors.push(prior);
        self
    }

    /// Sets the game interaction configuration.
    pub fn game(mut self, game: GameInteractionConfig) -> Self {
        self.game = Some(game);
        self
    }

    /// Sets the total-cost-of-risk parameters.
    pub fn tcor(mut self, tcor: TcorParams) -> Self {
        self.tcor = Some(tcor);
        self
    }

    /// Sets the CARA utility parameters.
    pub fn utility(mut self, utility: UtilityParams) -> Self {
        self.utility = Some(utility);
        self
    }

    /// Sets the economic-capital convention.
    pub fn capital_convention(mut self, convention: CapitalConvention) -> Self {
        self.capital_convention = convention;
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered, naming the offending
    /// field.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let config = RunConfig {
            seed: self.seed,
            run_count: self.run_count.unwrap_or(0),
            horizon_months: self.horizon_months.unwrap_or(0),
            options: self.options,
            variables: self.variables,
            dependence: self.dependence,
            priors: self.priors,
            game: self.game,
            tcor: self.tcor,
            utility: self.utility,
            capital_convention: self.capital_convention,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_builder() -> RunConfigBuilder {
        RunConfig::builder()
            .seed(42)
            .run_count(1_000)
            .horizon_months(12)
            .option("a", "Option A", 50.0, 100.0)
    }

    #[test]
    fn builder_produces_valid_config() {
        let config = base_builder()
            .variable(
                "demand",
                Distribution::Normal { mean: 0.0, sd: 1.0 },
                VariableRole::Return,
                1.0,
            )
            .build()
            .unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.options.len(), 1);
        assert_eq!(config.capital_convention, CapitalConvention::EvMinusVar);
    }

    #[test]
    fn run_count_bounds_enforced() {
        let err = base_builder().run_count(99).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidRunCount(99));
        let err = base_builder().run_count(100_001).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidRunCount(100_001));
        assert!(base_builder().run_count(100).build().is_ok());
        assert!(base_builder().run_count(100_000).build().is_ok());
    }

    #[test]
    fn horizon_bounds_enforced() {
        let err = base_builder().horizon_months(0).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidHorizon(0));
        let err = base_builder().horizon_months(241).build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidHorizon(241));
        assert!(base_builder().horizon_months(240).build().is_ok());
    }

    #[test]
    fn at_least_one_option_required() {
        let err = RunConfig::builder()
            .run_count(1_000)
            .horizon_months(12)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoOptions);
    }

    #[test]
    fn triangular_ordering_enforced() {
        let err = base_builder()
            .variable(
                "v",
                Distribution::Triangular {
                    min: 2.0,
                    mode: 1.0,
                    max: 3.0,
                },
                VariableRole::Cost,
                1.0,
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDistribution { .. }));
    }

    #[test]
    fn negative_sd_rejected() {
        let err = base_builder()
            .variable(
                "v",
                Distribution::Normal {
                    mean: 0.0,
                    sd: -0.1,
                },
                VariableRole::Cost,
                1.0,
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDistribution { .. }));
    }

    #[test]
    fn zero_sd_is_allowed() {
        // A degenerate variable is valid and contributes a constant.
        assert!(base_builder()
            .variable(
                "v",
                Distribution::Normal { mean: 0.0, sd: 0.0 },
                VariableRole::Cost,
                1.0,
            )
            .build()
            .is_ok());
    }

    #[test]
    fn weight_must_be_positive() {
        let err = base_builder()
            .variable(
                "v",
                Distribution::Normal { mean: 0.0, sd: 1.0 },
                VariableRole::Cost,
                0.0,
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeight { .. }));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = base_builder()
            .option("a", "Again", 1.0, 2.0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateOptionId("a".to_string()));

        let dist = Distribution::Normal { mean: 0.0, sd: 1.0 };
        let err = base_builder()
            .variable("v", dist, VariableRole::Cost, 1.0)
            .variable("v", dist, VariableRole::Return, 1.0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateVariableId("v".to_string()));
    }

    #[test]
    fn dependence_shape_validated() {
        let dist = Distribution::Normal { mean: 0.0, sd: 1.0 };
        let builder = base_builder()
            .variable("x", dist, VariableRole::Cost, 1.0)
            .variable("y", dist, VariableRole::Return, 1.0);

        // Unknown id.
        let err = builder
            .clone()
            .dependence(DependenceConfig::pair("x", "z", 0.5))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDependence(_)));

        // Asymmetric matrix.
        let err = builder
            .clone()
            .dependence(DependenceConfig {
                variable_ids: vec!["x".to_string(), "y".to_string()],
                matrix: vec![1.0, 0.5, 0.3, 1.0],
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDependence(_)));

        // Non-unit diagonal.
        let err = builder
            .clone()
            .dependence(DependenceConfig {
                variable_ids: vec!["x".to_string(), "y".to_string()],
                matrix: vec![0.9, 0.5, 0.5, 1.0],
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDependence(_)));

        // A non-PSD but well-shaped matrix is accepted; repair happens later.
        assert!(builder
            .clone()
            .variable("z", dist, VariableRole::Cost, 1.0)
            .dependence(DependenceConfig {
                variable_ids: vec!["x".to_string(), "y".to_string(), "z".to_string()],
                matrix: vec![1.0, 0.9, -0.9, 0.9, 1.0, 0.9, -0.9, 0.9, 1.0],
            })
            .build()
            .is_ok());
    }

    #[test]
    fn prior_on_triangular_rejected_when_applied() {
        let builder = base_builder().variable(
            "v",
            Distribution::Triangular {
                min: 0.0,
                mode: 1.0,
                max: 2.0,
            },
            VariableRole::Cost,
            1.0,
        );
        let prior = BayesianPriorOverride {
            variable_id: "v".to_string(),
            prior_mean: 1.0,
            prior_sd: 0.5,
            applied: true,
        };
        let err = builder.clone().prior(prior.clone()).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrior { .. }));

        // Inert priors are carried without complaint.
        let inert = BayesianPriorOverride {
            applied: false,
            ..prior
        };
        assert!(builder.prior(inert).build().is_ok());
    }

    #[test]
    fn game_strategy_validated() {
        let err = base_builder()
            .game(GameInteractionConfig {
                strategies: vec![(
                    "missing".to_string(),
                    OptionGameStrategy::Passive,
                )],
            })
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownGameOption("missing".to_string()));

        let err = base_builder()
            .game(GameInteractionConfig {
                strategies: vec![(
                    "a".to_string(),
                    OptionGameStrategy::CompetitorPriceResponse { intensity: 1.5 },
                )],
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGameStrategy { .. }));
    }

    #[test]
    fn utility_and_tcor_validated() {
        let err = base_builder()
            .utility(UtilityParams {
                risk_aversion: -1.0,
                scale: 100.0,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUtility(_)));

        let err = base_builder()
            .tcor(TcorParams {
                expected_loss: -1.0,
                loss_driver: None,
                insurance: 0.0,
                contingency_rate: 0.0,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTcor(_)));

        let err = base_builder()
            .tcor(TcorParams {
                expected_loss: 1.0,
                loss_driver: Some("nope".to_string()),
                insurance: 0.0,
                contingency_rate: 0.0,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTcor(_)));
    }

    #[test]
    fn distribution_means() {
        let tri = Distribution::Triangular {
            min: 0.0,
            mode: 3.0,
            max: 6.0,
        };
        assert!((tri.mean() - 3.0).abs() < 1e-12);
        let normal = Distribution::Normal { mean: 1.5, sd: 2.0 };
        assert!((normal.mean() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn spread_scaling_widens_triangular_about_mode() {
        let tri = Distribution::Triangular {
            min: 1.0,
            mode: 2.0,
            max: 4.0,
        };
        let wide = tri.scale_spread(2.0);
        match wide {
            Distribution::Triangular { min, mode, max } => {
                assert!((min - 0.0).abs() < 1e-12);
                assert!((mode - 2.0).abs() < 1e-12);
                assert!((max - 6.0).abs() < 1e-12);
            }
            _ => panic!("expected triangular"),
        }
    }
}
