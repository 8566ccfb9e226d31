//! Run orchestration.
//!
//! [`Simulator`] validates a configuration once, blends priors and prepares
//! the copula up front, then executes the pipeline: correlated draws →
//! per-draw option outcomes → metric aggregation. Draw generation and payoff
//! evaluation parallelise over draw indices with rayon; because every
//! `(variable, draw)` pair addresses its own position in the random stream,
//! the result is bit-for-bit identical regardless of thread count.
//!
//! Variables are evaluated in canonical (sorted-id) order and streams are
//! keyed by variable id, so configurations that differ only in list ordering
//! produce identical draws, identical metrics and identical fingerprints.

use rand_distr::{Distribution as RandDistribution, StandardNormal};
use rayon::prelude::*;
use tracing::{debug, info};

use sim_core::{
    AppliedPrior, ConfigError, RunConfig, RunFingerprint, RunMetadata, RunOutcome,
    ScenarioVariable, TcorComponents, VariableRole,
};

use crate::bayes;
use crate::copula::PreparedCopula;
use crate::metrics::{aggregate, OptionSample};
use crate::payoff::{game_adjustments, GameAdjustment, OptionEvaluator};
use crate::rng::DrawRng;
use crate::sample;

/// Per-variable draw streams of a completed run, in canonical order.
#[derive(Clone, Debug)]
pub struct DrawTable {
    variable_ids: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl DrawTable {
    /// Variable ids, in canonical (sorted) order.
    pub fn variable_ids(&self) -> &[String] {
        &self.variable_ids
    }

    /// Draw stream of one variable.
    pub fn column(&self, variable_id: &str) -> Option<&[f64]> {
        let idx = self.variable_ids.iter().position(|id| id == variable_id)?;
        Some(&self.columns[idx])
    }
}

/// Annualised outcome stream of one option.
#[derive(Clone, Debug)]
pub struct OutcomeSeries {
    /// Option the outcomes belong to.
    pub option_id: String,
    /// Annualised per-draw outcomes, in draw order.
    pub raw: Vec<f64>,
}

/// Everything a run produces: the immutable result plus the draw and outcome
/// streams the sensitivity layer attributes variance from.
#[derive(Clone, Debug)]
pub struct RunArtifacts {
    /// Metrics, metadata and fingerprint.
    pub outcome: RunOutcome,
    /// Per-variable draw streams.
    pub draws: DrawTable,
    /// Per-option outcome streams, in configuration order.
    pub outcome_series: Vec<OutcomeSeries>,
}

impl RunArtifacts {
    /// Outcome stream of one option.
    pub fn series_for(&self, option_id: &str) -> Option<&OutcomeSeries> {
        self.outcome_series.iter().find(|s| s.option_id == option_id)
    }
}

struct BoundCopula {
    copula: PreparedCopula,
    /// Canonical variable index of each copula slot.
    indices: Vec<usize>,
}

/// Validated, prepared simulation run.
///
/// Construction performs all validation and one-off preparation (prior
/// blending, dependence repair and factorisation, game resolution);
/// [`Simulator::run`] is then infallible.
pub struct Simulator {
    config: RunConfig,
    fingerprint: RunFingerprint,
    /// Blended variables in canonical (sorted-id) order.
    variables: Vec<ScenarioVariable>,
    /// Stream key per canonical variable.
    streams: Vec<u64>,
    /// Copula slot per canonical variable, if correlated.
    block_slot: Vec<Option<usize>>,
    copula: Option<BoundCopula>,
    applied_priors: Vec<AppliedPrior>,
    adjustments: Vec<GameAdjustment>,
}

impl Simulator {
    /// Validates the configuration and prepares the run.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`], naming the offending field.
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new_validated(config))
    }

    /// Prepares an already-validated configuration.
    pub(crate) fn new_validated(config: RunConfig) -> Self {
        let fingerprint = RunFingerprint::of(&config);
        let blended = bayes::blend(&config);

        let mut variables = blended.variables;
        variables.sort_by(|a, b| a.id.cmp(&b.id));
        let streams: Vec<u64> = variables
            .iter()
            .map(|v| DrawRng::variable_stream(&v.id))
            .collect();

        let copula = config.dependence.as_ref().map(|dep| {
            let copula = PreparedCopula::prepare(dep);
            if copula.repair_frobenius > 0.0 {
                debug!(
                    repair_frobenius = copula.repair_frobenius,
                    "dependence matrix repaired to nearest PSD"
                );
            }
            let indices = copula
                .ids
                .iter()
                .map(|id| {
                    variables
                        .iter()
                        .position(|v| &v.id == id)
                        .unwrap_or_default()
                })
                .collect();
            BoundCopula { copula, indices }
        });

        let mut block_slot = vec![None; variables.len()];
        if let Some(bound) = &copula {
            for (slot, &vi) in bound.indices.iter().enumerate() {
                block_slot[vi] = Some(slot);
            }
        }

        let adjustments = game_adjustments(&config.options, config.game.as_ref());

        Self {
            fingerprint,
            variables,
            streams,
            block_slot,
            copula,
            applied_priors: blended.applied,
            adjustments,
            config,
        }
    }

    /// Fingerprint of the prepared configuration.
    #[inline]
    pub fn fingerprint(&self) -> RunFingerprint {
        self.fingerprint
    }

    /// The configuration the run was prepared from.
    #[inline]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Executes the full pipeline.
    pub fn run(&self) -> RunArtifacts {
        debug!(fingerprint = %self.fingerprint, "starting simulation run");

        let draws = self.generate_draws();
        let mut metadata = RunMetadata {
            dependence_fit: self.copula.as_ref().map(|bound| {
                let columns: Vec<&[f64]> = bound
                    .indices
                    .iter()
                    .map(|&vi| draws.columns[vi].as_slice())
                    .collect();
                bound.copula.measure(&columns)
            }),
            applied_priors: self.applied_priors.clone(),
            notices: Vec::new(),
        };

        let (return_shocks, cost_shocks) = self.shock_streams(&draws);
        let loss_factors = self.loss_factors(&draws);

        let mut metrics = Vec::with_capacity(self.config.options.len());
        let mut outcome_series = Vec::with_capacity(self.config.options.len());
        for (option, adjustment) in self.config.options.iter().zip(&self.adjustments) {
            let evaluator = OptionEvaluator::new(option, *adjustment, self.config.tcor.as_ref());
            let raw: Vec<f64> = (0..self.config.run_count)
                .into_par_iter()
                .map(|d| {
                    let lf = loss_factors.as_ref().map_or(1.0, |ls| ls[d]);
                    evaluator.outcome(return_shocks[d], cost_shocks[d], lf)
                })
                .collect();

            let tcor_components = self.config.tcor.as_ref().map(|t| {
                let mean_factor = loss_factors
                    .as_ref()
                    .map_or(1.0, |ls| ls.iter().sum::<f64>() / ls.len() as f64);
                TcorComponents {
                    expected_loss: t.expected_loss * mean_factor,
                    insurance: t.insurance,
                    contingency: t.contingency_rate * option.base_cost,
                    mitigation: option.mitigation_cost.unwrap_or(0.0),
                }
            });

            metrics.push(aggregate(
                &OptionSample {
                    option,
                    raw_outcomes: &raw,
                    tcor_components,
                },
                self.config.horizon_months,
                self.config.capital_convention,
                self.config.utility.as_ref(),
                &mut metadata.notices,
            ));
            outcome_series.push(OutcomeSeries {
                option_id: option.id.clone(),
                raw,
            });
        }

        info!(
            fingerprint = %self.fingerprint,
            options = metrics.len(),
            run_count = self.config.run_count,
            "simulation run complete"
        );

        RunArtifacts {
            outcome: RunOutcome {
                fingerprint: self.fingerprint.to_hex(),
                metrics,
                metadata,
            },
            draws,
            outcome_series,
        }
    }

    /// Generates the full draw table, parallel over draw indices.
    fn generate_draws(&self) -> DrawTable {
        let k = self.variables.len();
        let n = self.config.run_count;
        let streams = DrawRng::new(self.config.seed);

        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|d| self.draw_row(&streams, d as u64))
            .collect();

        let mut columns = vec![Vec::with_capacity(n); k];
        for row in rows {
            for (vi, value) in row.into_iter().enumerate() {
                columns[vi].push(value);
            }
        }

        DrawTable {
            variable_ids: self.variables.iter().map(|v| v.id.clone()).collect(),
            columns,
        }
    }

    /// One draw across all variables.
    fn draw_row(&self, streams: &DrawRng, draw: u64) -> Vec<f64> {
        let mut row = vec![0.0; self.variables.len()];

        // Correlated block: latents per variable, correlated, then mapped
        // through each marginal.
        if let Some(bound) = &self.copula {
            let mut z: Vec<f64> = bound
                .indices
                .iter()
                .map(|&vi| StandardNormal.sample(&mut streams.at(self.streams[vi], draw)))
                .collect();
            bound.copula.correlate(&mut z);
            for (slot, &vi) in bound.indices.iter().enumerate() {
                row[vi] = sample::from_latent(&self.variables[vi].distribution, z[slot]);
            }
        }

        // Independent variables.
        for (vi, var) in self.variables.iter().enumerate() {
            if self.block_slot[vi].is_none() {
                let mut rng = streams.at(self.streams[vi], draw);
                row[vi] = sample::draw(&var.distribution, &mut rng);
            }
        }
        row
    }

    /// Weight-summed shock streams by role, in canonical variable order.
    fn shock_streams(&self, draws: &DrawTable) -> (Vec<f64>, Vec<f64>) {
        let n = self.config.run_count;
        (0..n)
            .into_par_iter()
            .map(|d| {
                let mut ret = 0.0;
                let mut cost = 0.0;
                for (vi, var) in self.variables.iter().enumerate() {
                    let contribution = var.weight * draws.columns[vi][d];
                    match var.applies_to {
                        VariableRole::Return => ret += contribution,
                        VariableRole::Cost => cost += contribution,
                    }
                }
                (ret, cost)
            })
            .unzip()
    }

    /// Loss-driver stream floored at zero, when a driver is configured.
    fn loss_factors(&self, draws: &DrawTable) -> Option<Vec<f64>> {
        let driver = self.config.tcor.as_ref()?.loss_driver.as_ref()?;
        let column = draws.column(driver)?;
        Some(column.iter().map(|&x| x.max(0.0)).collect())
    }
}
