//! Per-draw option payoff and cost-of-risk evaluation.
//!
//! For one draw and one option the annualised net outcome is
//!
//! ```text
//! outcome = (return' + return_shock) − (cost' + cost_shock) − tcor
//! ```
//!
//! where `return'`/`cost'` are the game-adjusted base figures, the shocks are
//! weight-summed scenario-variable draws by role, and `tcor` is the total
//! cost of risk (expected loss + insurance + contingency + mitigation).
//! Horizon scaling is applied by the aggregation layer, not here.
//!
//! # Game resolution
//!
//! Strategies interact through rival pressure: each strategy has an
//! aggression level (passive 0, price response its intensity, capacity
//! commitment its share shift), and an option faces the mean aggression of
//! the other options. Passive options concede that pressure in full; a price
//! response neutralises the fraction `intensity` of it; a capacity
//! commitment captures share where rivals are passive but pays for the
//! committed capacity. The resolution is applied to the effective return and
//! cost before the outcome formula, once per draw.

use sim_core::{DecisionOption, GameInteractionConfig, OptionGameStrategy, TcorParams};

/// Multipliers a strategy profile applies to one option's base figures.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameAdjustment {
    /// Multiplier on `base_expected_return`.
    pub return_mult: f64,
    /// Multiplier on `base_cost`.
    pub cost_mult: f64,
}

impl GameAdjustment {
    /// No strategic interaction.
    pub const NEUTRAL: Self = Self {
        return_mult: 1.0,
        cost_mult: 1.0,
    };
}

fn aggression(strategy: &OptionGameStrategy) -> f64 {
    match *strategy {
        OptionGameStrategy::Passive => 0.0,
        OptionGameStrategy::CompetitorPriceResponse { intensity } => intensity,
        OptionGameStrategy::CapacityCommitment { share_shift } => share_shift,
    }
}

/// Resolves the strategy profile into per-option adjustments.
///
/// Options without a configured strategy are passive. With a single option
/// there is no rival pressure and every adjustment is neutral.
pub fn game_adjustments(
    options: &[DecisionOption],
    game: Option<&GameInteractionConfig>,
) -> Vec<GameAdjustment> {
    let Some(game) = game else {
        return vec![GameAdjustment::NEUTRAL; options.len()];
    };

    let strategy_of = |id: &str| -> OptionGameStrategy {
        game.strategies
            .iter()
            .find(|(option_id, _)| option_id == id)
            .map(|(_, s)| *s)
            .unwrap_or(OptionGameStrategy::Passive)
    };

    options
        .iter()
        .map(|option| {
            let rivals: Vec<f64> = options
                .iter()
                .filter(|o| o.id != option.id)
                .map(|o| aggression(&strategy_of(&o.id)))
                .collect();
            let pressure = if rivals.is_empty() {
                0.0
            } else {
                rivals.iter().sum::<f64>() / rivals.len() as f64
            };

            match strategy_of(&option.id) {
                OptionGameStrategy::Passive => GameAdjustment {
                    return_mult: 1.0 - pressure,
                    cost_mult: 1.0,
                },
                OptionGameStrategy::CompetitorPriceResponse { intensity } => GameAdjustment {
                    return_mult: 1.0 - pressure * (1.0 - intensity),
                    cost_mult: 1.0,
                },
                OptionGameStrategy::CapacityCommitment { share_shift } => GameAdjustment {
                    return_mult: 1.0 + share_shift * (1.0 - pressure),
                    cost_mult: 1.0 + share_shift,
                },
            }
        })
        .collect()
}

/// Evaluator for one option, with game and TCOR terms resolved up front.
#[derive(Clone, Debug)]
pub struct OptionEvaluator {
    adjusted_return: f64,
    adjusted_cost: f64,
    /// Draw-independent TCOR terms: insurance + contingency + mitigation.
    fixed_tcor: f64,
    /// Base expected loss, scaled per draw by the loss driver where set.
    expected_loss: f64,
}

impl OptionEvaluator {
    /// Builds the evaluator for `option` under the given adjustment.
    ///
    /// The contingency reserve is taken against the configured base cost,
    /// not the game-adjusted one: the reserve is budgeted before strategic
    /// interaction plays out.
    pub fn new(option: &DecisionOption, adjustment: GameAdjustment, tcor: Option<&TcorParams>) -> Self {
        let (fixed_tcor, expected_loss) = match tcor {
            None => (0.0, 0.0),
            Some(t) => (
                t.insurance
                    + t.contingency_rate * option.base_cost
                    + option.mitigation_cost.unwrap_or(0.0),
                t.expected_loss,
            ),
        };
        Self {
            adjusted_return: option.base_expected_return * adjustment.return_mult,
            adjusted_cost: option.base_cost * adjustment.cost_mult,
            fixed_tcor,
            expected_loss,
        }
    }

    /// Annualised net outcome for one draw.
    ///
    /// `loss_factor` is the loss-driver draw floored at zero, or `1.0` when
    /// no driver is configured.
    #[inline]
    pub fn outcome(&self, return_shock: f64, cost_shock: f64, loss_factor: f64) -> f64 {
        (self.adjusted_return + return_shock)
            - (self.adjusted_cost + cost_shock)
            - self.tcor(loss_factor)
    }

    /// Annualised total cost of risk for one draw.
    #[inline]
    pub fn tcor(&self, loss_factor: f64) -> f64 {
        self.fixed_tcor + self.expected_loss * loss_factor
    }

    /// Draw-independent TCOR portion (insurance + contingency + mitigation).
    #[inline]
    pub fn fixed_tcor(&self) -> f64 {
        self.fixed_tcor
    }

    /// Base expected loss before driver scaling.
    #[inline]
    pub fn base_expected_loss(&self) -> f64 {
        self.expected_loss
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn option(id: &str, cost: f64, ret: f64) -> DecisionOption {
        DecisionOption {
            id: id.to_string(),
            label: id.to_uppercase(),
            base_cost: cost,
            base_expected_return: ret,
            mitigation_cost: None,
        }
    }

    #[test]
    fn no_game_is_neutral() {
        let options = [option("a", 50.0, 100.0), option("b", 30.0, 60.0)];
        let adj = game_adjustments(&options, None);
        assert_eq!(adj, vec![GameAdjustment::NEUTRAL; 2]);
    }

    #[test]
    fn passive_option_concedes_rival_pressure() {
        let options = [option("a", 50.0, 100.0), option("b", 30.0, 60.0)];
        let game = GameInteractionConfig {
            strategies: vec![(
                "b".to_string(),
                OptionGameStrategy::CompetitorPriceResponse { intensity: 0.4 },
            )],
        };
        let adj = game_adjustments(&options, Some(&game));
        // Option a is passive and faces b's aggression of 0.4.
        assert_relative_eq!(adj[0].return_mult, 0.6, epsilon = 1e-12);
        assert_relative_eq!(adj[0].cost_mult, 1.0);
        // Option b faces a's aggression of zero and defends fully.
        assert_relative_eq!(adj[1].return_mult, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn price_response_neutralises_part_of_the_pressure() {
        let options = [option("a", 50.0, 100.0), option("b", 30.0, 60.0)];
        let game = GameInteractionConfig {
            strategies: vec![
                (
                    "a".to_string(),
                    OptionGameStrategy::CompetitorPriceResponse { intensity: 0.5 },
                ),
                (
                    "b".to_string(),
                    OptionGameStrategy::CompetitorPriceResponse { intensity: 0.8 },
                ),
            ],
        };
        let adj = game_adjustments(&options, Some(&game));
        // a faces pressure 0.8 and keeps 1 - 0.8 * 0.5 = 0.6 of it away.
        assert_relative_eq!(adj[0].return_mult, 1.0 - 0.8 * 0.5, epsilon = 1e-12);
        assert_relative_eq!(adj[1].return_mult, 1.0 - 0.5 * 0.2, epsilon = 1e-12);
    }

    #[test]
    fn capacity_commitment_costs_what_it_captures() {
        let options = [option("a", 50.0, 100.0), option("b", 30.0, 60.0)];
        let game = GameInteractionConfig {
            strategies: vec![(
                "a".to_string(),
                OptionGameStrategy::CapacityCommitment { share_shift: 0.3 },
            )],
        };
        let adj = game_adjustments(&options, Some(&game));
        // b is passive, so a captures the full 0.3 against zero pressure.
        assert_relative_eq!(adj[0].return_mult, 1.3, epsilon = 1e-12);
        assert_relative_eq!(adj[0].cost_mult, 1.3, epsilon = 1e-12);
    }

    #[test]
    fn single_option_faces_no_pressure() {
        let options = [option("a", 50.0, 100.0)];
        let game = GameInteractionConfig {
            strategies: vec![("a".to_string(), OptionGameStrategy::Passive)],
        };
        let adj = game_adjustments(&options, Some(&game));
        assert_eq!(adj[0], GameAdjustment::NEUTRAL);
    }

    #[test]
    fn outcome_without_tcor() {
        let eval = OptionEvaluator::new(&option("a", 50.0, 100.0), GameAdjustment::NEUTRAL, None);
        assert_relative_eq!(eval.outcome(0.0, 0.0, 1.0), 50.0);
        assert_relative_eq!(eval.outcome(5.0, 2.5, 1.0), 52.5);
    }

    #[test]
    fn tcor_components_enter_the_outcome() {
        let mut opt = option("a", 100.0, 200.0);
        opt.mitigation_cost = Some(3.0);
        let tcor = TcorParams {
            expected_loss: 10.0,
            loss_driver: None,
            insurance: 5.0,
            contingency_rate: 0.02,
        };
        let eval = OptionEvaluator::new(&opt, GameAdjustment::NEUTRAL, Some(&tcor));
        // fixed = 5 + 2 + 3 = 10; total tcor = 10 + 10 * 1 = 20
        assert_relative_eq!(eval.tcor(1.0), 20.0);
        assert_relative_eq!(eval.outcome(0.0, 0.0, 1.0), 200.0 - 100.0 - 20.0);
        // A loss driver of zero removes the variable part only.
        assert_relative_eq!(eval.tcor(0.0), 10.0);
    }
}
