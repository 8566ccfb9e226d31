//! Outcome-distribution reduction into decision metrics.
//!
//! # Horizon convention
//!
//! The evaluator produces annualised outcomes. Flow metrics (EV, VaR95,
//! CVaR95, TCOR, standard error) are scaled by `h = horizon_months / 12`;
//! economic capital is scaled by `sqrt(h)`. RAROC is therefore
//!
//! ```text
//! RAROC = (EV_annual * h) / (capital_annual * sqrt(h))
//! ```
//!
//! so doubling the horizon doubles the numerator and grows the capital term
//! by `sqrt(2)`.
//!
//! # Tail metrics
//!
//! VaR95 is the 5th percentile of the outcome distribution, linearly
//! interpolated between order statistics; CVaR95 is the mean of outcomes at
//! or below that threshold.
//!
//! # Degeneracies
//!
//! Zero economic capital and zero risk aversion are recovered locally: RAROC
//! falls back to horizon-scaled EV per unit capital, the certainty
//! equivalent falls back to EV, and each fallback attaches a notice to the
//! result. Neither is an error.

use sim_core::math::stats::{mean, percentile_sorted, std_error};
use sim_core::{
    CapitalConvention, DecisionOption, DegeneracyKind, DegeneracyNotice, OptionMetrics,
    TcorComponents, UtilityParams,
};

/// Aggregation inputs for one option.
pub struct OptionSample<'a> {
    /// The option the outcomes belong to.
    pub option: &'a DecisionOption,
    /// Annualised per-draw outcomes.
    pub raw_outcomes: &'a [f64],
    /// Annualised mean TCOR components, when TCOR is configured.
    pub tcor_components: Option<TcorComponents>,
}

/// Reduces one option's outcome distribution into [`OptionMetrics`].
pub fn aggregate(
    sample: &OptionSample<'_>,
    horizon_months: u32,
    convention: CapitalConvention,
    utility: Option<&UtilityParams>,
    notices: &mut Vec<DegeneracyNotice>,
) -> OptionMetrics {
    let h = f64::from(horizon_months) / 12.0;
    let raw = sample.raw_outcomes;

    let mut sorted = raw.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mean_raw = mean(raw);
    let var_raw = percentile_sorted(&sorted, 0.05);
    let tail: Vec<f64> = sorted.iter().copied().filter(|&x| x <= var_raw).collect();
    let cvar_raw = if tail.is_empty() { var_raw } else { mean(&tail) };

    let capital_raw = match convention {
        CapitalConvention::EvMinusVar => mean_raw - var_raw,
        CapitalConvention::VarMagnitude => var_raw.abs(),
    };

    let ev = mean_raw * h;
    let economic_capital = capital_raw * h.sqrt();
    let raroc = if economic_capital == 0.0 {
        notices.push(DegeneracyNotice::new(
            &sample.option.id,
            DegeneracyKind::ZeroEconomicCapital,
        ));
        ev
    } else {
        ev / economic_capital
    };

    let (certainty_equivalent, expected_utility) = match utility {
        None => (None, None),
        Some(params) => {
            let (ce, eu) = cara(raw, h, ev, params, &sample.option.id, notices);
            (Some(ce), Some(eu))
        }
    };

    let (tcor, tcor_components) = match sample.tcor_components {
        None => (None, None),
        Some(components) => {
            let scaled = TcorComponents {
                expected_loss: components.expected_loss * h,
                insurance: components.insurance * h,
                contingency: components.contingency * h,
                mitigation: components.mitigation * h,
            };
            (Some(scaled.total()), Some(scaled))
        }
    };

    OptionMetrics {
        option_id: sample.option.id.clone(),
        option_label: sample.option.label.clone(),
        horizon_months,
        ev,
        var95: var_raw * h,
        cvar95: cvar_raw * h,
        economic_capital,
        raroc,
        certainty_equivalent,
        expected_utility,
        tcor,
        tcor_components,
        std_error: std_error(raw) * h,
    }
}

/// CARA certainty equivalent and expected utility over horizon-scaled
/// outcomes.
///
/// `U(x) = 1 − exp(−a · x / scale)`; the certainty equivalent is computed as
/// `−(scale / a) · ln(mean(exp(−a · x / scale)))` through a log-sum-exp so
/// that deep losses cannot overflow the exponential.
fn cara(
    raw: &[f64],
    h: f64,
    ev: f64,
    params: &UtilityParams,
    option_id: &str,
    notices: &mut Vec<DegeneracyNotice>,
) -> (f64, f64) {
    let a = params.risk_aversion;
    if a == 0.0 {
        notices.push(DegeneracyNotice::new(
            option_id,
            DegeneracyKind::ZeroRiskAversion,
        ));
        return (ev, 0.0);
    }

    // Exponents of the disutility terms, one per draw.
    let exponents: Vec<f64> = raw.iter().map(|&x| -a * (x * h) / params.scale).collect();
    let max_exp = exponents.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = exponents.iter().map(|&e| (e - max_exp).exp()).sum();
    let ln_mean = max_exp + sum.ln() - (raw.len() as f64).ln();

    let ce = -(params.scale / a) * ln_mean;
    let eu = 1.0 - ln_mean.exp();
    (ce, eu)
}
