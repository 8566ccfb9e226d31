//! Canonical run fingerprints.
//!
//! A fingerprint is a SHA-256 digest over a canonical byte encoding of a
//! [`RunConfig`]. Two configs share a fingerprint if and only if they are
//! semantically identical; any single differing field produces a different
//! digest.
//!
//! # Canonicalisation
//!
//! - Floats are encoded as IEEE-754 bits with `-0.0` normalised to `+0.0`
//!   (validation guarantees no NaN reaches encoding).
//! - Strings are length-prefixed UTF-8.
//! - Variables and options are sorted by id, priors by variable id, and game
//!   strategies by option id. The engine evaluates in the same canonical
//!   order, so configurations that differ only in list ordering produce both
//!   identical fingerprints and identical results.
//! - The dependence matrix is permuted into sorted-id order before encoding,
//!   matching the copula's own canonical ordering.
//! - A version tag is mixed in first so a format change can never collide
//!   with an older encoding.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::types::config::{
    CapitalConvention, Distribution, GameInteractionConfig, OptionGameStrategy, RunConfig,
    VariableRole,
};

/// Fingerprint format version; bump when the canonical encoding changes.
pub const FINGERPRINT_VERSION: &str = "SIMFP_V1";

/// Content-addressable identity of a run configuration.
///
/// # Examples
///
/// ```
/// use sim_core::{Distribution, RunConfig, RunFingerprint, VariableRole};
///
/// let config = RunConfig::builder()
///     .seed(42)
///     .run_count(1_000)
///     .horizon_months(12)
///     .option("a", "A", 50.0, 100.0)
///     .build()
///     .unwrap();
///
/// let fp = RunFingerprint::of(&config);
/// assert_eq!(fp.to_hex().len(), 64);
/// assert_eq!(fp, RunFingerprint::of(&config));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunFingerprint([u8; 32]);

impl RunFingerprint {
    /// Computes the fingerprint of a configuration.
    pub fn of(config: &RunConfig) -> Self {
        let mut h = Sha256::new();
        put_str(&mut h, FINGERPRINT_VERSION);

        h.update(config.seed.to_le_bytes());
        h.update((config.run_count as u64).to_le_bytes());
        h.update(config.horizon_months.to_le_bytes());

        // Options, sorted by id.
        let mut options: Vec<_> = config.options.iter().collect();
        options.sort_by(|a, b| a.id.cmp(&b.id));
        h.update((options.len() as u64).to_le_bytes());
        for option in options {
            put_str(&mut h, &option.id);
            put_str(&mut h, &option.label);
            put_f64(&mut h, option.base_cost);
            put_f64(&mut h, option.base_expected_return);
            put_opt_f64(&mut h, option.mitigation_cost);
        }

        // Variables, sorted by id.
        let mut variables: Vec<_> = config.variables.iter().collect();
        variables.sort_by(|a, b| a.id.cmp(&b.id));
        h.update((variables.len() as u64).to_le_bytes());
        for var in variables {
            put_str(&mut h, &var.id);
            put_str(&mut h, &var.name);
            put_distribution(&mut h, &var.distribution);
            h.update([match var.applies_to {
                VariableRole::Return => 0u8,
                VariableRole::Cost => 1u8,
            }]);
            put_f64(&mut h, var.weight);
        }

        // Dependence, permuted into sorted-id order.
        match &config.dependence {
            None => h.update([0u8]),
            Some(dep) => {
                h.update([1u8]);
                let n = dep.variable_ids.len();
                let mut order: Vec<usize> = (0..n).collect();
                order.sort_by(|&a, &b| dep.variable_ids[a].cmp(&dep.variable_ids[b]));
                h.update((n as u64).to_le_bytes());
                for &i in &order {
                    put_str(&mut h, &dep.variable_ids[i]);
                }
                for &i in &order {
                    for &j in &order {
                        put_f64(&mut h, dep.matrix[i * n + j]);
                    }
                }
            }
        }

        // Priors, sorted by variable id.
        let mut priors: Vec<_> = config.priors.iter().collect();
        priors.sort_by(|a, b| a.variable_id.cmp(&b.variable_id));
        h.update((priors.len() as u64).to_le_bytes());
        for prior in priors {
            put_str(&mut h, &prior.variable_id);
            put_f64(&mut h, prior.prior_mean);
            put_f64(&mut h, prior.prior_sd);
            h.update([prior.applied as u8]);
        }

        // Game strategies, sorted by option id.
        match &config.game {
            None => h.update([0u8]),
            Some(game) => {
                h.update([1u8]);
                put_game(&mut h, game);
            }
        }

        match &config.tcor {
            None => h.update([0u8]),
            Some(tcor) => {
                h.update([1u8]);
                put_f64(&mut h, tcor.expected_loss);
                match &tcor.loss_driver {
                    None => h.update([0u8]),
                    Some(id) => {
                        h.update([1u8]);
                        put_str(&mut h, id);
                    }
                }
                put_f64(&mut h, tcor.insurance);
                put_f64(&mut h, tcor.contingency_rate);
            }
        }

        match &config.utility {
            None => h.update([0u8]),
            Some(u) => {
                h.update([1u8]);
                put_f64(&mut h, u.risk_aversion);
                put_f64(&mut h, u.scale);
            }
        }

        h.update([match config.capital_convention {
            CapitalConvention::EvMinusVar => 0u8,
            CapitalConvention::VarMagnitude => 1u8,
        }]);

        Self(h.finalize().into())
    }

    /// Lower-case 64-character hex rendering.
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in &self.0 {
            out.push_str(&format!("{byte:02x}"));
        }
        out
    }

    /// Persisted-snapshot identifier: `"run-"` followed by the hex digest.
    pub fn run_id(&self) -> String {
        format!("run-{}", self.to_hex())
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RunFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn put_str(h: &mut Sha256, s: &str) {
    h.update((s.len() as u64).to_le_bytes());
    h.update(s.as_bytes());
}

fn put_f64(h: &mut Sha256, x: f64) {
    // Normalise the two zero encodings; NaN cannot reach here past validation.
    let bits = if x == 0.0 { 0u64 } else { x.to_bits() };
    h.update(bits.to_le_bytes());
}

fn put_opt_f64(h: &mut Sha256, x: Option<f64>) {
    match x {
        None => h.update([0u8]),
        Some(v) => {
            h.update([1u8]);
            put_f64(h, v);
        }
    }
}

fn put_distribution(h: &mut Sha256, dist: &Distribution) {
    match *dist {
        Distribution::Triangular { min, mode, max } => {
            h.update([0u8]);
            put_f64(h, min);
            put_f64(h, mode);
            put_f64(h, max);
        }
        Distribution::Normal { mean, sd } => {
            h.update([1u8]);
            put_f64(h, mean);
            put_f64(h, sd);
        }
        Distribution::LogNormal { mu, sigma } => {
            h.update([2u8]);
            put_f64(h, mu);
            put_f64(h, sigma);
        }
    }
}

fn put_game(h: &mut Sha256, game: &GameInteractionConfig) {
    let mut strategies: Vec<_> = game.strategies.iter().collect();
    strategies.sort_by(|a, b| a.0.cmp(&b.0));
    h.update((strategies.len() as u64).to_le_bytes());
    for (option_id, strategy) in strategies {
        put_str(h, option_id);
        match *strategy {
            OptionGameStrategy::Passive => h.update([0u8]),
            OptionGameStrategy::CompetitorPriceResponse { intensity } => {
                h.update([1u8]);
                put_f64(h, intensity);
            }
            OptionGameStrategy::CapacityCommitment { share_shift } => {
                h.update([2u8]);
                put_f64(h, share_shift);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::{
        BayesianPriorOverride, CapitalConvention, DependenceConfig, RunConfig, VariableRole,
    };

    fn base_config() -> RunConfig {
        RunConfig::builder()
            .seed(42)
            .run_count(1_000)
            .horizon_months(12)
            .option("a", "Option A", 50.0, 100.0)
            .option("b", "Option B", 30.0, 70.0)
            .variable(
                "demand",
                Distribution::Normal { mean: 0.0, sd: 1.0 },
                VariableRole::Return,
                1.0,
            )
            .variable(
                "fuel",
                Distribution::LogNormal { mu: 0.0, sigma: 0.2 },
                VariableRole::Cost,
                2.0,
            )
            .build()
            .unwrap()
    }

    #[test]
    fn identical_configs_share_a_fingerprint() {
        assert_eq!(
            RunFingerprint::of(&base_config()),
            RunFingerprint::of(&base_config())
        );
    }

    #[test]
    fn hex_is_64_chars() {
        let hex = RunFingerprint::of(&base_config()).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn run_id_prefix() {
        let fp = RunFingerprint::of(&base_config());
        assert!(fp.run_id().starts_with("run-"));
        assert_eq!(fp.run_id().len(), 4 + 64);
    }

    #[test]
    fn every_scalar_field_changes_the_fingerprint() {
        let base = RunFingerprint::of(&base_config());

        let mut c = base_config();
        c.seed = 43;
        assert_ne!(base, RunFingerprint::of(&c));

        let mut c = base_config();
        c.run_count = 1_001;
        assert_ne!(base, RunFingerprint::of(&c));

        let mut c = base_config();
        c.horizon_months = 13;
        assert_ne!(base, RunFingerprint::of(&c));

        let mut c = base_config();
        c.capital_convention = CapitalConvention::VarMagnitude;
        assert_ne!(base, RunFingerprint::of(&c));
    }

    #[test]
    fn variable_fields_change_the_fingerprint() {
        let base = RunFingerprint::of(&base_config());

        let mut c = base_config();
        c.variables[0].weight = 1.5;
        assert_ne!(base, RunFingerprint::of(&c));

        let mut c = base_config();
        c.variables[0].distribution = Distribution::Normal { mean: 0.1, sd: 1.0 };
        assert_ne!(base, RunFingerprint::of(&c));

        let mut c = base_config();
        c.variables[0].applies_to = VariableRole::Cost;
        assert_ne!(base, RunFingerprint::of(&c));
    }

    #[test]
    fn list_reordering_is_canonicalised_away() {
        let mut reordered = base_config();
        reordered.variables.reverse();
        reordered.options.reverse();
        assert_eq!(
            RunFingerprint::of(&base_config()),
            RunFingerprint::of(&reordered)
        );
    }

    #[test]
    fn dependence_permutation_is_canonicalised_away() {
        let mut a = base_config();
        a.dependence = Some(DependenceConfig::pair("demand", "fuel", 0.8));
        let mut b = base_config();
        b.dependence = Some(DependenceConfig::pair("fuel", "demand", 0.8));
        assert_eq!(RunFingerprint::of(&a), RunFingerprint::of(&b));

        let mut c = base_config();
        c.dependence = Some(DependenceConfig::pair("demand", "fuel", 0.7));
        assert_ne!(RunFingerprint::of(&a), RunFingerprint::of(&c));
    }

    #[test]
    fn inert_prior_still_contributes() {
        let mut with_prior = base_config();
        with_prior.priors.push(BayesianPriorOverride {
            variable_id: "demand".to_string(),
            prior_mean: 0.0,
            prior_sd: 1.0,
            applied: false,
        });
        assert_ne!(
            RunFingerprint::of(&base_config()),
            RunFingerprint::of(&with_prior)
        );
    }

    #[test]
    fn zero_normalisation() {
        let mut a = base_config();
        a.options[0].base_cost = 0.0;
        let mut b = base_config();
        b.options[0].base_cost = -0.0;
        assert_eq!(RunFingerprint::of(&a), RunFingerprint::of(&b));
    }
}
