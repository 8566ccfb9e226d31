//! Marginal distribution sampling.
//!
//! Two entry points cover the two sampling paths:
//!
//! - [`draw`] samples a variable independently from its own addressed
//!   generator (ziggurat standard normals for the normal family, inverse CDF
//!   of a uniform for triangulars).
//! - [`from_latent`] maps a standard-normal latent through the marginal,
//!   used by the Gaussian copula after latents have been correlated. Normal
//!   and log-normal marginals take the latent directly; triangulars go
//!   through Φ and the triangular inverse CDF so the marginal is preserved
//!   exactly.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution as RandDistribution, StandardNormal};

use sim_core::math::norm::norm_cdf;
use sim_core::Distribution;

/// Samples one value from an addressed generator.
pub fn draw(dist: &Distribution, rng: &mut ChaCha8Rng) -> f64 {
    match *dist {
        Distribution::Normal { mean, sd } => {
            let z: f64 = StandardNormal.sample(rng);
            mean + sd * z
        }
        Distribution::LogNormal { mu, sigma } => {
            let z: f64 = StandardNormal.sample(rng);
            (mu + sigma * z).exp()
        }
        Distribution::Triangular { min, mode, max } => {
            let u: f64 = rng.gen();
            triangular_inv_cdf(min, mode, max, u)
        }
    }
}

/// Maps a standard-normal latent through the marginal distribution.
pub fn from_latent(dist: &Distribution, z: f64) -> f64 {
    match *dist {
        Distribution::Normal { mean, sd } => mean + sd * z,
        Distribution::LogNormal { mu, sigma } => (mu + sigma * z).exp(),
        Distribution::Triangular { min, mode, max } => {
            triangular_inv_cdf(min, mode, max, norm_cdf(z))
        }
    }
}

/// Triangular inverse CDF.
///
/// Degenerate widths collapse to the remaining support: `min == max` returns
/// the point mass, a zero-width left or right limb falls through to the
/// other branch.
pub fn triangular_inv_cdf(min: f64, mode: f64, max: f64, u: f64) -> f64 {
    let width = max - min;
    if width <= 0.0 {
        return min;
    }
    let u = u.clamp(0.0, 1.0);
    let cut = (mode - min) / width;
    if u < cut {
        min + (u * width * (mode - min)).sqrt()
    } else {
        max - ((1.0 - u) * width * (max - mode)).sqrt()
    }
}
