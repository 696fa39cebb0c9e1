//! Log-density kernels behind the rate models.
//!
//! Count kernels are written out with `ln_gamma` so they accept the
//! non-integer "successes" (`p·n`) that arise from rounded rates; continuous
//! kernels defer to `statrs`. Out-of-support arguments return `-∞`; invalid
//! distribution parameters (e.g. a non-positive standard deviation) surface
//! as [`LikelihoodError::InvalidDistribution`].
use statrs::distribution::{Beta, Continuous, Normal};
use statrs::function::gamma::ln_gamma;

use crate::likelihood::errors::LikelihoodResult;
use crate::utils::xlogy;

/// Binomial log-pmf of `x` successes in `n` trials at rate `p`.
///
/// Certain outcomes (`x = 0` at `p = 0`, `x = n` at `p = 1`) return exactly
/// `0.0`; `ln_gamma` leaves rounding residue there.
pub fn binomial_ln_pmf(x: f64, n: f64, p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) || x < 0.0 || x > n || n < 0.0 {
        return f64::NEG_INFINITY;
    }
    if (x == 0.0 && p == 0.0) || (x == n && p == 1.0) {
        return 0.0;
    }
    ln_gamma(n + 1.0) - ln_gamma(x + 1.0) - ln_gamma(n - x + 1.0)
        + xlogy(x, p)
        + xlogy(n - x, 1.0 - p)
}

/// Poisson log-pmf of `x` events at mean `mu`.
///
/// `x = 0` returns `-mu` exactly, so a zero count at a zero mean is `0.0`.
pub fn poisson_ln_pmf(x: f64, mu: f64) -> f64 {
    if x < 0.0 || !(mu >= 0.0) {
        return f64::NEG_INFINITY;
    }
    if x == 0.0 {
        return -mu;
    }
    xlogy(x, mu) - mu - ln_gamma(x + 1.0)
}

/// Negative-binomial log-pmf of `x` counts at mean `mu` and dispersion
/// `alpha` (variance `mu + mu²/alpha`).
pub fn negative_binomial_ln_pmf(x: f64, mu: f64, alpha: f64) -> f64 {
    if x < 0.0 || !(mu > 0.0) || !(alpha > 0.0) {
        return f64::NEG_INFINITY;
    }
    ln_gamma(x + alpha) - ln_gamma(x + 1.0) - ln_gamma(alpha)
        + alpha * (alpha / (alpha + mu)).ln()
        + xlogy(x, mu / (alpha + mu))
}

/// Normal log-pdf of `x` with the given mean and precision `tau`.
pub fn normal_ln_pdf(x: f64, mean: f64, tau: f64) -> LikelihoodResult<f64> {
    let dist = Normal::new(mean, tau.recip().sqrt())?;
    Ok(dist.ln_pdf(x))
}

/// Beta log-pdf of `x` with shapes `alpha` and `beta`.
pub fn beta_ln_pdf(x: f64, alpha: f64, beta: f64) -> LikelihoodResult<f64> {
    if !(0.0..=1.0).contains(&x) {
        return Ok(f64::NEG_INFINITY);
    }
    let dist = Beta::new(alpha, beta)?;
    Ok(dist.ln_pdf(x))
}
