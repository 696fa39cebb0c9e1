//! Rate models — observation likelihoods and posterior-predictive draws.
//!
//! Purpose
//! -------
//! Provide the eight observation models that connect a vector of expected
//! rates `pi` (one per observation row) to observed rates `p`, and the
//! matching posterior-predictive rules used for predictive validity checks.
//!
//! Key behaviors
//! -------------
//! - [`RateModel`] constructors (`binom`, `beta_binom`, `poisson`,
//!   `neg_binom`, `neg_binom_lower_bound`, `normal`, `log_normal`,
//!   `offset_log_normal`) validate the data once and return a container with
//!   an [`ObservationTerm`], an optional [`PredictiveTerm`], and any
//!   family-specific latent block.
//! - Evaluation takes the current `pi` and a [`FamilyParams`] value carrying
//!   the family's free parameters (dispersion, spread, offset, latent rates).
//!   A parameter kind that does not belong to the family is rejected with
//!   [`LikelihoodError::WrongParameters`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `pi.len()` matches the observation batch at construction and at every
//!   evaluation.
//! - Zero sample sizes are kept for the likelihood and replaced for the
//!   predictive draw only (`1e10`, or `1e9` for the negative binomial).
//! - Rows with infinite standard error are dropped from normal-family
//!   likelihoods and drawn with `s = 0` in the predictive.
//! - Out-of-support `pi` (outside `[0, 1]` for the binomial, non-positive on
//!   log scales) evaluates to `-∞`; it is not an error.
//!
//! Conventions
//! -----------
//! - Observation terms are full log-likelihoods, normalizing constants
//!   included.
//! - Normal-family precision is `1 / (σ² + s²)`, with `s` replaced by `s/p`
//!   (log-normal) or `s/(p + ζ)` (offset log-normal).
//! - Sampling uses `rand_distr` through `ndarray-rand`; callers own the RNG.
use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayView1};
use ndarray_rand::rand_distr::{Binomial, Distribution, Gamma, Normal, Poisson};
use rand::Rng;
use tracing::debug;

use crate::likelihood::{
    data::ObservationBatch,
    densities::{
        beta_ln_pdf, binomial_ln_pmf, negative_binomial_ln_pmf, normal_ln_pdf, poisson_ln_pmf,
    },
    errors::{LikelihoodError, LikelihoodResult},
};
use crate::utils::clip;

/// Floor added to negative-binomial means and denominators.
const MEAN_FLOOR: f64 = 1e-9;
/// Floor applied to Poisson rates.
const POISSON_RATE_FLOOR: f64 = 1e-9;
/// Predictive sample size substituted for `n == 0` (binomial, Poisson).
const PREDICTIVE_N: f64 = 1e10;
/// Predictive sample size substituted for `n == 0` (negative binomial).
const PREDICTIVE_N_NEG_BINOM: f64 = 1e9;

const FAMILY_NAMES: &str = "'binom', 'beta_binom', 'poisson', 'neg_binom', \
                            'neg_binom_lower_bound', 'normal', 'log_normal', 'offset_log_normal'";

/// The supported observation models.
///
/// Parsing:
/// `FromStr` accepts the snake-case names printed by `Display`
/// (`"binom"`, `"neg_binom_lower_bound"`, ...), case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateFamily {
    Binomial,
    BetaBinomial,
    Poisson,
    NegativeBinomial,
    NegativeBinomialLowerBound,
    Normal,
    LogNormal,
    OffsetLogNormal,
}

impl RateFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            RateFamily::Binomial => "binom",
            RateFamily::BetaBinomial => "beta_binom",
            RateFamily::Poisson => "poisson",
            RateFamily::NegativeBinomial => "neg_binom",
            RateFamily::NegativeBinomialLowerBound => "neg_binom_lower_bound",
            RateFamily::Normal => "normal",
            RateFamily::LogNormal => "log_normal",
            RateFamily::OffsetLogNormal => "offset_log_normal",
        }
    }

    /// `true` for models whose companion array is a standard error.
    pub fn uses_standard_error(self) -> bool {
        matches!(self, RateFamily::Normal | RateFamily::LogNormal | RateFamily::OffsetLogNormal)
    }

    /// `false` only for the left-censored negative binomial.
    pub fn has_predictive(self) -> bool {
        self != RateFamily::NegativeBinomialLowerBound
    }

    fn expected_params(self) -> &'static str {
        match self {
            RateFamily::Binomial | RateFamily::Poisson => "plain (no free)",
            RateFamily::BetaBinomial => "latent (p_alpha, pi_latent)",
            RateFamily::NegativeBinomial | RateFamily::NegativeBinomialLowerBound => {
                "dispersion (delta)"
            }
            RateFamily::Normal | RateFamily::LogNormal => "spread (sigma)",
            RateFamily::OffsetLogNormal => "offset spread (sigma, zeta)",
        }
    }
}

impl fmt::Display for RateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateFamily {
    type Err = LikelihoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "binom" => Ok(RateFamily::Binomial),
            "beta_binom" => Ok(RateFamily::BetaBinomial),
            "poisson" => Ok(RateFamily::Poisson),
            "neg_binom" => Ok(RateFamily::NegativeBinomial),
            "neg_binom_lower_bound" => Ok(RateFamily::NegativeBinomialLowerBound),
            "normal" => Ok(RateFamily::Normal),
            "log_normal" => Ok(RateFamily::LogNormal),
            "offset_log_normal" => Ok(RateFamily::OffsetLogNormal),
            _ => Err(LikelihoodError::UnknownFamily { name: s.to_string(), valid: FAMILY_NAMES }),
        }
    }
}

/// Free parameters supplied at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FamilyParams<'a> {
    /// Binomial and Poisson: nothing beyond `pi`.
    Plain,
    /// Beta-binomial: shared concentration and per-row latent rates.
    Latent { p_alpha: f64, pi_latent: ArrayView1<'a, f64> },
    /// Negative binomial (both variants): dispersion `delta > 0`.
    Dispersion { delta: f64 },
    /// Normal and log-normal: extra spread `sigma`.
    Spread { sigma: f64 },
    /// Offset log-normal: extra spread and the shared offset `zeta`.
    OffsetSpread { sigma: f64, zeta: f64 },
}

/// Observed-data log-likelihood `p_obs_{name}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTerm {
    name: String,
    family: RateFamily,
    batch: ObservationBatch,
    rows: Vec<usize>,
}

impl ObservationTerm {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn batch(&self) -> &ObservationBatch {
        &self.batch
    }

    /// Rows that contribute to the likelihood.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Log-likelihood of the observed rates given `pi`.
    ///
    /// Parameters
    /// ----------
    /// - `pi`: `ArrayView1<f64>`
    ///   Current expected rates, one per row of the batch.
    /// - `params`: [`FamilyParams`]
    ///   The family's free parameters; the variant must match the family.
    ///
    /// Returns
    /// -------
    /// `LikelihoodResult<f64>`
    ///   Sum over likelihood rows; `-∞` when a rate is out of support.
    ///
    /// Errors
    /// ------
    /// - `LikelihoodError::LengthMismatch` if `pi` (or `pi_latent`) has the
    ///   wrong length.
    /// - `LikelihoodError::WrongParameters` if `params` belongs to another
    ///   family.
    /// - `LikelihoodError::InvalidDistribution` if a normal-family precision
    ///   is degenerate (`σ = 0` together with `s = 0`).
    pub fn log_likelihood(
        &self, pi: ArrayView1<'_, f64>, params: &FamilyParams<'_>,
    ) -> LikelihoodResult<f64> {
        check_rate_length("expected rates", pi, self.batch.len())?;
        let p = self.batch.p();
        let spread = self.batch.spread();

        match (self.family, *params) {
            (RateFamily::Binomial, FamilyParams::Plain) => Ok(self
                .rows
                .iter()
                .map(|&i| binomial_ln_pmf(p[i] * spread[i], spread[i], pi[i]))
                .sum()),
            (RateFamily::BetaBinomial, FamilyParams::Latent { pi_latent, .. }) => {
                check_rate_length("latent rates", pi_latent, self.batch.len())?;
                Ok(self
                    .rows
                    .iter()
                    .map(|&i| binomial_ln_pmf(p[i] * spread[i], spread[i], pi_latent[i]))
                    .sum())
            }
            (RateFamily::Poisson, FamilyParams::Plain) => Ok(self
                .rows
                .iter()
                .map(|&i| {
                    let mu = clip(pi[i] * spread[i], POISSON_RATE_FLOOR, f64::INFINITY);
                    poisson_ln_pmf(p[i] * spread[i], mu)
                })
                .sum()),
            (RateFamily::NegativeBinomial, FamilyParams::Dispersion { delta }) => Ok(self
                .rows
                .iter()
                .map(|&i| {
                    let mu = pi[i] * spread[i] + MEAN_FLOOR;
                    negative_binomial_ln_pmf(p[i] * spread[i], mu, delta)
                })
                .sum()),
            (RateFamily::NegativeBinomialLowerBound, FamilyParams::Dispersion { delta }) => Ok(self
                .rows
                .iter()
                .map(|&i| {
                    let expected = pi[i] * spread[i];
                    let x = (p[i] * spread[i]).max(expected);
                    negative_binomial_ln_pmf(x, expected + MEAN_FLOOR, delta)
                })
                .sum()),
            (RateFamily::Normal, FamilyParams::Spread { sigma }) => self
                .rows
                .iter()
                .map(|&i| normal_ln_pdf(p[i], pi[i], precision(sigma, spread[i])))
                .sum(),
            (RateFamily::LogNormal, FamilyParams::Spread { sigma }) => self
                .rows
                .iter()
                .map(|&i| {
                    if !(pi[i] > 0.0) {
                        return Ok(f64::NEG_INFINITY);
                    }
                    normal_ln_pdf(p[i].ln(), pi[i].ln(), precision(sigma, spread[i] / p[i]))
                })
                .sum(),
            (RateFamily::OffsetLogNormal, FamilyParams::OffsetSpread { sigma, zeta }) => self
                .rows
                .iter()
                .map(|&i| {
                    let shifted = pi[i] + zeta;
                    let observed = p[i] + zeta;
                    if !(shifted > 0.0) || !(observed > 0.0) {
                        return Ok(f64::NEG_INFINITY);
                    }
                    normal_ln_pdf(observed.ln(), shifted.ln(), precision(sigma, spread[i] / observed))
                })
                .sum(),
            (family, _) => Err(wrong_parameters(&self.name, family)),
        }
    }
}

/// Posterior-predictive rule `p_pred_{name}`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictiveTerm {
    name: String,
    family: RateFamily,
    spread: Array1<f64>,
}

impl PredictiveTerm {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sample sizes or standard errors after the zero/infinity substitutions.
    pub fn spread(&self) -> ArrayView1<'_, f64> {
        self.spread.view()
    }

    /// Draw one predicted rate per row at the current `pi`.
    ///
    /// Parameters
    /// ----------
    /// - `pi`: `ArrayView1<f64>`
    ///   Current expected rates, one per row.
    /// - `params`: [`FamilyParams`]
    ///   The family's free parameters.
    /// - `rng`: `&mut R`
    ///   Caller-owned random source.
    ///
    /// Returns
    /// -------
    /// `LikelihoodResult<Array1<f64>>`
    ///   Predicted rates on the scale of `p`, one per row (including rows
    ///   that have an infinite standard error).
    ///
    /// Errors
    /// ------
    /// - `LikelihoodError::LengthMismatch` / `WrongParameters` as for
    ///   [`ObservationTerm::log_likelihood`].
    /// - `LikelihoodError::SamplingFailed` if a sampling distribution
    ///   rejects its parameters (e.g. a rate outside `[0, 1]`).
    pub fn sample<R: Rng + ?Sized>(
        &self, pi: ArrayView1<'_, f64>, params: &FamilyParams<'_>, rng: &mut R,
    ) -> LikelihoodResult<Array1<f64>> {
        check_rate_length("expected rates", pi, self.spread.len())?;
        let spread = self.spread.view();
        let rows = 0..self.spread.len();

        let draws: LikelihoodResult<Vec<f64>> = match (self.family, *params) {
            (RateFamily::Binomial, FamilyParams::Plain) => {
                rows.map(|i| binomial_draw(spread[i], pi[i], rng)).collect()
            }
            (RateFamily::BetaBinomial, FamilyParams::Latent { pi_latent, .. }) => {
                check_rate_length("latent rates", pi_latent, self.spread.len())?;
                rows.map(|i| binomial_draw(spread[i], pi_latent[i], rng)).collect()
            }
            (RateFamily::Poisson, FamilyParams::Plain) => rows
                .map(|i| -> LikelihoodResult<f64> {
                    let mu = clip(pi[i] * spread[i], POISSON_RATE_FLOOR, f64::INFINITY);
                    let count: f64 = Poisson::new(mu)?.sample(rng);
                    Ok(count / spread[i])
                })
                .collect(),
            (RateFamily::NegativeBinomial, FamilyParams::Dispersion { delta }) => rows
                .map(|i| -> LikelihoodResult<f64> {
                    let count = negative_binomial_draw(pi[i] * spread[i] + MEAN_FLOOR, delta, rng)?;
                    Ok(count / (spread[i] + MEAN_FLOOR))
                })
                .collect(),
            (RateFamily::Normal, FamilyParams::Spread { sigma }) => rows
                .map(|i| -> LikelihoodResult<f64> {
                    let sd = precision(sigma, spread[i]).recip().sqrt();
                    Ok(Normal::new(pi[i], sd)?.sample(rng))
                })
                .collect(),
            (RateFamily::LogNormal, FamilyParams::Spread { sigma }) => rows
                .map(|i| -> LikelihoodResult<f64> {
                    let sd = precision(sigma, spread[i] / pi[i]).recip().sqrt();
                    Ok(Normal::new(pi[i].ln(), sd)?.sample(rng).exp())
                })
                .collect(),
            (RateFamily::OffsetLogNormal, FamilyParams::OffsetSpread { sigma, zeta }) => rows
                .map(|i| -> LikelihoodResult<f64> {
                    let shifted = pi[i] + zeta;
                    let sd = precision(sigma, spread[i] / shifted).recip().sqrt();
                    Ok(Normal::new(shifted.ln(), sd)?.sample(rng).exp() - zeta)
                })
                .collect(),
            (family, _) => Err(wrong_parameters(&self.name, family)),
        };
        Ok(Array1::from(draws?))
    }
}

/// Latent block of the beta-binomial model.
///
/// Each row's rate is a latent `pi_latent_i ~ Beta(p_alpha, p_beta_i)` with
/// `p_beta_i = p_alpha·(1 − pi_i)/pi_i`, so the Beta mean equals `pi_i` and
/// `p_alpha` controls the concentration around it. `p_alpha` has a flat
/// prior on `(0, ∞)`.
#[derive(Debug, Clone, PartialEq)]
pub struct BetaBinomialLatent {
    alpha_name: String,
    latent_name: String,
    pi_latent_init: Array1<f64>,
}

impl BetaBinomialLatent {
    /// Initial value of the concentration.
    pub const P_ALPHA_INIT: f64 = 1.0;

    pub fn alpha_name(&self) -> &str {
        &self.alpha_name
    }

    pub fn latent_name(&self) -> &str {
        &self.latent_name
    }

    /// Initial latent rates (the `pi` seen at construction).
    pub fn pi_latent_init(&self) -> ArrayView1<'_, f64> {
        self.pi_latent_init.view()
    }

    /// Second Beta shape per row.
    pub fn p_beta(p_alpha: f64, pi: ArrayView1<'_, f64>) -> Array1<f64> {
        pi.mapv(|v| p_alpha * (1.0 - v) / v)
    }

    /// `Σ ln Beta(pi_latent_i | p_alpha, p_beta_i)`; `-∞` when `p_alpha` or
    /// any `p_beta_i` leaves `(0, ∞]`.
    pub fn log_prior(
        &self, p_alpha: f64, pi: ArrayView1<'_, f64>, pi_latent: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<f64> {
        check_rate_length("expected rates", pi, self.pi_latent_init.len())?;
        check_rate_length("latent rates", pi_latent, self.pi_latent_init.len())?;
        if !(p_alpha > 0.0) {
            return Ok(f64::NEG_INFINITY);
        }
        let p_beta = Self::p_beta(p_alpha, pi);
        let mut total = 0.0;
        for (&latent, &beta) in pi_latent.iter().zip(p_beta.iter()) {
            if !(beta > 0.0) {
                return Ok(f64::NEG_INFINITY);
            }
            total += beta_ln_pdf(latent, p_alpha, beta)?;
        }
        Ok(total)
    }
}

/// Shared offset `p_zeta` of the offset log-normal model, uniform on
/// `[1e-9, 10]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OffsetParameter {
    name: String,
}

impl OffsetParameter {
    pub const LOWER: f64 = 1e-9;
    pub const UPPER: f64 = 10.0;
    pub const INIT: f64 = 1e-6;

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Uniform log-density: `-ln(UPPER − LOWER)` inside the support, `-∞`
    /// outside.
    pub fn log_prior(&self, zeta: f64) -> f64 {
        if (Self::LOWER..=Self::UPPER).contains(&zeta) {
            -(Self::UPPER - Self::LOWER).ln()
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// A constructed rate model.
///
/// Holds the observation term, the predictive term (absent for the
/// lower-bound model) and any family-specific parameter blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct RateModel {
    name: String,
    family: RateFamily,
    p_obs: ObservationTerm,
    p_pred: Option<PredictiveTerm>,
    latent: Option<BetaBinomialLatent>,
    p_zeta: Option<OffsetParameter>,
}

impl RateModel {
    /// Construct a validated rate model of any family.
    ///
    /// Parameters
    /// ----------
    /// - `family`: [`RateFamily`]
    ///   Likelihood family; decides how `n_or_s` is read and validated.
    /// - `name`: `&str`
    ///   Model name; terms are labelled `p_obs_{name}`, `p_pred_{name}` and
    ///   so on.
    /// - `pi`: `ArrayView1<f64>`
    ///   Expected rates at construction, one per row. Only the length is
    ///   checked; beta-binomial models also use them as latent initial values.
    /// - `p`: `ArrayView1<f64>`
    ///   Observed rates. Finite and `>= 0`; `> 0` for log-scale families.
    /// - `n_or_s`: `ArrayView1<f64>`
    ///   Effective sample sizes for count families, standard errors for
    ///   normal families.
    ///
    /// Returns
    /// -------
    /// `LikelihoodResult<RateModel>`
    ///   The observation term, the predictive term where the family has one,
    ///   and the family's extra parameter blocks.
    ///
    /// Errors
    /// ------
    /// - Any validation error of [`ObservationBatch`] for the family.
    /// - `LikelihoodError::LengthMismatch` when `pi` does not match `p`.
    pub fn new(
        family: RateFamily, name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>,
        n_or_s: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        let batch = match family {
            RateFamily::Binomial
            | RateFamily::BetaBinomial
            | RateFamily::Poisson
            | RateFamily::NegativeBinomial => ObservationBatch::with_sample_size(p, n_or_s)?,
            RateFamily::NegativeBinomialLowerBound => {
                ObservationBatch::with_positive_sample_size(p, n_or_s)?
            }
            RateFamily::Normal => ObservationBatch::with_standard_error(p, n_or_s)?,
            RateFamily::LogNormal | RateFamily::OffsetLogNormal => {
                ObservationBatch::with_positive_rates(p, n_or_s)?
            }
        };
        check_rate_length("expected rates", pi, batch.len())?;

        let rows = if family.uses_standard_error() { batch.finite_rows() } else { (0..batch.len()).collect() };
        let p_pred = family.has_predictive().then(|| PredictiveTerm {
            name: format!("p_pred_{name}"),
            family,
            spread: predictive_spread(family, batch.spread()),
        });
        let latent = (family == RateFamily::BetaBinomial).then(|| BetaBinomialLatent {
            alpha_name: format!("p_alpha_{name}"),
            latent_name: format!("pi_latent_{name}"),
            pi_latent_init: pi.to_owned(),
        });
        let p_zeta = (family == RateFamily::OffsetLogNormal)
            .then(|| OffsetParameter { name: format!("p_zeta_{name}") });

        debug!(
            model = name,
            family = %family,
            rows = batch.len(),
            likelihood_rows = rows.len(),
            "constructed rate model"
        );

        Ok(RateModel {
            name: name.to_string(),
            family,
            p_obs: ObservationTerm { name: format!("p_obs_{name}"), family, batch, rows },
            p_pred,
            latent,
            p_zeta,
        })
    }

    /// Binomial model: `p·n` successes in `n` trials at rate `pi`.
    pub fn binom(
        name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>, n: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        Self::new(RateFamily::Binomial, name, pi, p, n)
    }

    /// Beta-binomial model: binomial on per-row latent rates drawn around `pi`.
    pub fn beta_binom(
        name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>, n: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        Self::new(RateFamily::BetaBinomial, name, pi, p, n)
    }

    /// Poisson model: `p·n` events at mean `max(pi·n, 1e-9)`.
    pub fn poisson(
        name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>, n: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        Self::new(RateFamily::Poisson, name, pi, p, n)
    }

    /// Negative-binomial model: `p·n` counts at mean `pi·n + 1e-9`.
    pub fn neg_binom(
        name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>, n: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        Self::new(RateFamily::NegativeBinomial, name, pi, p, n)
    }

    /// Left-censored negative binomial: `p` is a lower bound on the rate.
    /// Requires `n > 0`; has no predictive term.
    pub fn neg_binom_lower_bound(
        name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>, n: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        Self::new(RateFamily::NegativeBinomialLowerBound, name, pi, p, n)
    }

    /// Normal model: `p ~ N(pi, σ² + s²)`.
    pub fn normal(
        name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>, s: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        Self::new(RateFamily::Normal, name, pi, p, s)
    }

    /// Log-normal model: `ln p ~ N(ln pi, σ² + (s/p)²)`. Requires `p > 0`.
    pub fn log_normal(
        name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>, s: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        Self::new(RateFamily::LogNormal, name, pi, p, s)
    }

    /// Offset log-normal model: log-normal on `p + ζ` vs `pi + ζ` with a
    /// shared learned offset `ζ`. Requires `p > 0`.
    pub fn offset_log_normal(
        name: &str, pi: ArrayView1<'_, f64>, p: ArrayView1<'_, f64>, s: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        Self::new(RateFamily::OffsetLogNormal, name, pi, p, s)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> RateFamily {
        self.family
    }

    pub fn p_obs(&self) -> &ObservationTerm {
        &self.p_obs
    }

    pub fn p_pred(&self) -> Option<&PredictiveTerm> {
        self.p_pred.as_ref()
    }

    pub fn latent(&self) -> Option<&BetaBinomialLatent> {
        self.latent.as_ref()
    }

    pub fn p_zeta(&self) -> Option<&OffsetParameter> {
        self.p_zeta.as_ref()
    }

    /// Observation log-likelihood plus the log-priors of the model's own
    /// parameter blocks (beta-binomial latent rates, offset).
    pub fn log_density(&self, pi: ArrayView1<'_, f64>, params: &FamilyParams<'_>) -> LikelihoodResult<f64> {
        let mut total = self.p_obs.log_likelihood(pi, params)?;
        if let (Some(latent), FamilyParams::Latent { p_alpha, pi_latent }) = (&self.latent, params) {
            total += latent.log_prior(*p_alpha, pi, *pi_latent)?;
        }
        if let (Some(zeta), FamilyParams::OffsetSpread { zeta: value, .. }) = (&self.p_zeta, params) {
            total += zeta.log_prior(*value);
        }
        Ok(total)
    }

    /// Predictive draw, or `None` for models without a predictive term.
    pub fn sample_predictive<R: Rng + ?Sized>(
        &self, pi: ArrayView1<'_, f64>, params: &FamilyParams<'_>, rng: &mut R,
    ) -> LikelihoodResult<Option<Array1<f64>>> {
        self.p_pred.as_ref().map(|term| term.sample(pi, params, rng)).transpose()
    }
}

fn precision(sigma: f64, s: f64) -> f64 {
    (sigma.powi(2) + s.powi(2)).recip()
}

fn predictive_spread(family: RateFamily, spread: ArrayView1<'_, f64>) -> Array1<f64> {
    match family {
        RateFamily::Binomial | RateFamily::BetaBinomial => spread.mapv(|n| {
            let trials = n.trunc();
            if trials == 0.0 { PREDICTIVE_N } else { trials }
        }),
        RateFamily::Poisson => spread.mapv(|n| if n == 0.0 { PREDICTIVE_N } else { n }),
        RateFamily::NegativeBinomial | RateFamily::NegativeBinomialLowerBound => {
            spread.mapv(|n| if n == 0.0 { PREDICTIVE_N_NEG_BINOM } else { n })
        }
        RateFamily::Normal | RateFamily::LogNormal | RateFamily::OffsetLogNormal => {
            spread.mapv(|s| if s.is_infinite() { 0.0 } else { s })
        }
    }
}

fn binomial_draw<R: Rng + ?Sized>(trials: f64, rate: f64, rng: &mut R) -> LikelihoodResult<f64> {
    let successes = Binomial::new(trials as u64, rate)?.sample(rng);
    Ok(successes as f64 / trials)
}

/// Gamma–Poisson mixture with mean `mu` and dispersion `delta`.
fn negative_binomial_draw<R: Rng + ?Sized>(mu: f64, delta: f64, rng: &mut R) -> LikelihoodResult<f64> {
    let intensity: f64 = Gamma::new(delta, mu / delta)?.sample(rng);
    if intensity <= 0.0 {
        return Ok(0.0);
    }
    Ok(Poisson::new(intensity)?.sample(rng))
}

fn check_rate_length(what: &'static str, rates: ArrayView1<'_, f64>, expected: usize) -> LikelihoodResult<()> {
    if rates.len() != expected {
        return Err(LikelihoodError::LengthMismatch { what, expected, actual: rates.len() });
    }
    Ok(())
}

fn wrong_parameters(name: &str, family: RateFamily) -> LikelihoodError {
    LikelihoodError::WrongParameters { model: name.to_string(), expected: family.expected_params() }
}
