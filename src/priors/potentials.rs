//! Prior potentials — soft-constraint terms compiled from a prior specification.
//!
//! Purpose
//! -------
//! Turn each directive of a [`PriorSpec`] into a [`PriorPotential`]: a value
//! object holding the resolved mesh indices and the numeric parameters of one
//! soft constraint, with a pure [`PriorPotential::log_density`] that the
//! inference engine re-evaluates whenever the rate function changes.
//!
//! Key behaviors
//! -------------
//! - `smooth`: Gaussian kernel on first differences of `ln(max(ε, f))`.
//! - `zero` / `level_value`: Gaussian kernel on `f - value` with precision
//!   [`HARD_PRECISION`].
//! - `increasing`/`decreasing`/`convex_up`/`convex_down`: Gaussian kernel on
//!   the magnitudes of wrongly-signed first/second differences.
//! - `unimodal`: linear penalty on differences that contradict a single mode
//!   chosen from the interior sign changes.
//! - `max_at_least`/`at_most`/`at_least`: squared shortfall/excess of the
//!   curve extremum, scaled by `1000 / val²`.
//! - `confidence`: recognized, compiles to nothing.
//!
//! Invariants & assumptions
//! ------------------------
//! - Indices and parameters are bound when the potential is built; a
//!   potential never re-reads the specification.
//! - All penalties are one-sided: compliant inputs contribute exactly `0.0`.
//! - An empty index set (or too few points for the difference order) is a
//!   zero contribution, not an error.
//! - `log_density` gathers the rate vector at mesh positions; a vector too
//!   short for the largest position is a `PriorError::LengthMismatch`.
//!
//! Performance
//! -----------
//! - Evaluation is O(window) with one small allocation for the gathered
//!   window; no I/O, no logging, no hidden state. Results are bit-identical
//!   for identical inputs.
use ndarray::{ArrayView1, Axis};
use tracing::{debug, trace};

use crate::{
    priors::{
        core::{
            age_mesh::{AgeMesh, AgeRange},
            constants::{
                DERIVATIVE_PRECISION, EXTREMUM_SCALE, HARD_PRECISION, NEARLY_ZERO,
                UNIMODAL_PRECISION,
            },
            directive::{Directive, ExtremumBound},
            prior_spec::PriorSpec,
        },
        errors::{PriorError, PriorResult},
    },
    utils::{diff, gaussian_kernel},
};

/// Numeric form of a compiled directive.
#[derive(Debug, Clone, PartialEq)]
pub enum PotentialKind {
    /// Penalize first differences of the log-rate with precision `tau`.
    Smooth { tau: f64 },
    /// Pin the rate to `value` with precision `tau` (`zero` uses `value = 0`).
    Level { value: f64, tau: f64 },
    /// Penalize `order`-th differences `d` with `sign · d < 0`.
    DerivativeSign { order: usize, sign: f64, tau: f64 },
    /// Penalize differences contradicting a single mode, linearly in `tau`.
    Unimodal { tau: f64 },
    /// Squared violation of a bound on the curve extremum.
    Extremum { bound: ExtremumBound, value: f64, tau: f64 },
}

/// One soft-constraint term on a rate function.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorPotential {
    name: String,
    indices: Vec<usize>,
    min_len: usize,
    kind: PotentialKind,
}

impl PriorPotential {
    pub fn new(name: impl Into<String>, indices: Vec<usize>, kind: PotentialKind) -> Self {
        let min_len = indices.iter().max().map_or(0, |&i| i + 1);
        PriorPotential { name: name.into(), indices, min_len, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mesh positions this potential reads, in mesh order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn kind(&self) -> &PotentialKind {
        &self.kind
    }

    /// Shortest rate vector this potential can be evaluated on.
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Log-density contribution for the current rate values.
    ///
    /// Parameters
    /// ----------
    /// - `rate`: `ArrayView1<f64>`
    ///   Rate function on the mesh the potential was compiled against.
    ///
    /// Returns
    /// -------
    /// `PriorResult<f64>`
    ///   `0.0` when the constraint is satisfied, a negative value otherwise.
    ///   See the module docs for each kind's formula.
    ///
    /// Errors
    /// ------
    /// - `PriorError::LengthMismatch` if `rate` is shorter than
    ///   [`Self::min_len`].
    pub fn log_density(&self, rate: ArrayView1<'_, f64>) -> PriorResult<f64> {
        if rate.len() < self.min_len {
            return Err(PriorError::LengthMismatch {
                what: "rate values",
                expected: self.min_len,
                actual: rate.len(),
            });
        }
        let f = rate.select(Axis(0), &self.indices);

        let value = match self.kind {
            PotentialKind::Smooth { tau } => {
                let log_f = f.mapv(|x| x.max(NEARLY_ZERO).ln());
                gaussian_kernel(diff(log_f.view(), 1).iter().copied(), tau)
            }
            PotentialKind::Level { value, tau } => gaussian_kernel(f.iter().map(|&x| x - value), tau),
            PotentialKind::DerivativeSign { order, sign, tau } => {
                let d = diff(f.view(), order);
                gaussian_kernel(d.iter().filter(|&&x| sign * x < 0.0).map(|x| x.abs()), tau)
            }
            PotentialKind::Unimodal { tau } => unimodal_log_density(f.view(), tau),
            PotentialKind::Extremum { bound, value, tau } => {
                extremum_log_density(f.view(), bound, value, tau)
            }
        };
        Ok(value)
    }
}

/// Sum of the log-density contributions of `potentials` at `rate`.
///
/// # Errors
/// - The first `PriorError::LengthMismatch` raised by a potential.
pub fn joint_log_density(potentials: &[PriorPotential], rate: ArrayView1<'_, f64>) -> PriorResult<f64> {
    potentials.iter().map(|p| p.log_density(rate)).sum()
}

/// Parse `prior_str` and compile one potential per rate-function directive.
///
/// Parameters
/// ----------
/// - `prior_str`: `&str`
///   `,`-separated directives, e.g. `"smooth 100,zero 95 100"`. Empty
///   segments are skipped.
/// - `mesh`: [`AgeMesh`]
///   Ages the rate function is defined on; ranges resolve against it.
/// - `rate_name`: `&str`
///   Label appended to every potential name.
///
/// Returns
/// -------
/// `PriorResult<Vec<PriorPotential>>`
///   One potential per directive in input order, `confidence` excluded.
///
/// Errors
/// ------
/// - Any [`crate::priors::PriorError`] from parsing; nothing is compiled
///   unless the whole string parses.
pub fn generate_prior_potentials(
    prior_str: &str, mesh: &AgeMesh, rate_name: &str,
) -> PriorResult<Vec<PriorPotential>> {
    let spec: PriorSpec = prior_str.parse()?;
    Ok(potentials_from_spec(&spec, mesh, rate_name))
}

/// Compile an already-parsed specification.
pub fn potentials_from_spec(spec: &PriorSpec, mesh: &AgeMesh, rate_name: &str) -> Vec<PriorPotential> {
    let potentials: Vec<PriorPotential> =
        spec.directives().iter().filter_map(|d| compile_directive(d, mesh, rate_name)).collect();
    debug!(rate = rate_name, directives = spec.len(), potentials = potentials.len(), "compiled prior");
    potentials
}

/// Compile a single directive; `None` for directives that do not act on the
/// rate function (`confidence`).
pub fn compile_directive(directive: &Directive, mesh: &AgeMesh, rate_name: &str) -> Option<PriorPotential> {
    let (name, indices, kind) = match *directive {
        Directive::Smooth { tau, ages } => {
            let r = ages.unwrap_or(AgeRange::full());
            (range_name("smooth", r, rate_name), r.resolve(mesh), PotentialKind::Smooth { tau })
        }
        Directive::Zero { ages } => (
            range_name("zero", ages, rate_name),
            ages.resolve(mesh),
            PotentialKind::Level { value: 0.0, tau: HARD_PRECISION },
        ),
        Directive::LevelValue { value, ages } => {
            let r = ages.unwrap_or(AgeRange::full());
            (
                format!("value_{{{value},{},{}}}^{rate_name}", r.start, r.end),
                r.resolve(mesh),
                PotentialKind::Level { value, tau: HARD_PRECISION },
            )
        }
        Directive::Confidence { .. } => {
            trace!(rate = rate_name, "confidence directive has no rate-function potential");
            return None;
        }
        Directive::Shape { constraint, ages } => (
            range_name(constraint.as_str(), ages, rate_name),
            ages.resolve(mesh),
            PotentialKind::DerivativeSign {
                order: constraint.order(),
                sign: constraint.sign(),
                tau: DERIVATIVE_PRECISION,
            },
        ),
        Directive::Unimodal { ages } => (
            range_name("unimodal", ages, rate_name),
            ages.resolve(mesh),
            PotentialKind::Unimodal { tau: UNIMODAL_PRECISION },
        ),
        Directive::Extremum { bound, value } => (
            format!("{}{{{value}}}^{rate_name}", bound.as_str()),
            mesh.all_indices(),
            PotentialKind::Extremum { bound, value, tau: EXTREMUM_SCALE / (value * value) },
        ),
    };

    if indices.is_empty() {
        trace!(potential = %name, "age range resolves to no mesh points");
    }
    debug!(potential = %name, indices = indices.len(), "compiled prior directive");
    Some(PriorPotential::new(name, indices, kind))
}

fn range_name(prefix: &str, r: AgeRange, rate_name: &str) -> String {
    format!("{prefix}_{{{},{}}}^{rate_name}", r.start, r.end)
}

/// Linear penalty on differences that contradict a single mode.
///
/// Candidate modes are positions `j` where `df[j] > ε` and `df[j+1] < -ε`.
/// The candidate at `len / 2` of the candidate list is taken as the mode;
/// ties between equally central candidates are broken by that integer
/// division and nothing else. Differences `0..=j` must be non-negative and
/// later ones non-positive. Without a candidate the whole window must be
/// non-decreasing.
fn unimodal_log_density(f: ArrayView1<'_, f64>, tau: f64) -> f64 {
    let df = diff(f, 1);
    if df.len() < 2 {
        return 0.0;
    }
    let candidates: Vec<usize> =
        (0..df.len() - 1).filter(|&j| df[j] > NEARLY_ZERO && df[j + 1] < -NEARLY_ZERO).collect();
    let mode = candidates.get(candidates.len() / 2).copied();

    let violation: f64 = df
        .iter()
        .enumerate()
        .filter_map(|(j, &d)| {
            let sign = match mode {
                Some(m) if j > m => -1.0,
                _ => 1.0,
            };
            if sign * d < 0.0 { Some(d.abs()) } else { None }
        })
        .sum();
    if violation == 0.0 { 0.0 } else { -tau * violation }
}

fn extremum_log_density(f: ArrayView1<'_, f64>, bound: ExtremumBound, value: f64, tau: f64) -> f64 {
    if f.is_empty() {
        return 0.0;
    }
    let (observed, violated) = match bound {
        ExtremumBound::MaxAtLeast => {
            let max = f.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (max, max < value)
        }
        ExtremumBound::AtMost => {
            let max = f.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (max, max > value)
        }
        ExtremumBound::AtLeast => {
            let min = f.iter().copied().fold(f64::INFINITY, f64::min);
            (min, min < value)
        }
    };
    if violated { -tau * (observed - value).powi(2) } else { 0.0 }
}
