//! Expert priors — constraints built from structured parameters.
//!
//! Purpose
//! -------
//! Build constraints that act on model quantities directly rather than
//! through the prior string. Each builder reads [`PriorParameters`] and
//! returns `None` when the parameters it needs are absent.
//!
//! Key behaviors
//! -------------
//! - [`level_constraints`]: derives a level-constrained copy of the
//!   unconstrained rate curve (fixed to `value` before `age_before` and after
//!   `age_after`, then clipped into `[lower, upper]`). A similarity potential
//!   ties it back to the unconstrained curve.
//! - [`derivative_constraints`]: penalizes the summed, clipped violations of
//!   the first difference over the increasing and decreasing windows.
//! - [`covariate_level_constraints`]: bounds the worst-case covariate-shifted
//!   rate (max/min random effect per hierarchy level plus the extreme
//!   fixed-effect shift over the observed covariate range) inside the
//!   declared log-bounds.
//!
//! Conventions
//! -----------
//! - Parameter ages are shifted by the first mesh age and clipped to
//!   `[0, len(mesh)]` before use as positions.
//! - Derivative and covariate penalties use the Gaussian kernel with
//!   precision [`DERIVATIVE_PRECISION`] (σ = 1e-6), i.e. they are near-hard.
use std::ops::Range;

use ndarray::{Array1, ArrayView1, ArrayView2, Axis, s};
use tracing::debug;

use crate::{
    priors::{
        core::{age_mesh::AgeMesh, constants::DERIVATIVE_PRECISION, parameters::PriorParameters},
        errors::{PriorError, PriorResult},
        similarity::{SimilarityPotential, similar},
    },
    utils::{clip, diff, gaussian_kernel},
};

/// Similarity settings between the constrained and unconstrained curves:
/// `(sigma_parent, sigma_difference, offset)`.
const LEVEL_SIMILARITY: (f64, f64, f64) = (0.0, 0.01, 1e-6);

fn mesh_position(age: i64, mesh: &AgeMesh) -> usize {
    (age - mesh.first_age()).clamp(0, mesh.len() as i64) as usize
}

/// Level-constrained view of an unconstrained rate curve.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConstraint {
    name: String,
    value: f64,
    age_before: usize,
    age_after: usize,
    lower: f64,
    upper: f64,
    similarity: SimilarityPotential,
}

impl LevelConstraint {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn similarity(&self) -> &SimilarityPotential {
        &self.similarity
    }

    /// Constrained curve for the current unconstrained values.
    ///
    /// Positions `< age_before` and `> age_after` are set to `value`, then
    /// every position is clipped into `[lower, upper]`.
    pub fn mu_age(&self, unconstrained: ArrayView1<'_, f64>) -> Array1<f64> {
        let n = unconstrained.len();
        let mut mu = unconstrained.to_owned();
        mu.slice_mut(s![..self.age_before.min(n)]).fill(self.value);
        if self.age_after + 1 < n {
            mu.slice_mut(s![self.age_after + 1..]).fill(self.value);
        }
        mu.mapv_inplace(|x| clip(x, self.lower, self.upper));
        mu
    }

    /// Similarity log-density between the constrained and unconstrained curves.
    ///
    /// Parameters
    /// ----------
    /// - `unconstrained`: `ArrayView1<f64>`
    ///   Current rate curve on the mesh the constraint was built for.
    ///
    /// Returns
    /// -------
    /// `PriorResult<f64>`
    ///   `0.0` when [`Self::mu_age`] leaves the curve unchanged, negative
    ///   otherwise.
    ///
    /// Errors
    /// ------
    /// - None for well-formed input: the constrained curve always has the
    ///   length of `unconstrained`.
    pub fn log_density(&self, unconstrained: ArrayView1<'_, f64>) -> PriorResult<f64> {
        let mu = self.mu_age(unconstrained);
        self.similarity.log_density(mu.view(), unconstrained)
    }
}

/// Build the level constraint for rate `name`.
///
/// Parameters
/// ----------
/// - `name`: `&str`
///   Rate label; the constraint is named `value_constrained_mu_age_{name}`.
/// - `params`: [`PriorParameters`]
///   Reads `level_value` (value and age window) and `level_bounds`.
/// - `mesh`: [`AgeMesh`]
///   Ages are shifted by its first age and clipped to its length.
///
/// Returns
/// -------
/// `Option<LevelConstraint>`
///   `None` unless both `level_value` and `level_bounds` are present.
pub fn level_constraints(name: &str, params: &PriorParameters, mesh: &AgeMesh) -> Option<LevelConstraint> {
    let (lv, bounds) = (params.level_value?, params.level_bounds?);
    let full_name = format!("value_constrained_mu_age_{name}");
    let (sigma_parent, sigma_difference, offset) = LEVEL_SIMILARITY;
    let constraint = LevelConstraint {
        similarity: similar(full_name.clone(), sigma_parent, sigma_difference, offset),
        name: full_name,
        value: lv.value,
        age_before: mesh_position(lv.age_before, mesh),
        age_after: mesh_position(lv.age_after, mesh),
        lower: bounds.lower,
        upper: bounds.upper,
    };
    debug!(
        rate = name,
        age_before = constraint.age_before,
        age_after = constraint.age_after,
        "built level constraint"
    );
    Some(constraint)
}

/// Penalty on wrongly-signed slopes of the (level-constrained) mean curve.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeConstraint {
    name: String,
    increasing: Range<usize>,
    decreasing: Range<usize>,
    tau: f64,
}

impl DerivativeConstraint {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Difference positions checked for non-negativity.
    pub fn increasing(&self) -> Range<usize> {
        self.increasing.clone()
    }

    /// Difference positions checked for non-positivity.
    pub fn decreasing(&self) -> Range<usize> {
        self.decreasing.clone()
    }

    /// Log-density for the current mean curve.
    ///
    /// Sums `clip(Δμ, -1, 0)` over the increasing window and
    /// `clip(Δμ, 0, 1)` over the decreasing window; both sums are zero (and
    /// so is the result) when the curve respects the windows.
    pub fn log_density(&self, mu_age: ArrayView1<'_, f64>) -> f64 {
        let slope = diff(mu_age, 1);
        let inc: f64 = window(slope.view(), &self.increasing).iter().map(|&d| clip(d, -1.0, 0.0)).sum();
        let dec: f64 = window(slope.view(), &self.decreasing).iter().map(|&d| clip(d, 0.0, 1.0)).sum();
        gaussian_kernel([inc, dec], self.tau)
    }
}

/// `xs[r]` with both ends clamped to `xs.len()`; an inverted range is empty.
fn window<'a>(xs: ArrayView1<'a, f64>, r: &Range<usize>) -> ArrayView1<'a, f64> {
    let hi = r.end.min(xs.len());
    let lo = r.start.min(hi);
    xs.slice_move(s![lo..hi])
}

/// Build the derivative constraint for rate `name`.
///
/// Returns `None` unless both `increasing` and `decreasing` are present.
pub fn derivative_constraints(
    name: &str, params: &PriorParameters, mesh: &AgeMesh,
) -> Option<DerivativeConstraint> {
    let (inc, dec) = (params.increasing?, params.decreasing?);
    let constraint = DerivativeConstraint {
        name: format!("mu_age_derivative_potential_{name}"),
        increasing: mesh_position(inc.age_start, mesh)..mesh_position(inc.age_end, mesh),
        decreasing: mesh_position(dec.age_start, mesh)..mesh_position(dec.age_end, mesh),
        tau: DERIVATIVE_PRECISION,
    };
    debug!(
        rate = name,
        increasing = ?constraint.increasing,
        decreasing = ?constraint.decreasing,
        "built derivative constraint"
    );
    Some(constraint)
}

/// Bound check on the worst-case covariate-shifted rate level.
///
/// `levels[j]` is the hierarchy level of random-effect column `j`; level `0`
/// marks columns that do not belong to a hierarchy level and are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct CovariateLevelConstraint {
    name: String,
    levels: Vec<usize>,
    x_max: Array1<f64>,
    x_min: Array1<f64>,
    ln_lower: f64,
    ln_upper: f64,
    tau: f64,
}

impl CovariateLevelConstraint {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column-wise `(min, max)` covariate range used for the fixed-effect shift.
    pub fn covariate_range(&self) -> (ArrayView1<'_, f64>, ArrayView1<'_, f64>) {
        (self.x_min.view(), self.x_max.view())
    }

    /// Override the range of one covariate column, e.g. to cover a
    /// covariate level absent from the observed rows.
    ///
    /// # Errors
    /// - [`PriorError::CovariateColumnOutOfRange`] if `column` is past the
    ///   last design column.
    pub fn with_covariate_range(mut self, column: usize, min: f64, max: f64) -> PriorResult<Self> {
        if column >= self.x_max.len() {
            return Err(PriorError::CovariateColumnOutOfRange { column, columns: self.x_max.len() });
        }
        self.x_min[column] = min;
        self.x_max[column] = max;
        Ok(self)
    }

    /// Log-density for the current mean curve and effect coefficients.
    ///
    /// # Errors
    /// - [`PriorError::LengthMismatch`] if `alpha` does not match the level
    ///   vector or `beta` does not match the covariate columns.
    pub fn log_density(
        &self, mu_age: ArrayView1<'_, f64>, alpha: ArrayView1<'_, f64>, beta: ArrayView1<'_, f64>,
    ) -> PriorResult<f64> {
        if alpha.len() != self.levels.len() {
            return Err(PriorError::LengthMismatch {
                what: "random effects",
                expected: self.levels.len(),
                actual: alpha.len(),
            });
        }
        if beta.len() != self.x_max.len() {
            return Err(PriorError::LengthMismatch {
                what: "fixed effects",
                expected: self.x_max.len(),
                actual: beta.len(),
            });
        }

        let mut log_mu_max = mu_age.iter().copied().fold(f64::NEG_INFINITY, f64::max).ln();
        let mut log_mu_min = mu_age.iter().copied().fold(f64::INFINITY, f64::min).ln();

        let top = self.levels.iter().copied().max().unwrap_or(0);
        for level in 1..=top {
            let members: Vec<f64> = self
                .levels
                .iter()
                .zip(alpha.iter())
                .filter(|(l, _)| **l == level)
                .map(|(_, &a)| a)
                .collect();
            if !members.is_empty() {
                log_mu_max += members.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                log_mu_min += members.iter().copied().fold(f64::INFINITY, f64::min);
            }
        }

        for ((&b, &hi), &lo) in beta.iter().zip(self.x_max.iter()).zip(self.x_min.iter()) {
            log_mu_max += (hi * b).max(lo * b);
            log_mu_min += (hi * b).min(lo * b);
        }

        let lower_violation = (log_mu_min - self.ln_lower).min(0.0);
        let upper_violation = (log_mu_max - self.ln_upper).max(0.0);
        Ok(gaussian_kernel([lower_violation, upper_violation], self.tau))
    }
}

/// Build the covariate-aware level check for rate `name`.
///
/// `design` holds one row per observation or output cell and one column per
/// fixed-effect covariate; its column-wise extremes define the covariate
/// range. `levels` gives the hierarchy level of each random-effect column.
///
/// Returns `Ok(None)` unless both `level_value` and `level_bounds` are present.
///
/// # Errors
/// - [`PriorError::EmptyCovariateDesign`] if the design has columns but no rows.
pub fn covariate_level_constraints(
    name: &str, params: &PriorParameters, design: ArrayView2<'_, f64>, levels: &[usize],
) -> PriorResult<Option<CovariateLevelConstraint>> {
    let (Some(_), Some(bounds)) = (params.level_value, params.level_bounds) else {
        return Ok(None);
    };
    if design.ncols() > 0 && design.nrows() == 0 {
        return Err(PriorError::EmptyCovariateDesign { columns: design.ncols() });
    }

    let x_max = design.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &x| acc.max(x));
    let x_min = design.fold_axis(Axis(0), f64::INFINITY, |&acc, &x| acc.min(x));
    debug!(rate = name, covariates = design.ncols(), random_effects = levels.len(), "built covariate level constraint");

    Ok(Some(CovariateLevelConstraint {
        name: format!("covariate_constraint_{name}"),
        levels: levels.to_vec(),
        x_max,
        x_min,
        ln_lower: bounds.lower.ln(),
        ln_upper: bounds.upper.ln(),
        tau: DERIVATIVE_PRECISION,
    }))
}
