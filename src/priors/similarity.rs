//! Similarity potential between two rate curves.
//!
//! Penalizes log-scale divergence of a child curve from a parent curve with a
//! Gaussian kernel of precision `1 / (σ_parent² + σ_difference²)`. Values are
//! floored at `offset` before taking logs, so curves touching zero stay
//! finite. Used by [`crate::priors::expert::level_constraints`] to keep the
//! level-constrained curve close to the unconstrained one.
use ndarray::ArrayView1;

use crate::{
    priors::errors::{PriorError, PriorResult},
    utils::gaussian_kernel,
};

/// Gaussian log-scale similarity between a child and a parent curve.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityPotential {
    name: String,
    tau: f64,
    offset: f64,
}

/// Build a similarity potential.
///
/// - `sigma_parent`: uncertainty of the parent curve.
/// - `sigma_difference`: allowed log-scale spread between the curves.
/// - `offset`: floor applied before the logs.
pub fn similar(
    name: impl Into<String>, sigma_parent: f64, sigma_difference: f64, offset: f64,
) -> SimilarityPotential {
    let tau = 1.0 / (sigma_parent.powi(2) + sigma_difference.powi(2));
    SimilarityPotential { name: format!("parent_similarity_{}", name.into()), tau, offset }
}

impl SimilarityPotential {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Precision of the log-scale kernel.
    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Log-density of `child` given `parent`; `0.0` when they agree
    /// everywhere above the floor.
    ///
    /// # Errors
    /// - [`PriorError::LengthMismatch`] if the curves differ in length.
    pub fn log_density(&self, child: ArrayView1<'_, f64>, parent: ArrayView1<'_, f64>) -> PriorResult<f64> {
        if child.len() != parent.len() {
            return Err(PriorError::LengthMismatch {
                what: "similarity curves",
                expected: parent.len(),
                actual: child.len(),
            });
        }
        let offset = self.offset;
        Ok(gaussian_kernel(
            child.iter().zip(parent.iter()).map(|(&c, &p)| c.max(offset).ln() - p.max(offset).ln()),
            self.tau,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Identical curves score 0; a doubled point scores `-½τ ln²2`.
    fn penalizes_log_scale_divergence() {
        let sim = similar("x", 0.0, 0.01, 1e-6);
        let parent = array![0.1, 0.2, 0.3];
        let child = array![0.1, 0.4, 0.3];

        assert_eq!(sim.log_density(parent.view(), parent.view()).unwrap(), 0.0);
        assert_relative_eq!(
            sim.log_density(child.view(), parent.view()).unwrap(),
            -0.5 * 1e4 * 2f64.ln().powi(2),
            max_relative = 1e-12
        );
    }

    #[test]
    // Purpose
    // -------
    // Values below the offset are floored, so zeros do not produce `-inf`.
    fn floors_values_at_offset() {
        let sim = similar("x", 0.0, 0.01, 1e-6);

        let v = sim.log_density(array![0.0, 1.0].view(), array![1e-9, 1.0].view()).unwrap();

        assert_eq!(v, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Curves of different length are an evaluation error instead of a panic.
    //
    // Given
    // -----
    // - A 2-point child against a 3-point parent.
    //
    // Expect
    // ------
    // - `LengthMismatch { expected: 3, actual: 2 }`.
    fn rejects_curves_of_different_length() {
        let sim = similar("x", 0.0, 0.01, 1e-6);

        let err = sim.log_density(array![0.1, 0.2].view(), array![0.1, 0.2, 0.3].view()).unwrap_err();

        assert_eq!(err, PriorError::LengthMismatch { what: "similarity curves", expected: 3, actual: 2 });
    }
}
