//! Observation batches for rate models.
//!
//! Purpose
//! -------
//! Provide a small, validated container for the observed side of a rate
//! model: one observed rate `p` per row, paired with either an effective
//! sample size `n` (count models) or a standard error `s` (normal-family
//! models). Constructors enforce the sign conventions once, so evaluation
//! code can assume clean data.
//!
//! Invariants & assumptions
//! ------------------------
//! - `p` and its companion array have equal, non-zero length.
//! - `p` is finite and `>= 0` everywhere; log-scale batches require `p > 0`.
//! - Sample sizes are finite and `>= 0` (or `> 0` for left-censored
//!   batches); zero is a legal sample size with a defined predictive
//!   substitution.
//! - Standard errors are `>= 0`; `+∞` is legal and marks a row that is
//!   excluded from the likelihood.
//!
//! Notes
//! -----
//! - NaN fails every sign check and is reported as the corresponding
//!   "negative" error.
use ndarray::{Array1, ArrayView1};

use crate::likelihood::errors::{LikelihoodError, LikelihoodResult};

/// What the companion array of a batch holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spread {
    /// Effective sample sizes `n`.
    SampleSize,
    /// Standard errors `s` of the observed rates.
    StandardError,
}

/// `ObservationBatch` — observed rates plus sample sizes or standard errors.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationBatch {
    p: Array1<f64>,
    spread: Array1<f64>,
    kind: Spread,
}

impl ObservationBatch {
    /// Build a count-data batch.
    ///
    /// Parameters
    /// ----------
    /// - `p`: `ArrayView1<f64>`
    ///   Observed rates, one per row. Must be finite and `>= 0`.
    /// - `n`: `ArrayView1<f64>`
    ///   Effective sample sizes, same length as `p`. Must be finite and
    ///   `>= 0`; zero is legal.
    ///
    /// Returns
    /// -------
    /// `LikelihoodResult<ObservationBatch>`
    ///   A batch of kind [`Spread::SampleSize`] owning copies of both arrays.
    ///
    /// Errors
    /// ------
    /// - `LikelihoodError::EmptyBatch` / `LengthMismatch` for shape problems.
    /// - `LikelihoodError::NegativeValue` / `NegativeDenominator` at the
    ///   first negative or NaN entry.
    /// - `LikelihoodError::NonFiniteValue` at the first infinite entry.
    pub fn with_sample_size(p: ArrayView1<'_, f64>, n: ArrayView1<'_, f64>) -> LikelihoodResult<Self> {
        check_lengths(p, n, "effective sample sizes")?;
        check_non_negative_values(p)?;
        for (index, &value) in n.iter().enumerate() {
            if !(value >= 0.0) {
                return Err(LikelihoodError::NegativeDenominator { index, value });
            }
            if !value.is_finite() {
                return Err(LikelihoodError::NonFiniteValue { what: "Effective sample size", index, value });
            }
        }
        Ok(ObservationBatch { p: p.to_owned(), spread: n.to_owned(), kind: Spread::SampleSize })
    }

    /// Count data with strictly positive sample sizes.
    pub fn with_positive_sample_size(
        p: ArrayView1<'_, f64>, n: ArrayView1<'_, f64>,
    ) -> LikelihoodResult<Self> {
        let batch = Self::with_sample_size(p, n)?;
        if let Some((index, &value)) = batch.spread.iter().enumerate().find(|(_, v)| **v <= 0.0) {
            return Err(LikelihoodError::NonPositiveDenominator { index, value });
        }
        Ok(batch)
    }

    /// Build a batch of rates with standard errors.
    ///
    /// Parameters
    /// ----------
    /// - `p`: `ArrayView1<f64>`
    ///   Observed rates. Must be finite and `>= 0`.
    /// - `s`: `ArrayView1<f64>`
    ///   Standard errors, same length as `p`. Must be `>= 0`; `+∞` marks a
    ///   row left out of the likelihood.
    ///
    /// Returns
    /// -------
    /// `LikelihoodResult<ObservationBatch>`
    ///   A batch of kind [`Spread::StandardError`].
    ///
    /// Errors
    /// ------
    /// - `LikelihoodError::EmptyBatch` / `LengthMismatch` for shape problems.
    /// - `LikelihoodError::NegativeValue` / `NonFiniteValue` for a bad rate.
    /// - `LikelihoodError::NegativeStandardError` for a negative or NaN `s`.
    pub fn with_standard_error(p: ArrayView1<'_, f64>, s: ArrayView1<'_, f64>) -> LikelihoodResult<Self> {
        check_lengths(p, s, "standard errors")?;
        check_non_negative_values(p)?;
        for (index, &value) in s.iter().enumerate() {
            if !(value >= 0.0) {
                return Err(LikelihoodError::NegativeStandardError { index, value });
            }
        }
        Ok(ObservationBatch { p: p.to_owned(), spread: s.to_owned(), kind: Spread::StandardError })
    }

    /// Log-scale rates with standard errors: `p > 0`, `s >= 0`.
    pub fn with_positive_rates(p: ArrayView1<'_, f64>, s: ArrayView1<'_, f64>) -> LikelihoodResult<Self> {
        let batch = Self::with_standard_error(p, s)?;
        if let Some((index, &value)) = batch.p.iter().enumerate().find(|(_, v)| **v <= 0.0) {
            return Err(LikelihoodError::NonPositiveValue { index, value });
        }
        Ok(batch)
    }

    pub fn len(&self) -> usize {
        self.p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }

    /// Observed rates.
    pub fn p(&self) -> ArrayView1<'_, f64> {
        self.p.view()
    }

    /// Sample sizes or standard errors, depending on [`Self::kind`].
    pub fn spread(&self) -> ArrayView1<'_, f64> {
        self.spread.view()
    }

    pub fn kind(&self) -> Spread {
        self.kind
    }

    /// Rows with a finite standard error (all rows for count data).
    pub fn finite_rows(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.spread[i].is_finite()).collect()
    }
}

fn check_lengths(p: ArrayView1<'_, f64>, other: ArrayView1<'_, f64>, what: &'static str) -> LikelihoodResult<()> {
    if p.is_empty() {
        return Err(LikelihoodError::EmptyBatch);
    }
    if other.len() != p.len() {
        return Err(LikelihoodError::LengthMismatch { what, expected: p.len(), actual: other.len() });
    }
    Ok(())
}

fn check_non_negative_values(p: ArrayView1<'_, f64>) -> LikelihoodResult<()> {
    for (index, &value) in p.iter().enumerate() {
        if !(value >= 0.0) {
            return Err(LikelihoodError::NegativeValue { index, value });
        }
        if !value.is_finite() {
            return Err(LikelihoodError::NonFiniteValue { what: "Observed value", index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the sign and length checks of each batch constructor
    // and the finite-row selection used by the normal-family models.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Zero sample sizes are legal for ordinary count batches but rejected
    // for strictly positive ones.
    fn zero_sample_size_policy() {
        let p = array![0.1, 0.0];
        let n = array![10.0, 0.0];

        assert!(ObservationBatch::with_sample_size(p.view(), n.view()).is_ok());
        assert_eq!(
            ObservationBatch::with_positive_sample_size(p.view(), n.view()).unwrap_err(),
            LikelihoodError::NonPositiveDenominator { index: 1, value: 0.0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Negative values, sample sizes and standard errors are rejected with
    // the first offending index.
    fn rejects_negative_inputs() {
        assert_eq!(
            ObservationBatch::with_sample_size(array![0.1, -0.2].view(), array![1.0, 1.0].view())
                .unwrap_err(),
            LikelihoodError::NegativeValue { index: 1, value: -0.2 }
        );
        assert_eq!(
            ObservationBatch::with_sample_size(array![0.1].view(), array![-5.0].view()).unwrap_err(),
            LikelihoodError::NegativeDenominator { index: 0, value: -5.0 }
        );
        assert_eq!(
            ObservationBatch::with_standard_error(array![0.1].view(), array![-0.01].view())
                .unwrap_err(),
            LikelihoodError::NegativeStandardError { index: 0, value: -0.01 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Infinite rates and sample sizes are validation errors, while an
    // infinite standard error stays legal.
    //
    // Given
    // -----
    // - `n = [10, ∞]` with finite rates.
    // - `p = [∞]` with a finite sample size and with a finite standard error.
    // - `s = [∞]` with a finite rate.
    //
    // Expect
    // ------
    // - `NonFiniteValue` at the offending index for the first two cases,
    //   classified as validation.
    // - The infinite standard error is accepted.
    fn rejects_non_finite_rates_and_sample_sizes() {
        let err = ObservationBatch::with_sample_size(array![0.1, 0.2].view(), array![10.0, f64::INFINITY].view())
            .unwrap_err();
        assert_eq!(
            err,
            LikelihoodError::NonFiniteValue { what: "Effective sample size", index: 1, value: f64::INFINITY }
        );
        assert!(err.is_validation());

        let inf_p = array![f64::INFINITY];
        assert!(matches!(
            ObservationBatch::with_sample_size(inf_p.view(), array![10.0].view()),
            Err(LikelihoodError::NonFiniteValue { index: 0, .. })
        ));
        assert!(matches!(
            ObservationBatch::with_standard_error(inf_p.view(), array![0.1].view()),
            Err(LikelihoodError::NonFiniteValue { index: 0, .. })
        ));
        assert!(ObservationBatch::with_standard_error(array![0.1].view(), array![f64::INFINITY].view()).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Log-scale batches need strictly positive observations.
    fn positive_rates_reject_zero() {
        let err = ObservationBatch::with_positive_rates(array![0.2, 0.0].view(), array![0.1, 0.1].view())
            .unwrap_err();

        assert_eq!(err, LikelihoodError::NonPositiveValue { index: 1, value: 0.0 });
        assert!(err.is_validation());
    }

    #[test]
    // Purpose
    // -------
    // Length mismatches and empty batches are rejected.
    fn rejects_shape_problems() {
        assert_eq!(
            ObservationBatch::with_sample_size(array![0.1, 0.2].view(), array![1.0].view())
                .unwrap_err(),
            LikelihoodError::LengthMismatch { what: "effective sample sizes", expected: 2, actual: 1 }
        );
        assert_eq!(
            ObservationBatch::with_standard_error(array![].view(), array![].view()).unwrap_err(),
            LikelihoodError::EmptyBatch
        );
    }

    #[test]
    // Purpose
    // -------
    // Infinite standard errors are accepted and excluded from `finite_rows`.
    fn infinite_standard_error_is_not_finite_row() {
        let batch = ObservationBatch::with_standard_error(
            array![0.1, 0.2, 0.3].view(),
            array![0.01, f64::INFINITY, 0.0].view(),
        )
        .unwrap();

        assert_eq!(batch.finite_rows(), vec![0, 2]);
        assert_eq!(batch.kind(), Spread::StandardError);
    }
}
