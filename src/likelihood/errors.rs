//! likelihood::errors — validation and evaluation errors for rate models.
//!
//! Validation variants are raised by the model constructors and are never
//! silently corrected. Degenerate inputs with a defined substitution policy
//! (zero sample sizes in predictive draws, infinite standard errors) are not
//! errors and do not appear here.
use ndarray_rand::rand_distr::{BinomialError, GammaError, NormalError, PoissonError};
use statrs::StatsError;
use thiserror::Error;

/// Result alias for rate-model construction and evaluation.
pub type LikelihoodResult<T> = Result<T, LikelihoodError>;

/// Errors raised by observation models.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LikelihoodError {
    // ---- Input validation ----
    /// Observed value is negative (or NaN).
    #[error("Observed value at index {index} must be non-negative; got {value}")]
    NegativeValue { index: usize, value: f64 },

    /// Observed value must be strictly positive for log-scale models.
    #[error("Observed value at index {index} must be positive for a log-scale model; got {value}")]
    NonPositiveValue { index: usize, value: f64 },

    /// Effective sample size is negative (or NaN).
    #[error("Effective sample size at index {index} must be non-negative; got {value}")]
    NegativeDenominator { index: usize, value: f64 },

    /// Effective sample size must be strictly positive for this model.
    #[error("Effective sample size at index {index} must be positive; got {value}")]
    NonPositiveDenominator { index: usize, value: f64 },

    /// Standard error is negative (or NaN).
    #[error("Standard error at index {index} must be non-negative; got {value}")]
    NegativeStandardError { index: usize, value: f64 },

    /// Observed value or sample size is infinite.
    #[error("{what} at index {index} must be finite; got {value}")]
    NonFiniteValue { what: &'static str, index: usize, value: f64 },

    /// Parallel arrays differ in length.
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch { what: &'static str, expected: usize, actual: usize },

    /// Observation batch has no rows.
    #[error("Observation batch is empty.")]
    EmptyBatch,

    // ---- Configuration ----
    /// Family name not among the supported rate models.
    #[error("Unknown rate model '{name}'. Valid options are {valid}.")]
    UnknownFamily { name: String, valid: &'static str },

    // ---- Evaluation ----
    /// Parameters supplied at evaluation do not belong to the model family.
    #[error("Model '{model}' expects {expected} parameters.")]
    WrongParameters { model: String, expected: &'static str },

    /// A `statrs` distribution rejected its parameters.
    #[error("Invalid distribution parameters: {reason}")]
    InvalidDistribution { reason: String },

    /// A sampling distribution rejected its parameters.
    #[error("Predictive draw failed: {reason}")]
    SamplingFailed { reason: String },
}

impl LikelihoodError {
    /// `true` for the constructor-time validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LikelihoodError::NegativeValue { .. }
                | LikelihoodError::NonPositiveValue { .. }
                | LikelihoodError::NegativeDenominator { .. }
                | LikelihoodError::NonPositiveDenominator { .. }
                | LikelihoodError::NegativeStandardError { .. }
                | LikelihoodError::NonFiniteValue { .. }
                | LikelihoodError::LengthMismatch { .. }
                | LikelihoodError::EmptyBatch
        )
    }
}

impl From<StatsError> for LikelihoodError {
    fn from(err: StatsError) -> LikelihoodError {
        LikelihoodError::InvalidDistribution { reason: err.to_string() }
    }
}

macro_rules! sampling_error_from {
    ($($err:ty),*) => {
        $(
            impl From<$err> for LikelihoodError {
                fn from(err: $err) -> LikelihoodError {
                    LikelihoodError::SamplingFailed { reason: err.to_string() }
                }
            }
        )*
    };
}

sampling_error_from!(BinomialError, GammaError, NormalError, PoissonError);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Validation variants are classified as such; evaluation variants are not.
    fn classifies_validation_errors() {
        assert!(LikelihoodError::NegativeValue { index: 0, value: -1.0 }.is_validation());
        assert!(LikelihoodError::EmptyBatch.is_validation());
        assert!(
            LikelihoodError::NonFiniteValue { what: "Observed value", index: 0, value: f64::INFINITY }
                .is_validation()
        );
        assert!(
            !LikelihoodError::SamplingFailed { reason: "x".to_string() }.is_validation()
        );
    }

    #[test]
    // Purpose
    // -------
    // Messages carry the offending index and value.
    fn messages_carry_payload() {
        let msg = LikelihoodError::NonPositiveDenominator { index: 3, value: 0.0 }.to_string();
        assert!(msg.contains("index 3"));
        assert!(msg.contains('0'));
    }
}
