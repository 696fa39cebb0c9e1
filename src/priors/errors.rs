//! priors::errors — configuration and evaluation errors for prior terms.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias for the prior mini-language,
//! structured prior parameters, expert-prior builders and the evaluation of
//! compiled terms. Every variant except `LengthMismatch` is a
//! *configuration* failure: it is raised before any potential is built and
//! aborts the model build. `LengthMismatch` is raised when a compiled term is
//! evaluated on arrays of the wrong length.
//!
//! Conventions
//! -----------
//! - Messages name the offending directive or field and, for grammar errors,
//!   the full specification string so the caller can locate the problem.
//! - Degenerate numeric inputs that have a defined policy (empty age windows,
//!   zero-width ranges) are *not* errors and never surface here.
use thiserror::Error;

/// Result alias for prior compilation.
pub type PriorResult<T> = Result<T, PriorError>;

/// Errors raised while parsing or compiling a prior specification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriorError {
    // ---- Grammar ----
    /// Directive name is not part of the prior language.
    #[error("Unrecognized prior directive '{name}' in specification '{spec}'")]
    UnrecognizedDirective { name: String, spec: String },

    /// Directive is missing a required argument.
    #[error("Directive '{directive}' expects {expected} argument(s); got {actual} in '{spec}'")]
    MissingArgument { directive: String, expected: &'static str, actual: usize, spec: String },

    /// Directive carries more arguments than its grammar allows.
    #[error("Directive '{directive}' accepts {expected} argument(s); got {actual} in '{spec}'")]
    UnexpectedArgument { directive: String, expected: &'static str, actual: usize, spec: String },

    /// A numeric field did not parse as the required type.
    #[error("Directive '{directive}' has malformed {kind} field '{field}' in '{spec}'")]
    MalformedNumber { directive: String, kind: &'static str, field: String, spec: String },

    /// Extremum bounds scale their precision by `1/val²` and need `val > 0`.
    #[error("Directive '{directive}' needs a finite bound > 0; got {value}")]
    NonPositiveBound { directive: String, value: f64 },

    // ---- Model inputs ----
    /// Age mesh must contain at least one age.
    #[error("Age mesh must contain at least one age.")]
    EmptyAgeMesh,

    /// Smoothness label outside the translation table.
    #[error("Unknown smoothness level '{label}'")]
    UnknownSmoothness { label: String },

    /// Confidence label outside the translation table.
    #[error("Unknown confidence level '{label}'")]
    UnknownConfidence { label: String },

    /// Covariate design has columns but no rows to take ranges from.
    #[error("Covariate design with {columns} column(s) has no rows.")]
    EmptyCovariateDesign { columns: usize },

    /// Covariate column index past the end of the design.
    #[error("Covariate column {column} is out of range for a design with {columns} column(s).")]
    CovariateColumnOutOfRange { column: usize, columns: usize },

    /// Structured parameters could not be deserialized.
    #[error("Invalid prior parameters: {reason}")]
    InvalidParameters { reason: String },

    // ---- Evaluation ----
    /// Values handed to a compiled term do not match its shape.
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch { what: &'static str, expected: usize, actual: usize },
}

impl PriorError {
    /// `true` for errors raised while building terms, `false` for
    /// evaluation-time shape errors. Mirrors
    /// [`crate::likelihood::LikelihoodError::is_validation`].
    pub fn is_configuration(&self) -> bool {
        !matches!(self, PriorError::LengthMismatch { .. })
    }

    /// Replace the specification string carried by grammar errors.
    ///
    /// Line-level parsing only sees one directive; the caller that split the
    /// full specification re-attaches it here.
    pub(crate) fn with_spec(self, full: &str) -> Self {
        let spec = full.to_string();
        match self {
            PriorError::UnrecognizedDirective { name, .. } => {
                PriorError::UnrecognizedDirective { name, spec }
            }
            PriorError::MissingArgument { directive, expected, actual, .. } => {
                PriorError::MissingArgument { directive, expected, actual, spec }
            }
            PriorError::UnexpectedArgument { directive, expected, actual, .. } => {
                PriorError::UnexpectedArgument { directive, expected, actual, spec }
            }
            PriorError::MalformedNumber { directive, kind, field, .. } => {
                PriorError::MalformedNumber { directive, kind, field, spec }
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for PriorError {
    fn from(err: serde_json::Error) -> PriorError {
        PriorError::InvalidParameters { reason: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The unrecognized-directive message names both the directive and the
    // full specification string.
    fn unrecognized_directive_message_names_spec() {
        let err = PriorError::UnrecognizedDirective {
            name: "wiggly".to_string(),
            spec: "smooth 10,wiggly 3".to_string(),
        };

        let msg = err.to_string();

        assert!(msg.contains("wiggly"));
        assert!(msg.contains("smooth 10,wiggly 3"));
        assert!(err.is_configuration());
    }

    #[test]
    // Purpose
    // -------
    // `with_spec` swaps in the full specification for grammar errors and
    // leaves other variants untouched.
    fn with_spec_reattaches_full_specification() {
        let err = PriorError::MalformedNumber {
            directive: "zero".to_string(),
            kind: "age",
            field: "x".to_string(),
            spec: "zero x 5".to_string(),
        };

        let err = err.with_spec("smooth 1,zero x 5");

        match err {
            PriorError::MalformedNumber { spec, .. } => assert_eq!(spec, "smooth 1,zero x 5"),
            other => panic!("unexpected variant: {other:?}"),
        }
        assert_eq!(PriorError::EmptyAgeMesh.with_spec("x"), PriorError::EmptyAgeMesh);
    }

    #[test]
    // Purpose
    // -------
    // Build-time failures are configuration errors; evaluation-time length
    // mismatches are not.
    //
    // Given
    // -----
    // - A `LengthMismatch` on rate values, an empty covariate design and an
    //   out-of-range covariate column.
    //
    // Expect
    // ------
    // - Only the length mismatch is excluded from the configuration class.
    fn length_mismatch_is_not_configuration() {
        let eval = PriorError::LengthMismatch { what: "rate values", expected: 101, actual: 2 };

        assert!(!eval.is_configuration());
        assert!(PriorError::EmptyCovariateDesign { columns: 2 }.is_configuration());
        assert!(PriorError::CovariateColumnOutOfRange { column: 3, columns: 1 }.is_configuration());
    }
}
