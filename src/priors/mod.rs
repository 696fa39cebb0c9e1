//! priors — compiler from prior specifications to soft-constraint potentials.
//!
//! Purpose
//! -------
//! Turn declarative modeling directives about an age-specific rate function
//! (smoothness, zeros, fixed levels, monotone/convex shape, unimodality,
//! extremum bounds) into numeric log-density terms that an external
//! inference engine adds to its joint density.
//!
//! Key behaviors
//! -------------
//! - Parse prior strings such as `"smooth 100,zero 95 100,increasing 0 10"`
//!   into a [`PriorSpec`], or translate structured [`PriorParameters`] into
//!   the same canonical form.
//! - Compile a spec into [`PriorPotential`] values
//!   ([`generate_prior_potentials`], [`potentials_from_spec`]), one per
//!   rate-function directive, each with its resolved mesh indices.
//! - Build expert priors that act on model quantities directly
//!   ([`level_constraints`], [`derivative_constraints`],
//!   [`covariate_level_constraints`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Specifications are validated in full before anything is compiled; any
//!   grammar problem is a [`PriorError`].
//! - Potentials are immutable value objects: they capture indices and
//!   parameters at construction time and evaluate as pure functions of the
//!   current rate values.
//! - Every potential is one-sided: compliant inputs contribute exactly zero.
//!
//! Conventions
//! -----------
//! - Constraint potentials return the unnormalized Gaussian kernel
//!   `-½·τ·Σx²` (or a linear penalty for `unimodal`); no normalizing
//!   constants are included.
//! - Compilation logs through `tracing` at `debug`/`trace`; evaluation never
//!   logs.
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to each submodule; `tests/integration_prior_pipeline.rs`
//!   exercises the string → potentials → evaluation path end to end.

pub mod core;
pub mod errors;
pub mod expert;
pub mod potentials;
pub mod similarity;

pub use self::core::{
    AgeMesh, AgeRange, AgeWindow, Confidence, Directive, ExtremumBound, LevelBounds, LevelValue,
    PriorParameters, PriorSpec, ShapeConstraint, Smoothness,
};
pub use self::errors::{PriorError, PriorResult};
pub use self::expert::{
    CovariateLevelConstraint, DerivativeConstraint, LevelConstraint, covariate_level_constraints,
    derivative_constraints, level_constraints,
};
pub use self::potentials::{
    PotentialKind, PriorPotential, generate_prior_potentials, joint_log_density, potentials_from_spec,
};
pub use self::similarity::{SimilarityPotential, similar};
