//! Numeric constants of the prior language.
//!
//! Precisions are expressed as Gaussian precisions `τ = 1/σ²`. The
//! near-hard constraints (`zero`, `level_value`) use `σ = 1e-10`, the
//! derivative-sign constraints `σ = 1e-6`.

/// Floor applied before taking logs of a rate.
pub const NEARLY_ZERO: f64 = 1e-10;

/// Largest age a directive range may reference; ranges are clipped to
/// `[0, MAX_AGE]` and range-less directives default to it.
pub const MAX_AGE: i64 = 101;

/// Upper age of the standard estimation mesh `0..=100`. Structured
/// `level_value` windows are only emitted when they stay inside it.
pub const MESH_MAX_AGE: i64 = 100;

/// Separator between directives in a prior string.
pub const PRIOR_SEP: char = ',';

/// Precision of the `zero` and `level_value` potentials (σ = 1e-10).
pub const HARD_PRECISION: f64 = 1e20;

/// Precision of derivative-sign and expert derivative/covariate potentials (σ = 1e-6).
pub const DERIVATIVE_PRECISION: f64 = 1e12;

/// Linear weight of the unimodal potential.
pub const UNIMODAL_PRECISION: f64 = 1000.0;

/// Numerator of the extremum-bound precision `τ = 1000 / val²`.
pub const EXTREMUM_SCALE: f64 = 1000.0;
