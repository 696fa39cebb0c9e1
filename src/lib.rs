//! age_rate_terms — prior potentials and observation likelihoods for
//! age-specific disease rate models.
//!
//! Purpose
//! -------
//! Compile modeling knowledge about an age-specific rate function into
//! log-density terms that an external inference engine adds to its joint
//! density. Two families of terms are produced:
//! - prior potentials from a compact directive language or structured
//!   parameters ([`priors`]);
//! - observation likelihoods with posterior-predictive rules for eight rate
//!   models ([`likelihood`]).
//!
//! Key behaviors
//! -------------
//! - Resolve age ranges onto a discrete age mesh ([`priors::AgeMesh`]).
//! - Parse and validate prior strings like
//!   `"smooth 100,zero 95 100,increasing 0 10"` and compile them into
//!   [`priors::PriorPotential`] values.
//! - Build expert priors on model quantities (level, derivative and
//!   covariate-level constraints).
//! - Construct [`likelihood::RateModel`] values that evaluate observation
//!   log-likelihoods and draw predictive rates.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every term is a pure function of the values it is handed; the crate
//!   holds no sampler state and owns no RNG.
//! - Inputs are validated once at construction; evaluation assumes
//!   validated data.
//!
//! Conventions
//! -----------
//! - Ages are integer years; the standard mesh covers `0..=100`.
//! - Errors are per-subsystem enums ([`priors::PriorError`],
//!   [`likelihood::LikelihoodError`]) with `Result` aliases.
//! - Logging goes through `tracing`; the crate never installs a subscriber.
//!
//! Downstream usage
//! ----------------
//! - Import [`prelude`] for the common entry points, or depend on the
//!   submodules directly.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds end-to-end checks
//!   from prior strings and structured parameters through to evaluated
//!   terms.

pub mod likelihood;
pub mod priors;
pub mod utils;

/// Common entry points.
pub mod prelude {
    pub use crate::likelihood::{
        FamilyParams, LikelihoodError, LikelihoodResult, RateFamily, RateModel,
    };
    pub use crate::priors::{
        AgeMesh, PriorError, PriorParameters, PriorPotential, PriorResult, PriorSpec,
        derivative_constraints, generate_prior_potentials, joint_log_density, level_constraints,
    };
}
