//! likelihood — observation models for age-specific rate data.
//!
//! Purpose
//! -------
//! Connect expected rates `pi`, already matched to observation rows, with
//! observed rates through one of eight likelihood families, and provide the
//! posterior-predictive draw that goes with each.
//!
//! Key behaviors
//! -------------
//! - [`ObservationBatch`] validates observed rates with their sample sizes or
//!   standard errors.
//! - [`RateModel`] holds the observation term, the predictive term and any
//!   family-specific blocks ([`BetaBinomialLatent`], [`OffsetParameter`]).
//! - [`densities`] exposes the log-density kernels the models are built on.
//!
//! Conventions
//! -----------
//! - Validation failures are [`LikelihoodError`] values raised at
//!   construction; nothing is silently clamped.
//! - Construction logs at `debug`; evaluation and sampling never log.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; predictive draws use a seeded
//!   `StdRng`.

pub mod data;
pub mod densities;
pub mod errors;
pub mod models;

pub use self::data::{ObservationBatch, Spread};
pub use self::errors::{LikelihoodError, LikelihoodResult};
pub use self::models::{
    BetaBinomialLatent, FamilyParams, ObservationTerm, OffsetParameter, PredictiveTerm, RateFamily,
    RateModel,
};
