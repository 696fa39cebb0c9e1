//! core — grammar, mesh, and parameter types of the prior compiler.
//!
//! Purpose
//! -------
//! Collect the building blocks the potential factory and expert-prior
//! builders work from: the age mesh and range resolution ([`AgeMesh`],
//! [`AgeRange`]), the directive grammar ([`Directive`], [`PriorSpec`]), the
//! structured parameter form ([`PriorParameters`]) and the model constants.
//!
//! Conventions
//! -----------
//! - Everything here is plain data plus parsing; no potential is evaluated
//!   in this module and nothing logs.
//! - Ages are integers; positions into a rate vector are `usize` indices
//!   into the mesh.

pub mod age_mesh;
pub mod constants;
pub mod directive;
pub mod parameters;
pub mod prior_spec;

pub use self::{
    age_mesh::{AgeMesh, AgeRange},
    directive::{Directive, ExtremumBound, ShapeConstraint},
    parameters::{AgeWindow, Confidence, LevelBounds, LevelValue, PriorParameters, Smoothness},
    prior_spec::PriorSpec,
};
