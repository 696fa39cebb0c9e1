//! Age mesh and age-range resolution.
//!
//! Purpose
//! -------
//! Hold the ordered integer ages at which a rate function is evaluated and
//! resolve inclusive age ranges to positions in that mesh. Every
//! range-scoped directive and expert prior goes through
//! [`AgeMesh::indices_for_range`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The mesh is non-empty; ordering is whatever the caller supplied and is
//!   preserved by resolution.
//! - An empty resolution is valid; downstream potentials treat it as a zero
//!   contribution.
use crate::priors::{
    core::constants::{MAX_AGE, MESH_MAX_AGE},
    errors::{PriorError, PriorResult},
};

/// `AgeMesh` — ages at which a rate function is evaluated.
///
/// Shared by every potential referencing the same rate function; position
/// `i` of the rate vector corresponds to `ages()[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeMesh {
    ages: Vec<i64>,
}

impl AgeMesh {
    /// Build a mesh from explicit ages.
    ///
    /// Parameters
    /// ----------
    /// - `ages`: `Vec<i64>`
    ///   Integer ages in mesh order. Directive ranges resolve to positions in
    ///   this vector, and expert priors shift by its first entry.
    ///
    /// Returns
    /// -------
    /// `PriorResult<AgeMesh>`
    ///   The mesh, owning `ages` unchanged.
    ///
    /// Errors
    /// ------
    /// - `PriorError::EmptyAgeMesh`
    ///   Returned when `ages` is empty.
    pub fn new(ages: Vec<i64>) -> PriorResult<Self> {
        if ages.is_empty() {
            return Err(PriorError::EmptyAgeMesh);
        }
        Ok(AgeMesh { ages })
    }

    /// The standard one-year mesh `0, 1, …, 100`.
    pub fn standard() -> Self {
        AgeMesh { ages: (0..=MESH_MAX_AGE).collect() }
    }

    pub fn ages(&self) -> &[i64] {
        &self.ages
    }

    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    /// First age of the mesh; expert priors measure ages relative to it.
    pub fn first_age(&self) -> i64 {
        self.ages[0]
    }

    /// Positions `i` with `age_start <= ages[i] <= age_end`, in mesh order.
    ///
    /// An inverted range (`age_start > age_end`) resolves to nothing.
    pub fn indices_for_range(&self, age_start: i64, age_end: i64) -> Vec<usize> {
        self.ages
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a >= age_start && a <= age_end)
            .map(|(i, _)| i)
            .collect()
    }

    /// All positions of the mesh.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.ages.len()).collect()
    }
}

/// Inclusive age range as written in a directive.
///
/// The raw ages are kept so a directive prints back exactly as parsed;
/// clipping to `[0, MAX_AGE]` happens in [`AgeRange::clipped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub start: i64,
    pub end: i64,
}

impl AgeRange {
    pub const fn new(start: i64, end: i64) -> Self {
        AgeRange { start, end }
    }

    /// The default range `[0, MAX_AGE]` of range-less directives.
    pub const fn full() -> Self {
        AgeRange { start: 0, end: MAX_AGE }
    }

    /// Range with both ends clipped to `[0, MAX_AGE]`.
    pub fn clipped(&self) -> Self {
        AgeRange { start: self.start.clamp(0, MAX_AGE), end: self.end.clamp(0, MAX_AGE) }
    }

    /// Clip and resolve against `mesh`.
    pub fn resolve(&self, mesh: &AgeMesh) -> Vec<usize> {
        let r = self.clipped();
        mesh.indices_for_range(r.start, r.end)
    }
}
