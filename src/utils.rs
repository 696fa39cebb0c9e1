//! utils — small numeric helpers shared by prior potentials and likelihoods.
//!
//! Purpose
//! -------
//! Collect the handful of array/scalar primitives that both the prior
//! compiler (`priors`) and the observation models (`likelihood`) lean on, so
//! each term's evaluation code reads as the formula it implements.
//!
//! Key behaviors
//! -------------
//! - [`diff`]: n-th order forward differences (NumPy `diff` semantics).
//! - [`gaussian_kernel`]: the unnormalized zero-mean Gaussian log-kernel
//!   `-½·τ·Σx²` used by every soft constraint.
//! - [`xlogy`]: `x·ln(y)` with the `0·ln(0) = 0` convention.
//! - [`clip`]: NumPy-style clip that never panics on inverted bounds.
//!
//! Conventions
//! -----------
//! - Helpers are pure and allocation-light; none of them log or fail.
//! - Array helpers take `ArrayView1` and return owned `Array1` values.
//! - An empty input is always valid and yields an empty/zero result.

use ndarray::{Array1, ArrayView1, s};

/// n-th order forward differences of `values`.
///
/// Matches NumPy: each pass shortens the array by one, and asking for more
/// differences than there are gaps returns an empty array.
pub fn diff(values: ArrayView1<'_, f64>, order: usize) -> Array1<f64> {
    let mut out = values.to_owned();
    for _ in 0..order {
        if out.len() < 2 {
            return Array1::zeros(0);
        }
        let next = &out.slice(s![1..]) - &out.slice(s![..-1]);
        out = next;
    }
    out
}

/// Unnormalized zero-mean Gaussian log-kernel `-½·τ·Σ xᵢ²`.
///
/// Returns exactly `0.0` when every `xᵢ` is zero (or the iterator is empty),
/// which is what lets one-sided penalties vanish on compliant inputs.
pub fn gaussian_kernel<I>(xs: I, tau: f64) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let ss: f64 = xs.into_iter().map(|x| x * x).sum();
    if ss == 0.0 { 0.0 } else { -0.5 * tau * ss }
}

/// `x·ln(y)`, defined as `0` when `x == 0` regardless of `y`.
pub fn xlogy(x: f64, y: f64) -> f64 {
    if x == 0.0 { 0.0 } else { x * y.ln() }
}

/// Clip `x` into `[lower, upper]` as `min(max(x, lower), upper)`.
///
/// Unlike `f64::clamp` this does not panic when `lower > upper`; the upper
/// bound wins, as with `numpy.clip`.
pub fn clip(x: f64, lower: f64, upper: f64) -> f64 {
    x.max(lower).min(upper)
}
