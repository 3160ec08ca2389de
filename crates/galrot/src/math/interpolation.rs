//! Piecewise-linear interpolation on sorted abscissae.
//!
//! ## Purpose
//!
//! Curves from different sources (observed, baseline, basis, derived
//! profiles) rarely share a radius grid. This module moves values between
//! grids, and interpolates across the basis-scale axis.
//!
//! ## Design notes
//!
//! * **Clamped**: [`interp`] returns the end values outside `[xp_0, xp_last]`.
//! * **Filled**: [`interp_or`] returns caller-supplied fill values outside the range,
//!   which is how observed curves are kept from being extrapolated.
//! * **Search**: Binary search per query point; queries need not be sorted.
//!
//! ## Invariants
//!
//! * `xp` must be non-decreasing. Duplicate abscissae take the right-most value.
//! * Interpolated values lie between the two bracketing samples.
//!
//! ## Non-goals
//!
//! * No extrapolation and no higher-order schemes.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

// ============================================================================
// Scalar Interpolation
// ============================================================================

/// Linear interpolation of `(xp, fp)` at `x`, clamped to the end values.
///
/// Empty tables yield NaN.
#[inline]
pub fn interp<T: Float>(x: T, xp: &[T], fp: &[T]) -> T {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return T::nan();
    }
    interp_or(x, xp, fp, fp[0], fp[n - 1])
}

/// Linear interpolation of `(xp, fp)` at `x`, with explicit fill values
/// left and right of the table.
pub fn interp_or<T: Float>(x: T, xp: &[T], fp: &[T], left: T, right: T) -> T {
    let n = xp.len().min(fp.len());
    if n == 0 || x.is_nan() {
        return T::nan();
    }
    if x < xp[0] {
        return left;
    }
    if x > xp[n - 1] {
        return right;
    }
    if x == xp[n - 1] {
        return fp[n - 1];
    }

    // First index with xp[j] > x; x >= xp[0] guarantees j >= 1.
    let j = xp[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (y0, y1) = (fp[j - 1], fp[j]);
    let dx = x1 - x0;
    if dx <= T::zero() {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / dx
}

// ============================================================================
// Vectorized Helpers
// ============================================================================

/// Clamped interpolation at every point of `xs`.
pub fn resample<T: Float>(xs: &[T], xp: &[T], fp: &[T]) -> Vec<T> {
    xs.iter().map(|&x| interp(x, xp, fp)).collect()
}

/// Interpolation at every point of `xs`, filling with `fill` outside the table.
pub fn resample_or<T: Float>(xs: &[T], xp: &[T], fp: &[T], fill: T) -> Vec<T> {
    xs.iter().map(|&x| interp_or(x, xp, fp, fill, fill)).collect()
}

/// Clamp `v` into `[lo, hi]`.
#[inline]
pub fn clip<T: Float>(v: T, lo: T, hi: T) -> T {
    v.max(lo).min(hi)
}

/// `true` when both grids have the same length and agree within `atol` pointwise.
pub fn allclose<T: Float>(a: &[T], b: &[T], atol: T) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| (x - y).abs() <= atol)
}
