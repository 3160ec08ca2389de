//! Derivatives on non-uniform radial grids.
//!
//! ## Purpose
//!
//! Rotation curves are sampled at irregular radii. This module differentiates
//! a sampled profile with respect to radius without resampling it first.
//!
//! ## Key concepts
//!
//! * **Interior**: Second-order central difference weighted by the left and
//!   right spacings `h_l`, `h_r`:
//!   `f'(x_i) ≈ (h_l² (f_{i+1} − f_i) + h_r² (f_i − f_{i−1})) / (h_l h_r (h_l + h_r))`.
//! * **Ends**: First-order one-sided differences.
//!
//! ## Invariants
//!
//! * A constant profile has a derivative of exactly zero everywhere.
//! * A linear profile is differentiated exactly (up to rounding).
//! * Output length equals input length.
//!
//! ## Non-goals
//!
//! * This module does not validate that radii are strictly increasing;
//!   coincident radii produce non-finite values.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

/// Derivative of `f` with respect to `x` on a non-uniform grid.
///
/// Profiles with fewer than two samples have no defined slope and return zeros.
pub fn gradient<T: Float>(f: &[T], x: &[T]) -> Vec<T> {
    let n = f.len().min(x.len());
    if n < 2 {
        return vec![T::zero(); n];
    }

    let mut out = Vec::with_capacity(n);
    out.push((f[1] - f[0]) / (x[1] - x[0]));

    for i in 1..n - 1 {
        let hl = x[i] - x[i - 1];
        let hr = x[i + 1] - x[i];
        // Differences first, so a flat profile gives an exact zero.
        let num = hl * hl * (f[i + 1] - f[i]) + hr * hr * (f[i] - f[i - 1]);
        out.push(num / (hl * hr * (hl + hr)));
    }

    out.push((f[n - 1] - f[n - 2]) / (x[n - 1] - x[n - 2]));
    out
}
