//! Boundary padding for index-space filters.
//!
//! ## Purpose
//!
//! Convolution filters need samples beyond both ends of a profile. This
//! module extends a profile by a fixed number of samples on each side.
//!
//! ## Design notes
//!
//! * **Strategy Pattern**: Uses `PaddingPolicy` to select the padding method.
//! * **Allocation**: Creates a new vector; the input is never modified.
//!
//! ## Key concepts
//!
//! * **Padding strategies**: `Edge` (repeat the end value), `Reflect` (mirror
//!   about the end sample), `Zero` (pad with 0).
//!
//! ## Invariants
//!
//! * The original samples sit unchanged in the middle of the padded vector.
//! * `Reflect` width is limited to `n - 1`; the other policies pad the full width.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

// ============================================================================
// Padding Policy
// ============================================================================

/// Policy for extending a profile beyond its first and last sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingPolicy {
    /// Repeat the end values.
    #[default]
    Edge,

    /// Mirror values about the end samples (the end sample is not repeated).
    Reflect,

    /// Pad with zeros.
    Zero,
}

// ============================================================================
// Padding Function
// ============================================================================

/// Pad `y` with `width` samples on each side.
///
/// Returns the padded vector and the width actually used.
pub fn pad<T: Float>(y: &[T], width: usize, policy: PaddingPolicy) -> (Vec<T>, usize) {
    let n = y.len();
    if n == 0 || width == 0 {
        return (y.to_vec(), 0);
    }

    let width = match policy {
        PaddingPolicy::Reflect => width.min(n - 1),
        _ => width,
    };
    if width == 0 {
        return (y.to_vec(), 0);
    }

    let mut out = Vec::with_capacity(n + 2 * width);

    // 1. Prepend
    match policy {
        PaddingPolicy::Edge => out.extend(core::iter::repeat(y[0]).take(width)),
        PaddingPolicy::Reflect => out.extend((1..=width).rev().map(|i| y[i])),
        PaddingPolicy::Zero => out.extend(core::iter::repeat(T::zero()).take(width)),
    }

    // 2. Original samples
    out.extend_from_slice(y);

    // 3. Append
    match policy {
        PaddingPolicy::Edge => out.extend(core::iter::repeat(y[n - 1]).take(width)),
        PaddingPolicy::Reflect => out.extend((1..=width).map(|i| y[n - 1 - i])),
        PaddingPolicy::Zero => out.extend(core::iter::repeat(T::zero()).take(width)),
    }

    (out, width)
}
