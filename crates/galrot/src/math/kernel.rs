//! Index-space Gaussian smoothing.
//!
//! ## Purpose
//!
//! Differentiating a sampled acceleration profile amplifies sample-to-sample
//! noise. This module provides a fixed, untuned Gaussian filter in index
//! space that can be applied before differentiation, and for display
//! smoothing of derived profiles.
//!
//! ## Design notes
//!
//! * **Index space**: `sigma` is measured in samples, not kpc, so the filter
//!   does not depend on the physical sampling of a galaxy.
//! * **Normalized**: Taps sum to one, so the filter preserves constants.
//! * **Padded**: The profile is padded before convolution and cropped back.
//!
//! ## Key concepts
//!
//! * **Taps**: `w_k = exp(-½ (k/σ)²)` for `k ∈ [-radius, radius]`, normalized.
//! * **Default**: σ = 1 sample, radius 4 (9 taps).
//! * **Truncation**: [`truncated_radius`] gives the conventional `round(4σ)`
//!   half-width used for display smoothing.
//!
//! ## Invariants
//!
//! * `sigma <= 0` returns an unchanged copy.
//! * `radius < 1` is raised to 1.
//! * Output length equals input length.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::boundary::{pad, PaddingPolicy};

/// Default smoothing width in samples.
pub const DEFAULT_SIGMA_IDX: f64 = 1.0;

/// Default kernel half-width in samples.
pub const DEFAULT_RADIUS: usize = 4;

/// Normalized Gaussian taps for `k ∈ [-radius, radius]`.
pub fn gaussian_taps<T: Float>(sigma: T, radius: usize) -> Vec<T> {
    let radius = radius.max(1) as isize;
    let half = T::from(0.5).unwrap();
    let mut taps: Vec<T> = (-radius..=radius)
        .map(|k| {
            let u = T::from(k).unwrap() / sigma;
            (-half * u * u).exp()
        })
        .collect();

    let sum = taps.iter().fold(T::zero(), |acc, &w| acc + w);
    if sum > T::zero() {
        for w in taps.iter_mut() {
            *w = *w / sum;
        }
    }
    taps
}

/// Half-width that keeps four standard deviations of the Gaussian.
#[inline]
pub fn truncated_radius<T: Float>(sigma: T) -> usize {
    let r = (T::from(4.0).unwrap() * sigma + T::from(0.5).unwrap()).floor();
    r.to_usize().unwrap_or(1).max(1)
}

/// Smooth `y` with a Gaussian of width `sigma` samples.
pub fn smooth<T: Float>(y: &[T], sigma: T, radius: usize, policy: PaddingPolicy) -> Vec<T> {
    if !(sigma > T::zero()) || y.is_empty() {
        return y.to_vec();
    }

    let taps = gaussian_taps(sigma, radius);
    let half = taps.len() / 2;
    let (padded, used) = pad(y, half, policy);

    let n = y.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        // Centre of output sample `i` inside the padded vector.
        let c = i + used;
        let mut acc = T::zero();
        for (j, &w) in taps.iter().enumerate() {
            // Reflect padding may be narrower than the kernel for short profiles.
            let idx = (c + j).checked_sub(half);
            if let Some(v) = idx.and_then(|p| padded.get(p)) {
                acc = acc + w * *v;
            } else {
                acc = acc + w * y[if j < half { 0 } else { n - 1 }];
            }
        }
        out.push(acc);
    }
    out
}
