//! Basis velocity curves at fixed length scales.
//!
//! ## Purpose
//!
//! The adaptive curve is built from a small family of model curves, each
//! computed with a fixed kernel length scale. This module chooses those
//! scales, stores the curves on a common radius grid, and reconciles curves
//! sampled on a slightly different grid.
//!
//! ## Design notes
//!
//! * **Deterministic**: Scales are `L0 · m` for a fixed list of multipliers; nothing is tuned.
//! * **Ascending storage**: Scales are stored ascending so that interpolation
//!   across the scale axis can bracket by binary search.
//! * **Strict or lenient alignment**: A curve on another grid is either an
//!   error or resampled onto the reference grid with end clamping.
//!
//! ## Invariants
//!
//! * A `BasisSet` holds at least two distinct, positive, finite scales.
//! * Every curve has exactly one value per reference radius.
//!
//! ## Non-goals
//!
//! * This module does not compute the curves; the pipeline crate runs the model.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use core::cmp::Ordering;
use num_traits::Float;

// Internal dependencies
use crate::math::interpolation::{allclose, interp};
use crate::primitives::errors::GalrotError;

/// Default basis multipliers relative to L0 (eight scales).
pub const DEFAULT_MULTIPLIERS: [f64; 8] = [1.00, 0.90, 0.80, 0.70, 0.60, 0.50, 0.40, 0.30];

/// Absolute tolerance when comparing radius grids.
pub const RADII_ATOL: f64 = 1e-10;

/// Minimum number of distinct scales in a basis.
pub const MIN_BASIS_SCALES: usize = 2;

// ============================================================================
// Scale Selection
// ============================================================================

/// Distinct basis scales `l0 · m`, ascending.
pub fn basis_scales<T: Float>(l0: T, multipliers: &[T]) -> Vec<T> {
    let mut scales: Vec<T> = multipliers.iter().map(|&m| l0 * m).collect();
    scales.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    scales.dedup();
    scales
}

// ============================================================================
// Grid Alignment
// ============================================================================

/// Outcome of aligning one curve onto the reference grid.
#[derive(Debug, Clone, PartialEq)]
pub enum Alignment<T> {
    /// Grids matched; values are used as-is.
    Exact(Vec<T>),

    /// Grids differed; values were resampled onto the reference grid.
    Resampled(Vec<T>),
}

impl<T> Alignment<T> {
    /// Aligned values regardless of how they were obtained.
    pub fn into_values(self) -> Vec<T> {
        match self {
            Self::Exact(v) | Self::Resampled(v) => v,
        }
    }

    /// `true` when the curve had to be resampled.
    pub fn was_resampled(&self) -> bool {
        matches!(self, Self::Resampled(_))
    }
}

/// Place a curve sampled at `r_now` onto the reference grid `r_ref`.
///
/// In strict mode a grid mismatch is reported as [`GalrotError::BasisGridMismatch`].
pub fn align<T: Float>(
    scale: T,
    r_ref: &[T],
    r_now: &[T],
    v_now: &[T],
    strict: bool,
) -> Result<Alignment<T>, GalrotError> {
    if allclose(r_now, r_ref, T::from(RADII_ATOL).unwrap()) {
        return Ok(Alignment::Exact(v_now.to_vec()));
    }
    if strict || r_now.is_empty() {
        return Err(GalrotError::BasisGridMismatch {
            scale: scale.to_f64().unwrap_or(f64::NAN),
            got: r_now.len(),
            expected: r_ref.len(),
        });
    }
    Ok(Alignment::Resampled(
        r_ref.iter().map(|&r| interp(r, r_now, v_now)).collect(),
    ))
}

// ============================================================================
// Basis Set
// ============================================================================

/// Model curves at fixed scales on a common radius grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisSet<T> {
    scales: Vec<T>,
    radii: Vec<T>,
    curves: Vec<Vec<T>>,
}

impl<T: Float> BasisSet<T> {
    /// Assemble a basis from `(scale, curve)` pairs on the grid `radii`.
    ///
    /// Pairs may arrive in any order; they are stored by ascending scale.
    pub fn new(radii: Vec<T>, members: Vec<(T, Vec<T>)>) -> Result<Self, GalrotError> {
        let mut members = members;
        for (scale, curve) in &members {
            if !scale.is_finite() || *scale <= T::zero() {
                return Err(GalrotError::InvalidScaleLength(
                    scale.to_f64().unwrap_or(f64::NAN),
                ));
            }
            if curve.len() != radii.len() {
                return Err(GalrotError::BasisGridMismatch {
                    scale: scale.to_f64().unwrap_or(f64::NAN),
                    got: curve.len(),
                    expected: radii.len(),
                });
            }
        }

        members.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        members.dedup_by(|a, b| a.0 == b.0);
        if members.len() < MIN_BASIS_SCALES {
            return Err(GalrotError::InsufficientBasis {
                got: members.len(),
                min: MIN_BASIS_SCALES,
            });
        }

        let (scales, curves) = members.into_iter().unzip();
        Ok(Self {
            scales,
            radii,
            curves,
        })
    }

    /// Scales in ascending order.
    pub fn scales(&self) -> &[T] {
        &self.scales
    }

    /// Reference radius grid.
    pub fn radii(&self) -> &[T] {
        &self.radii
    }

    /// Curve for the `i`-th scale (ascending order).
    pub fn curve(&self, i: usize) -> &[T] {
        &self.curves[i]
    }

    /// Smallest scale.
    pub fn l_min(&self) -> T {
        self.scales[0]
    }

    /// Largest scale.
    pub fn l_max(&self) -> T {
        self.scales[self.scales.len() - 1]
    }

    /// All basis values at radius index `j`, in scale order.
    pub fn column(&self, j: usize) -> Vec<T> {
        self.curves.iter().map(|c| c[j]).collect()
    }

    /// Number of scales.
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Always `false`; a valid basis has at least two scales.
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}
