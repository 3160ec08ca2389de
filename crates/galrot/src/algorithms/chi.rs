//! Dimensionless stiffness field of a baryonic rotation curve.
//!
//! ## Purpose
//!
//! This module turns a baryonic rotation curve into the stiffness field χ(r),
//! which measures how steeply the baryonic acceleration changes relative to
//! its own magnitude over one stellar scale length.
//!
//! ## Design notes
//!
//! * **Natural units**: Accelerations are `V²/R` in (km/s)²/kpc; χ is made
//!   dimensionless by the stellar disk scale length `Rd_star`.
//! * **Optional pre-smoothing**: A fixed index-space Gaussian can be applied
//!   to `g_bar` before differentiation. The raw variant is always computed.
//! * **Floor**: A constant `eps` in the denominator keeps χ finite where
//!   `g_bar` vanishes.
//!
//! ## Key concepts
//!
//! * **Acceleration**: `g_bar(r) = V_bar(r)² / max(r, 1e-30)`.
//! * **Stiffness**: `χ(r) = |dg_bar/dr| / (g_bar/Rd_star + eps)`.
//!
//! ## Invariants
//!
//! * χ ≥ 0 everywhere.
//! * A constant `g_bar` yields χ ≡ 0.
//! * χ is unchanged (up to `eps`) when the baryonic curve is rescaled by a constant.
//!
//! ## Non-goals
//!
//! * This module does not sort radii; callers supply increasing radii.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::format;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::boundary::PaddingPolicy;
use crate::math::gradient::gradient;
use crate::math::kernel::smooth;
use crate::primitives::errors::GalrotError;

/// Floor on the radius when forming `V²/R`.
pub const MIN_RADIUS: f64 = 1e-30;

/// Default constant added to the χ denominator.
pub const DEFAULT_EPS: f64 = 1e-30;

// ============================================================================
// Result Types
// ============================================================================

/// χ and its intermediates on one radius grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiProfile<T> {
    /// Radii in kpc.
    pub r: Vec<T>,

    /// Baryonic acceleration in (km/s)²/kpc.
    pub g_bar: Vec<T>,

    /// Radial derivative of `g_bar`.
    pub dgdr: Vec<T>,

    /// Dimensionless stiffness.
    pub chi: Vec<T>,
}

/// Raw χ, plus the pre-smoothed variant when smoothing was requested.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiComputation<T> {
    /// χ computed from the unsmoothed acceleration.
    pub raw: ChiProfile<T>,

    /// χ computed after smoothing the acceleration.
    pub smooth: Option<ChiProfile<T>>,
}

/// Settings for the pre-differentiation smoothing of `g_bar`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChiSmoothing<T> {
    /// Width in samples.
    pub sigma_idx: T,

    /// Half-width in samples.
    pub radius: usize,
}

// ============================================================================
// Computation
// ============================================================================

/// Centripetal acceleration `V²/R` with the radius floored at [`MIN_RADIUS`].
pub fn acceleration<T: Float>(v: &[T], r: &[T]) -> Vec<T> {
    let floor = T::from(MIN_RADIUS).unwrap();
    v.iter()
        .zip(r)
        .map(|(&vi, &ri)| vi * vi / ri.max(floor))
        .collect()
}

/// χ from a sampled baryonic acceleration.
pub fn chi_from_gbar<T: Float>(
    r: &[T],
    g_bar: &[T],
    rd_star: T,
    eps: T,
) -> Result<ChiProfile<T>, GalrotError> {
    if let Some(i) = r.iter().position(|v| !v.is_finite()) {
        return Err(GalrotError::InvalidNumericValue(format!(
            "r[{}]={}",
            i,
            r[i].to_f64().unwrap_or(f64::NAN)
        )));
    }
    if let Some(i) = g_bar.iter().position(|v| !v.is_finite()) {
        return Err(GalrotError::InvalidNumericValue(format!(
            "g_bar[{}]={}",
            i,
            g_bar[i].to_f64().unwrap_or(f64::NAN)
        )));
    }
    if !rd_star.is_finite() || rd_star <= T::zero() {
        return Err(GalrotError::InvalidScaleLength(
            rd_star.to_f64().unwrap_or(f64::NAN),
        ));
    }

    let dgdr = gradient(g_bar, r);
    let chi = dgdr
        .iter()
        .zip(g_bar)
        .map(|(&d, &g)| d.abs() / (g / rd_star + eps))
        .collect();

    Ok(ChiProfile {
        r: r.to_vec(),
        g_bar: g_bar.to_vec(),
        dgdr,
        chi,
    })
}

/// χ from a baryonic rotation curve, raw and optionally pre-smoothed.
pub fn chi_from_curve<T: Float>(
    r: &[T],
    v_baryon: &[T],
    rd_star: T,
    smoothing: Option<ChiSmoothing<T>>,
    eps: T,
) -> Result<ChiComputation<T>, GalrotError> {
    let g_raw = acceleration(v_baryon, r);
    let raw = chi_from_gbar(r, &g_raw, rd_star, eps)?;

    let smooth = match smoothing {
        Some(s) => {
            let g_s = smooth(&g_raw, s.sigma_idx, s.radius, PaddingPolicy::Edge);
            Some(chi_from_gbar(r, &g_s, rd_star, eps)?)
        }
        None => None,
    };

    Ok(ChiComputation { raw, smooth })
}
