//! Adaptive length-scale profile.
//!
//! ## Purpose
//!
//! This module maps the stiffness field χ(r) to an effective kernel length
//! scale L_eff(r). Stiff regions shorten the scale relative to the canonical
//! per-galaxy value L0; an optional outer taper returns the profile to L0 at
//! large radii.
//!
//! ## Design notes
//!
//! * **Normalized amplitude**: χ is divided by its maximum so that `alpha`
//!   has the same meaning for every galaxy.
//! * **Raw drive**: The raw χ drives the deformation by default; the smoothed
//!   copy is carried for display.
//! * **Taper**: A logistic mask in `r/r_max` blends `L_adapt` back into `L0`.
//!
//! ## Key concepts
//!
//! * `χ_amp = χ / max(χ)` (all zeros when `max(χ) <= 0`).
//! * `L_adapt = L0 / (1 + alpha · χ_amp)`, optionally floored at `f · L0`.
//! * `m = sigmoid(k (r/r_max − r0))`, `L_eff = (1 − m) L_adapt + m L0`.
//!
//! ## Invariants
//!
//! * `L_eff <= L0` whenever `alpha >= 0`.
//! * `L_eff` is non-increasing in `χ_amp` at fixed radius.
//! * With the taper on, `L_eff` approaches `L0` as `r → r_max`.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::boundary::PaddingPolicy;
use crate::math::kernel::{smooth, truncated_radius};
use crate::math::taper::sigmoid_mask;

// ============================================================================
// Configuration
// ============================================================================

/// Which χ variant drives the deformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChiSource {
    /// The unsmoothed stiffness field.
    #[default]
    Raw,

    /// The display-smoothed stiffness field.
    Smoothed,
}

/// Outer taper returning L_eff to L0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Taper<T> {
    /// Midpoint of the hand-off as a fraction of the outermost radius.
    pub r0: T,

    /// Steepness of the hand-off.
    pub k: T,
}

/// Settings for the χ → L_eff mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeffConfig<T> {
    /// Deformation strength.
    pub alpha: T,

    /// Width (in samples) of the display smoothing of χ.
    pub sigma_idx: T,

    /// Variant of χ that drives the deformation.
    pub chi_source: ChiSource,

    /// Divide χ by its maximum before applying `alpha`.
    pub normalize: bool,

    /// Optional floor on `L_adapt` as a fraction of L0.
    pub floor_fraction: Option<T>,

    /// Optional outer taper.
    pub taper: Option<Taper<T>>,
}

impl<T: Float> Default for LeffConfig<T> {
    fn default() -> Self {
        Self {
            alpha: T::one(),
            sigma_idx: T::one(),
            chi_source: ChiSource::Raw,
            normalize: true,
            floor_fraction: None,
            taper: None,
        }
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// Adaptive length-scale profile and its intermediates.
#[derive(Debug, Clone, PartialEq)]
pub struct LeffProfile<T> {
    /// Radii in kpc.
    pub r: Vec<T>,

    /// Radii as a fraction of the outermost radius.
    pub r_frac: Vec<T>,

    /// Raw χ.
    pub chi_raw: Vec<T>,

    /// Display-smoothed χ.
    pub chi_smooth: Vec<T>,

    /// χ variant that drove the deformation.
    pub chi_used: Vec<T>,

    /// Outer mask values (all zero when the taper is off).
    pub mask: Vec<T>,

    /// Untapered adaptive scale.
    pub l_adapt: Vec<T>,

    /// Effective scale.
    pub l_eff: Vec<T>,

    /// Canonical scale.
    pub l0: T,
}

// ============================================================================
// Computation
// ============================================================================

/// Radii as fractions of the outermost radius (zeros when that radius is not positive).
pub fn radial_fraction<T: Float>(r: &[T]) -> Vec<T> {
    let r_max = r.iter().copied().fold(T::neg_infinity(), T::max);
    if r_max > T::zero() {
        r.iter().map(|&ri| ri / r_max).collect()
    } else {
        vec![T::zero(); r.len()]
    }
}

/// `χ / max(χ)`, or zeros when χ has no positive maximum.
pub fn normalized_amplitude<T: Float>(chi: &[T]) -> Vec<T> {
    let max = chi.iter().copied().fold(T::neg_infinity(), T::max);
    if max > T::zero() && max.is_finite() {
        chi.iter().map(|&c| c / max).collect()
    } else {
        vec![T::zero(); chi.len()]
    }
}

/// `L0 / (1 + alpha · amp)`, floored at `floor · L0` when a floor is given.
pub fn adapt_scale<T: Float>(l0: T, amp: &[T], alpha: T, floor: Option<T>) -> Vec<T> {
    let l_min = floor.map(|f| f * l0);
    amp.iter()
        .map(|&a| {
            let l = l0 / (T::one() + alpha * a);
            match l_min {
                Some(m) => l.max(m),
                None => l,
            }
        })
        .collect()
}

/// Build the full L_eff profile from radii and raw χ.
pub fn leff_profile<T: Float>(r: &[T], chi_raw: &[T], l0: T, config: &LeffConfig<T>) -> LeffProfile<T> {
    let chi_smooth = smooth(
        chi_raw,
        config.sigma_idx,
        truncated_radius(config.sigma_idx),
        PaddingPolicy::Edge,
    );
    let chi_used = match config.chi_source {
        ChiSource::Raw => chi_raw.to_vec(),
        ChiSource::Smoothed => chi_smooth.clone(),
    };

    let amp = if config.normalize {
        normalized_amplitude(&chi_used)
    } else {
        chi_used.clone()
    };
    let l_adapt = adapt_scale(l0, &amp, config.alpha, config.floor_fraction);

    let r_frac = radial_fraction(r);
    let (mask, l_eff) = match config.taper {
        Some(t) => {
            let mask: Vec<T> = r_frac.iter().map(|&x| sigmoid_mask(x, t.r0, t.k)).collect();
            let l_eff = mask
                .iter()
                .zip(&l_adapt)
                .map(|(&m, &la)| (T::one() - m) * la + m * l0)
                .collect();
            (mask, l_eff)
        }
        None => (vec![T::zero(); r.len()], l_adapt.clone()),
    };

    LeffProfile {
        r: r.to_vec(),
        r_frac,
        chi_raw: chi_raw.to_vec(),
        chi_smooth,
        chi_used,
        mask,
        l_adapt,
        l_eff,
        l0,
    }
}
