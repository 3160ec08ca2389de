//! Execution engine for the profile and adaptive passes.
//!
//! ## Purpose
//!
//! This module runs the two computational passes on validated input:
//!
//! 1. **Profile pass**: baryonic curve → χ → L_eff.
//! 2. **Adaptive pass**: L_eff + basis → adaptive curve → outer gate.
//!
//! ## Design notes
//!
//! * **Configuration snapshot**: `ExecutorConfig` holds every resolved
//!   parameter; the builder in the API layer fills it with defaults.
//! * **Plain passes**: Each pass calls the algorithm functions directly over
//!   slices; no state survives between calls.
//! * **Validation first**: Inputs are validated before any allocation-heavy work.
//!
//! ## Invariants
//!
//! * The adaptive pass requires the profile grid and the basis grid to match
//!   within the basis radius tolerance.
//!
//! ## Non-goals
//!
//! * This module does not read files or generate basis curves.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::adaptive::interpolate;
use crate::algorithms::basis::{BasisSet, RADII_ATOL};
use crate::algorithms::chi::{chi_from_curve, ChiSmoothing};
use crate::algorithms::leff::{leff_profile, LeffConfig};
use crate::engine::output::{AdaptiveResult, LeffResult};
use crate::engine::validator::Validator;
use crate::evaluation::stability::OuterGate;
use crate::math::interpolation::allclose;
use crate::primitives::errors::GalrotError;

// ============================================================================
// Type Definitions
// ============================================================================

/// Minimum radii for a differentiable profile.
pub const MIN_PROFILE_POINTS: usize = 2;

// ============================================================================
// Configuration
// ============================================================================

/// Resolved parameters of both passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutorConfig<T> {
    /// Optional pre-differentiation smoothing of `g_bar`.
    pub smoothing: Option<ChiSmoothing<T>>,

    /// χ → L_eff mapping.
    pub leff: LeffConfig<T>,

    /// Constant floor in the χ denominator.
    pub eps: T,

    /// Outer stability gate.
    pub gate: OuterGate<T>,
}

impl<T: Float> Default for ExecutorConfig<T> {
    fn default() -> Self {
        Self {
            smoothing: None,
            leff: LeffConfig::default(),
            eps: T::from(crate::algorithms::chi::DEFAULT_EPS).unwrap(),
            gate: OuterGate::default(),
        }
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Runs the profile and adaptive passes with a fixed configuration.
#[derive(Debug, Clone)]
pub struct Executor<T: Float> {
    /// Resolved configuration.
    pub config: ExecutorConfig<T>,
}

impl<T: Float> Default for Executor<T> {
    fn default() -> Self {
        Self::from_config(ExecutorConfig::default())
    }
}

impl<T: Float> Executor<T> {
    /// Create an executor from a resolved configuration.
    pub fn from_config(config: ExecutorConfig<T>) -> Self {
        Self { config }
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Baryonic curve → χ → L_eff.
    pub fn profile_pass(
        &self,
        r: &[T],
        v_baryon: &[T],
        rd_star: T,
        l0: T,
    ) -> Result<LeffResult<T>, GalrotError> {
        Validator::validate_curve(r, v_baryon, MIN_PROFILE_POINTS)?;
        Validator::validate_scale_length(rd_star)?;
        Validator::validate_scale_length(l0)?;

        let chi = chi_from_curve(r, v_baryon, rd_star, self.config.smoothing, self.config.eps)?;
        let profile = leff_profile(r, &chi.raw.chi, l0, &self.config.leff);

        Ok(LeffResult {
            chi,
            profile,
            rd_star,
            config: self.config.leff,
        })
    }

    /// L_eff + basis → adaptive curve → outer gate.
    pub fn adaptive_pass(
        &self,
        profile: &LeffResult<T>,
        basis: &BasisSet<T>,
        v_baseline: &[T],
    ) -> Result<AdaptiveResult<T>, GalrotError> {
        self.adaptive_pass_on(profile.r(), profile.l_eff(), profile.profile.l0, basis, v_baseline)
    }

    /// Adaptive pass for an L_eff profile loaded from elsewhere.
    ///
    /// `r_profile` is the grid `l_eff` was computed on and must match the
    /// basis grid; `l0` only labels the mismatch error.
    pub fn adaptive_pass_on(
        &self,
        r_profile: &[T],
        l_eff: &[T],
        l0: T,
        basis: &BasisSet<T>,
        v_baseline: &[T],
    ) -> Result<AdaptiveResult<T>, GalrotError> {
        let r = basis.radii();
        Validator::validate_curve(r, v_baseline, MIN_PROFILE_POINTS)?;
        if !allclose(r_profile, r, T::from(RADII_ATOL).unwrap()) {
            return Err(GalrotError::BasisGridMismatch {
                scale: l0.to_f64().unwrap_or(f64::NAN),
                got: r_profile.len(),
                expected: r.len(),
            });
        }

        let curve = interpolate(basis, l_eff)?;
        let dv: Vec<T> = curve
            .v_adaptive
            .iter()
            .zip(v_baseline)
            .map(|(&a, &b)| a - b)
            .collect();
        let stability = self.config.gate.evaluate(r, v_baseline, &curve.v_adaptive)?;

        Ok(AdaptiveResult {
            curve,
            v_baseline: v_baseline.to_vec(),
            dv,
            basis_range: (basis.l_min(), basis.l_max()),
            gate: self.config.gate,
            stability,
        })
    }
}
