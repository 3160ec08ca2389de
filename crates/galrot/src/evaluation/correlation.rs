//! Correlation of the stiffness field with velocity changes and residuals.
//!
//! ## Purpose
//!
//! If the adaptive mechanism acts where the baryonic field is stiff, the
//! velocity change it produces should track χ in the inner and mid disk.
//! This module measures that correlation, and the correlation of χ with
//! the residuals of the baseline model.
//!
//! ## Key concepts
//!
//! * **Velocity-change test**: Pearson r between χ and `ΔV = V_adaptive − V_baseline`
//!   over `r / r_max < 0.7`. When the two grids disagree by more than 0.01
//!   kpc, ΔV is interpolated onto the χ grid.
//! * **Observed residual**: χ against `V_baseline − V_obs` (signed and absolute)
//!   over `0 < r`, `r / r_max < 0.3`, where the observed curve is defined.
//! * **RAR residual proxy**: χ against `log10(g_obs) − log10(g_bar)` of the
//!   baseline, with accelerations `V²/R`, over the same inner region.
//!
//! ## Invariants
//!
//! * Reported correlations are NaN (not errors) when a variance vanishes.
//!
//! ## Non-goals
//!
//! * No significance testing.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::evaluation::diagnostics::{max_abs, pearson_r};
use crate::math::interpolation::{allclose, interp, interp_or};
use crate::primitives::errors::GalrotError;

/// Default upper radial fraction for the velocity-change test.
pub const DEFAULT_MAX_RFRAC: f64 = 0.70;

/// Upper radial fraction for the residual correlations.
pub const RESIDUAL_MAX_RFRAC: f64 = 0.30;

/// Grid agreement (kpc) below which ΔV is used without resampling.
pub const GRID_ATOL: f64 = 0.01;

// ============================================================================
// Velocity-change Test
// ============================================================================

/// Correlation of χ with the adaptive velocity change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationTest<T> {
    /// Only radii with `r / r_max` below this fraction enter the statistic.
    pub max_rfrac: T,
}

/// Outcome of [`CorrelationTest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationReport<T> {
    /// Pearson correlation coefficient.
    pub r: T,

    /// Number of radii used.
    pub n: usize,

    /// Largest absolute velocity change among the radii used.
    pub max_abs_dv: T,
}

impl<T: Float> Default for CorrelationTest<T> {
    fn default() -> Self {
        Self {
            max_rfrac: T::from(DEFAULT_MAX_RFRAC).unwrap(),
        }
    }
}

impl<T: Float> CorrelationTest<T> {
    /// Run the test.
    ///
    /// `(r_chi, chi)` is the stiffness profile; `(r_dv, v_baseline, v_adaptive)`
    /// the adaptive output. Both must be sorted by radius.
    pub fn evaluate(
        &self,
        r_chi: &[T],
        chi: &[T],
        r_dv: &[T],
        v_baseline: &[T],
        v_adaptive: &[T],
    ) -> Result<CorrelationReport<T>, GalrotError> {
        if r_chi.is_empty() || r_dv.is_empty() {
            return Err(GalrotError::EmptyInput);
        }
        if r_chi.len() != chi.len() {
            return Err(GalrotError::MismatchedInputs {
                r_len: r_chi.len(),
                v_len: chi.len(),
            });
        }
        if r_dv.len() != v_baseline.len() || r_dv.len() != v_adaptive.len() {
            return Err(GalrotError::MismatchedInputs {
                r_len: r_dv.len(),
                v_len: v_baseline.len().min(v_adaptive.len()),
            });
        }

        let dv_native: Vec<T> = v_adaptive
            .iter()
            .zip(v_baseline)
            .map(|(&a, &b)| a - b)
            .collect();
        let dv = if allclose(r_chi, r_dv, T::from(GRID_ATOL).unwrap()) {
            dv_native
        } else {
            r_chi.iter().map(|&r| interp(r, r_dv, &dv_native)).collect()
        };

        let r_max = r_chi.iter().copied().fold(T::neg_infinity(), T::max);
        let (xs, ys): (Vec<T>, Vec<T>) = r_chi
            .iter()
            .zip(chi.iter().zip(&dv))
            .filter(|&(&r, _)| r / r_max < self.max_rfrac)
            .map(|(_, (&c, &d))| (c, d))
            .unzip();

        Ok(CorrelationReport {
            r: pearson_r(&xs, &ys),
            n: xs.len(),
            max_abs_dv: max_abs(&ys),
        })
    }
}

// ============================================================================
// Residual Correlations
// ============================================================================

/// Correlations of χ with the baseline's residuals in the inner disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualReport<T> {
    /// Number of radii used.
    pub n: usize,

    /// χ against the signed residual `V_baseline − V_obs`.
    pub r_signed: T,

    /// χ against the absolute residual.
    pub r_abs: T,
}

/// Correlation of χ with the RAR residual proxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarResidualReport<T> {
    /// Number of radii used.
    pub n: usize,

    /// Pearson correlation coefficient.
    pub r: T,

    /// Smallest and largest residual among the radii used.
    pub resid_range: (T, T),
}

fn inner_mask<T: Float>(r: &[T], max_rfrac: T) -> Vec<bool> {
    let r_max = r.iter().copied().fold(T::neg_infinity(), T::max);
    r.iter()
        .map(|&ri| ri > T::zero() && ri / r_max < max_rfrac)
        .collect()
}

/// χ against `V_baseline − V_obs` in the inner disk.
///
/// The observed curve `(r_obs, v_obs)` is interpolated onto `r` without
/// extrapolation; radii outside it are skipped.
pub fn residual_correlation<T: Float>(
    r: &[T],
    chi: &[T],
    v_baseline: &[T],
    r_obs: &[T],
    v_obs: &[T],
) -> Result<ResidualReport<T>, GalrotError> {
    if r.len() != chi.len() || r.len() != v_baseline.len() {
        return Err(GalrotError::MismatchedInputs {
            r_len: r.len(),
            v_len: chi.len().min(v_baseline.len()),
        });
    }
    if r.is_empty() || r_obs.is_empty() {
        return Err(GalrotError::EmptyInput);
    }

    let mask = inner_mask(r, T::from(RESIDUAL_MAX_RFRAC).unwrap());
    let mut xs = Vec::new();
    let mut signed = Vec::new();
    for j in 0..r.len() {
        let vo = interp_or(r[j], r_obs, v_obs, T::nan(), T::nan());
        if mask[j] && vo.is_finite() && vo > T::zero() {
            xs.push(chi[j]);
            signed.push(v_baseline[j] - vo);
        }
    }
    let abs: Vec<T> = signed.iter().map(|v| v.abs()).collect();

    Ok(ResidualReport {
        n: xs.len(),
        r_signed: pearson_r(&xs, &signed),
        r_abs: pearson_r(&xs, &abs),
    })
}

/// χ against `log10(g_obs) − log10(g_bar)` of the baseline in the inner disk.
pub fn rar_residual_correlation<T: Float>(
    r: &[T],
    chi: &[T],
    v_baryon: &[T],
    v_baseline: &[T],
) -> Result<RarResidualReport<T>, GalrotError> {
    if r.len() != chi.len() || r.len() != v_baryon.len() || r.len() != v_baseline.len() {
        return Err(GalrotError::MismatchedInputs {
            r_len: r.len(),
            v_len: chi.len().min(v_baryon.len()).min(v_baseline.len()),
        });
    }
    if r.is_empty() {
        return Err(GalrotError::EmptyInput);
    }

    let mask = inner_mask(r, T::from(RESIDUAL_MAX_RFRAC).unwrap());
    let mut xs = Vec::new();
    let mut resid = Vec::new();
    for j in (0..r.len()).filter(|&j| mask[j]) {
        let g_obs = v_baseline[j] * v_baseline[j] / r[j];
        let g_bar = v_baryon[j] * v_baryon[j] / r[j];
        xs.push(chi[j]);
        resid.push(g_obs.log10() - g_bar.log10());
    }

    let lo = resid.iter().copied().fold(T::infinity(), T::min);
    let hi = resid.iter().copied().fold(T::neg_infinity(), T::max);
    Ok(RarResidualReport {
        n: xs.len(),
        r: pearson_r(&xs, &resid),
        resid_range: (lo, hi),
    })
}
