//! Summary statistics for rotation-curve comparisons.
//!
//! ## Purpose
//!
//! This module provides the scalar statistics the diagnostic tests are built
//! from, plus compact summaries of an adaptive scale profile and of a
//! baseline decomposition.
//!
//! ## Design notes
//!
//! * **NaN on degeneracy**: Statistics that are undefined for the given data
//!   (zero variance, no points) return NaN rather than an error, so a fleet
//!   summary can still be written.
//! * **Generics**: All computations are generic over `Float` types.
//!
//! ## Key concepts
//!
//! * **Pearson r**: Correlation of mean-centred samples.
//! * **Log scatter**: `sqrt(mean((log10 V_model − log10 V_obs)²))` in dex,
//!   both velocities clipped below at `1e-12`.
//! * **Baseline summary**: Kernel activity and inner/outer shape indicators
//!   of a baseline decomposition.
//!
//! ## Invariants
//!
//! * `|pearson_r| <= 1` whenever it is finite.
//! * Log scatter is non-negative.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use core::fmt::{Display, Formatter, Result};
use num_traits::Float;

/// Lower clip applied to velocities before taking logarithms.
pub const LOG_FLOOR: f64 = 1e-12;

// ============================================================================
// Scalar Statistics
// ============================================================================

/// Arithmetic mean (NaN for an empty slice).
#[inline]
pub fn mean<T: Float>(x: &[T]) -> T {
    if x.is_empty() {
        return T::nan();
    }
    let sum = x.iter().fold(T::zero(), |acc, &v| acc + v);
    sum / T::from(x.len()).unwrap()
}

/// Pearson correlation of `x` and `y` (NaN when either has zero variance).
pub fn pearson_r<T: Float>(x: &[T], y: &[T]) -> T {
    let n = x.len().min(y.len());
    if n < 2 {
        return T::nan();
    }
    let (x, y) = (&x[..n], &y[..n]);
    let (mx, my) = (mean(x), mean(y));

    let mut sxy = T::zero();
    let mut sxx = T::zero();
    let mut syy = T::zero();
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy = sxy + dx * dy;
        sxx = sxx + dx * dx;
        syy = syy + dy * dy;
    }

    let den = (sxx * syy).sqrt();
    if den > T::zero() {
        sxy / den
    } else {
        T::nan()
    }
}

/// RMS difference of base-10 logarithms, in dex.
pub fn rms_log_scatter<T: Float>(v_model: &[T], v_obs: &[T]) -> T {
    let n = v_model.len().min(v_obs.len());
    if n == 0 {
        return T::nan();
    }
    let floor = T::from(LOG_FLOOR).unwrap();
    let ss = v_model
        .iter()
        .zip(v_obs)
        .map(|(&m, &o)| {
            let d = m.max(floor).log10() - o.max(floor).log10();
            d * d
        })
        .fold(T::zero(), |acc, v| acc + v);
    (ss / T::from(n).unwrap()).sqrt()
}

/// Largest absolute value (NaN for an empty slice).
#[inline]
pub fn max_abs<T: Float>(x: &[T]) -> T {
    x.iter()
        .map(|v| v.abs())
        .fold(None, |acc: Option<T>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or_else(T::nan)
}

/// Round to `digits` decimal places.
#[inline]
pub fn round_to<T: Float>(x: T, digits: i32) -> T {
    let s = T::from(10.0).unwrap().powi(digits);
    (x * s).round() / s
}

// ============================================================================
// L_eff Summary
// ============================================================================

/// Compact summary of an effective scale profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeffSummary<T> {
    /// Mean of L_eff.
    pub mean: T,

    /// Smallest L_eff.
    pub min: T,

    /// Largest L_eff.
    pub max: T,

    /// L_eff at the outermost radius.
    pub at_rmax: T,
}

impl<T: Float> LeffSummary<T> {
    /// Number of decimals kept in fleet reports.
    pub const REPORT_DIGITS: i32 = 4;

    /// Summarize `l_eff` sampled on increasing radii.
    pub fn from_profile(l_eff: &[T]) -> Option<Self> {
        let last = *l_eff.last()?;
        let min = l_eff.iter().copied().fold(T::infinity(), T::min);
        let max = l_eff.iter().copied().fold(T::neg_infinity(), T::max);
        Some(Self {
            mean: mean(l_eff),
            min,
            max,
            at_rmax: last,
        })
    }

    /// Copy with every field rounded to [`Self::REPORT_DIGITS`] decimals.
    pub fn rounded(&self) -> Self {
        let d = Self::REPORT_DIGITS;
        Self {
            mean: round_to(self.mean, d),
            min: round_to(self.min, d),
            max: round_to(self.max, d),
            at_rmax: round_to(self.at_rmax, d),
        }
    }
}

// ============================================================================
// Baseline Summary
// ============================================================================

/// Shape indicators of a baseline decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineSummary<T> {
    /// Peak baryonic velocity.
    pub max_v_baryon: T,

    /// Peak absolute kernel velocity.
    pub max_v_kernel: T,

    /// Peak total velocity.
    pub max_v_total: T,

    /// `max_v_kernel / max_v_baryon` (0 when the baryonic peak is not positive).
    pub kernel_to_baryon_ratio: T,

    /// Ratio exceeds [`Self::KERNEL_ACTIVE_THRESHOLD`].
    pub kernel_active: bool,

    /// Mean fractional excess of total over baryonic velocity in the inner quarter.
    pub inner_excess: T,

    /// Inner excess exceeds [`Self::OVERSHOOT_THRESHOLD`].
    pub inner_overshoot: bool,

    /// Kernel velocity is lower at the last three radii than at the first three.
    pub outer_decay: bool,
}

impl<T: Float> BaselineSummary<T> {
    /// Kernel-to-baryon peak ratio above which the kernel counts as active.
    pub const KERNEL_ACTIVE_THRESHOLD: f64 = 0.10;

    /// Fraction of the radii treated as the inner region.
    pub const INNER_FRACTION: f64 = 0.25;

    /// Fractional inner excess that counts as an overshoot.
    pub const OVERSHOOT_THRESHOLD: f64 = 0.10;

    /// Fewest radii a decomposition needs to be summarized.
    pub const MIN_POINTS: usize = 5;

    /// Summarize a decomposition sampled on increasing radii.
    ///
    /// Returns `None` for curves shorter than [`Self::MIN_POINTS`] or with an
    /// identically zero baryonic component.
    pub fn from_decomposition(v_baryon: &[T], v_kernel: &[T], v_total: &[T]) -> Option<Self> {
        let n = v_baryon.len();
        if n < Self::MIN_POINTS
            || v_kernel.len() != n
            || v_total.len() != n
            || v_baryon.iter().all(|&v| v == T::zero())
        {
            return None;
        }

        let nanmax = |x: &[T]| {
            x.iter()
                .copied()
                .filter(|v| !v.is_nan())
                .fold(T::neg_infinity(), T::max)
        };
        let max_v_baryon = nanmax(v_baryon);
        let abs_kernel: Vec<T> = v_kernel.iter().map(|v| v.abs()).collect();
        let max_v_kernel = nanmax(&abs_kernel);
        let max_v_total = nanmax(v_total);

        let ratio = if max_v_baryon > T::zero() {
            max_v_kernel / max_v_baryon
        } else {
            T::zero()
        };

        let n_inner = ((n as f64 * Self::INNER_FRACTION) as usize).max(1);
        let tiny = T::from(1e-6).unwrap();
        let excess: Vec<T> = (0..n_inner)
            .map(|i| (v_total[i] - v_baryon[i]) / v_baryon[i].max(tiny))
            .collect();
        let inner_excess = mean(&excess);

        let outer_decay = mean(&v_kernel[n - 3..]) < mean(&v_kernel[..3]);

        Some(Self {
            max_v_baryon,
            max_v_kernel,
            max_v_total,
            kernel_to_baryon_ratio: ratio,
            kernel_active: ratio > T::from(Self::KERNEL_ACTIVE_THRESHOLD).unwrap(),
            inner_excess,
            inner_overshoot: inner_excess > T::from(Self::OVERSHOOT_THRESHOLD).unwrap(),
            outer_decay,
        })
    }
}

impl<T: Float + Display> Display for LeffSummary<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "L_eff mean={:.4} min={:.4} max={:.4} at_Rmax={:.4} kpc",
            self.mean, self.min, self.max, self.at_rmax
        )
    }
}
