//! Inner log-scatter comparison against the observed curve.
//!
//! ## Purpose
//!
//! Compares how closely the baseline and the adaptive curves follow the
//! observed rotation curve in the inner disk, and classifies the change.
//!
//! ## Key concepts
//!
//! * Both model curves are interpolated onto the observed radii (end-clamped).
//! * **Inner region**: `R_obs < inner_frac · max(R_obs)` (default 0.5).
//! * `σ = sqrt(mean((log10 V_model − log10 V_obs)²))` in dex, and
//!   `Δσ = σ_adaptive − σ_baseline`.
//! * **Verdict**: `Improved` when `Δσ < −0.01`, `Worsened` when `Δσ > 0.01`,
//!   otherwise `Neutral`.
//!
//! ## Invariants
//!
//! * Fewer than three inner points is an error, not a NaN.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};
use num_traits::Float;

// Internal dependencies
use crate::evaluation::diagnostics::rms_log_scatter;
use crate::math::interpolation::resample;
use crate::primitives::errors::GalrotError;

/// Default inner region as a fraction of the outermost observed radius.
pub const DEFAULT_INNER_FRAC: f64 = 0.5;

/// Fewest inner points the comparison accepts.
pub const MIN_INNER_POINTS: usize = 3;

/// Half-width (dex) of the band in which a change counts as neutral.
pub const NEUTRAL_BAND_DEX: f64 = 0.01;

/// Classification of the scatter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Adaptive curve reduces the inner scatter.
    Improved,

    /// Change lies within the neutral band.
    Neutral,

    /// Adaptive curve increases the inner scatter.
    Worsened,
}

impl Verdict {
    /// Classify a scatter change `delta` against the neutral band `band`.
    pub fn classify<T: Float>(delta: T, band: T) -> Self {
        if delta < -band {
            Self::Improved
        } else if delta > band {
            Self::Worsened
        } else {
            Self::Neutral
        }
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Improved => write!(f, "improved"),
            Self::Neutral => write!(f, "neutral"),
            Self::Worsened => write!(f, "worsened"),
        }
    }
}

/// Inner-scatter comparison settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterTest<T> {
    /// Inner region as a fraction of the outermost observed radius.
    pub inner_frac: T,

    /// Half-width of the neutral band in dex.
    pub neutral_band: T,
}

/// Outcome of [`ScatterTest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterReport<T> {
    /// Inner scatter of the baseline curve (dex).
    pub sigma_baseline: T,

    /// Inner scatter of the adaptive curve (dex).
    pub sigma_adaptive: T,

    /// `sigma_adaptive − sigma_baseline`.
    pub delta_sigma: T,

    /// Inner radius cut in kpc.
    pub r_cut: T,

    /// Number of observed radii inside the cut.
    pub n: usize,

    /// Classification of `delta_sigma`.
    pub verdict: Verdict,
}

impl<T: Float> Default for ScatterTest<T> {
    fn default() -> Self {
        Self {
            inner_frac: T::from(DEFAULT_INNER_FRAC).unwrap(),
            neutral_band: T::from(NEUTRAL_BAND_DEX).unwrap(),
        }
    }
}

impl<T: Float> ScatterTest<T> {
    /// Compare baseline and adaptive curves against the observed curve.
    pub fn evaluate(
        &self,
        r_obs: &[T],
        v_obs: &[T],
        r_baseline: &[T],
        v_baseline: &[T],
        r_adaptive: &[T],
        v_adaptive: &[T],
    ) -> Result<ScatterReport<T>, GalrotError> {
        if r_obs.is_empty() || r_baseline.is_empty() || r_adaptive.is_empty() {
            return Err(GalrotError::EmptyInput);
        }
        if r_obs.len() != v_obs.len() {
            return Err(GalrotError::MismatchedInputs {
                r_len: r_obs.len(),
                v_len: v_obs.len(),
            });
        }

        let vb = resample(r_obs, r_baseline, v_baseline);
        let va = resample(r_obs, r_adaptive, v_adaptive);

        let r_max = r_obs.iter().copied().fold(T::neg_infinity(), T::max);
        let r_cut = self.inner_frac * r_max;

        let idx: Vec<usize> = (0..r_obs.len()).filter(|&i| r_obs[i] < r_cut).collect();
        if idx.len() < MIN_INNER_POINTS {
            return Err(GalrotError::TooFewPoints {
                got: idx.len(),
                min: MIN_INNER_POINTS,
            });
        }

        let pick = |v: &[T]| idx.iter().map(|&i| v[i]).collect::<Vec<T>>();
        let obs = pick(v_obs);
        let sigma_baseline = rms_log_scatter(&pick(&vb), &obs);
        let sigma_adaptive = rms_log_scatter(&pick(&va), &obs);
        let delta_sigma = sigma_adaptive - sigma_baseline;

        Ok(ScatterReport {
            sigma_baseline,
            sigma_adaptive,
            delta_sigma,
            r_cut,
            n: idx.len(),
            verdict: Verdict::classify(delta_sigma, self.neutral_band),
        })
    }
}
