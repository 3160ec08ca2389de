//! Outer-region stability gate.
//!
//! ## Purpose
//!
//! The adaptive curve is only acceptable if it leaves the outer rotation
//! curve essentially untouched. This gate measures the largest velocity
//! change against the baseline in the outer region and compares it with a
//! tolerance.
//!
//! ## Key concepts
//!
//! * **Outer region**: radii with `r / r_max >= rfrac_outer` (default 0.70).
//! * **Pass**: `max |V_adaptive − V_baseline| <= tol_kms` (default 2 km/s).
//!
//! ## Invariants
//!
//! * An empty outer region never passes and reports NaN.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::leff::radial_fraction;
use crate::primitives::errors::GalrotError;

/// Default start of the outer region as a fraction of the outermost radius.
pub const DEFAULT_OUTER_RFRAC: f64 = 0.70;

/// Default tolerance on the outer velocity change in km/s.
pub const DEFAULT_OUTER_TOL_KMS: f64 = 2.0;

/// Outer-region gate settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterGate<T> {
    /// Start of the outer region as a fraction of the outermost radius.
    pub rfrac_outer: T,

    /// Largest allowed absolute velocity change in km/s.
    pub tol_kms: T,
}

/// Outcome of the outer-region gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterStability<T> {
    /// Largest absolute velocity change in the outer region (NaN when empty).
    pub max_abs_dv: T,

    /// Number of radii in the outer region.
    pub n_outer: usize,

    /// Whether the gate passed.
    pub pass: bool,
}

impl<T: Float> Default for OuterGate<T> {
    fn default() -> Self {
        Self {
            rfrac_outer: T::from(DEFAULT_OUTER_RFRAC).unwrap(),
            tol_kms: T::from(DEFAULT_OUTER_TOL_KMS).unwrap(),
        }
    }
}

impl<T: Float> OuterGate<T> {
    /// Evaluate the gate on curves sharing the radius grid `r`.
    pub fn evaluate(&self, r: &[T], v_baseline: &[T], v_adaptive: &[T]) -> Result<OuterStability<T>, GalrotError> {
        if r.len() != v_baseline.len() || r.len() != v_adaptive.len() {
            return Err(GalrotError::MismatchedInputs {
                r_len: r.len(),
                v_len: v_baseline.len().min(v_adaptive.len()),
            });
        }

        let r_frac = radial_fraction(r);
        let mut max_abs_dv: Option<T> = None;
        let mut n_outer = 0;
        for ((&fr, &vb), &va) in r_frac.iter().zip(v_baseline).zip(v_adaptive) {
            if fr >= self.rfrac_outer {
                n_outer += 1;
                let d = (va - vb).abs();
                max_abs_dv = Some(max_abs_dv.map_or(d, |m| m.max(d)));
            }
        }

        Ok(match max_abs_dv {
            Some(d) => OuterStability {
                max_abs_dv: d,
                n_outer,
                pass: d <= self.tol_kms,
            },
            None => OuterStability {
                max_abs_dv: T::nan(),
                n_outer: 0,
                pass: false,
            },
        })
    }
}
