//! Adaptive interpolation across basis scales.
//!
//! ## Purpose
//!
//! Given basis curves `V(L_k, r)` and an effective scale profile `L_eff(r)`,
//! this module evaluates `V(L_eff(r), r)` radius by radius. Each radius
//! picks its own point on the scale axis.
//!
//! ## Key concepts
//!
//! * **Clipping**: `L_eff` is clipped into `[L_min, L_max]` of the basis, so
//!   no extrapolation beyond the computed family occurs.
//! * **Per-radius interpolation**: At radius `j`, linear interpolation on
//!   `(L_k, V(L_k, r_j))` at `L_eff_clip[j]`.
//!
//! ## Invariants
//!
//! * Each adaptive value lies between the smallest and largest basis value at that radius.
//! * If `L_eff` equals a basis scale everywhere, the result is that basis curve.
//! * Output length equals the basis radius grid length.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::basis::BasisSet;
use crate::math::interpolation::{clip, interp};
use crate::primitives::errors::GalrotError;

/// Adaptive curve and the scales actually used.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveCurve<T> {
    /// Radii in kpc.
    pub r: Vec<T>,

    /// Adaptive total velocity in km/s.
    pub v_adaptive: Vec<T>,

    /// Effective scale as supplied.
    pub l_eff: Vec<T>,

    /// Effective scale after clipping into the basis range.
    pub l_eff_clipped: Vec<T>,

    /// Number of radii where clipping changed the scale.
    pub clipped_count: usize,
}

/// Evaluate the basis at the effective scale of every radius.
pub fn interpolate<T: Float>(basis: &BasisSet<T>, l_eff: &[T]) -> Result<AdaptiveCurve<T>, GalrotError> {
    let n = basis.radii().len();
    if l_eff.len() != n {
        return Err(GalrotError::MismatchedInputs {
            r_len: n,
            v_len: l_eff.len(),
        });
    }

    let (lo, hi) = (basis.l_min(), basis.l_max());
    let scales = basis.scales();

    let mut v_adaptive = Vec::with_capacity(n);
    let mut l_eff_clipped = Vec::with_capacity(n);
    let mut clipped_count = 0;

    for (j, &l) in l_eff.iter().enumerate() {
        let lc = clip(l, lo, hi);
        if lc != l {
            clipped_count += 1;
        }
        let column = basis.column(j);
        v_adaptive.push(interp(lc, scales, &column));
        l_eff_clipped.push(lc);
    }

    Ok(AdaptiveCurve {
        r: basis.radii().to_vec(),
        v_adaptive,
        l_eff: l_eff.to_vec(),
        l_eff_clipped,
        clipped_count,
    })
}
