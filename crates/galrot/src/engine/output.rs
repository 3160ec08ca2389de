//! Result structures for the profile and adaptive passes.
//!
//! ## Purpose
//!
//! This module defines the outputs of the two passes of the engine: the
//! stiffness and length-scale profile of a galaxy, and the adaptive curve
//! with its stability gate.
//!
//! ## Design notes
//!
//! * **Self-describing**: Results keep the parameters they were computed with,
//!   so that writers can record them next to the data.
//! * **Ergonomics**: Implements `Display` for human-readable summaries.
//!
//! ## Invariants
//!
//! * All per-radius vectors in a result have the same length.
//!
//! ## Non-goals
//!
//! * This module does not serialize results; the pipeline crate writes files.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use core::fmt::{Debug, Display, Formatter, Result};
use num_traits::Float;

// Internal dependencies
use crate::algorithms::adaptive::AdaptiveCurve;
use crate::algorithms::chi::ChiComputation;
use crate::algorithms::leff::{LeffConfig, LeffProfile};
use crate::evaluation::diagnostics::LeffSummary;
use crate::evaluation::stability::{OuterGate, OuterStability};

// ============================================================================
// Profile Result
// ============================================================================

/// Stiffness field and adaptive length-scale profile of one galaxy.
#[derive(Debug, Clone, PartialEq)]
pub struct LeffResult<T> {
    /// χ (raw and optionally pre-smoothed).
    pub chi: ChiComputation<T>,

    /// L_eff profile.
    pub profile: LeffProfile<T>,

    /// Stellar disk scale length used to make χ dimensionless.
    pub rd_star: T,

    /// Settings of the χ → L_eff mapping.
    pub config: LeffConfig<T>,
}

impl<T: Float> LeffResult<T> {
    /// Radii in kpc.
    pub fn r(&self) -> &[T] {
        &self.profile.r
    }

    /// Effective scale at every radius.
    pub fn l_eff(&self) -> &[T] {
        &self.profile.l_eff
    }

    /// Compact summary of L_eff.
    pub fn summary(&self) -> Option<LeffSummary<T>> {
        LeffSummary::from_profile(&self.profile.l_eff)
    }
}

// ============================================================================
// Adaptive Result
// ============================================================================

/// Adaptive curve, its baseline, and the outer stability gate.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveResult<T> {
    /// Adaptive curve on the basis grid.
    pub curve: AdaptiveCurve<T>,

    /// Baseline total velocity on the same grid.
    pub v_baseline: Vec<T>,

    /// `V_adaptive − V_baseline`.
    pub dv: Vec<T>,

    /// Smallest and largest basis scale.
    pub basis_range: (T, T),

    /// Gate settings.
    pub gate: OuterGate<T>,

    /// Gate outcome.
    pub stability: OuterStability<T>,
}

impl<T: Float> AdaptiveResult<T> {
    /// Radii in kpc.
    pub fn r(&self) -> &[T] {
        &self.curve.r
    }

    /// Adaptive total velocity.
    pub fn v_adaptive(&self) -> &[T] {
        &self.curve.v_adaptive
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

fn rows_to_show(n: usize) -> Vec<usize> {
    if n <= 20 {
        (0..n).collect()
    } else {
        (0..10).chain(n - 10..n).collect()
    }
}

impl<T: Float + Display + Debug> Display for LeffResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let p = &self.profile;
        writeln!(f, "Summary:")?;
        writeln!(f, "  Radii:    {}", p.r.len())?;
        writeln!(f, "  Rd_star:  {} kpc", self.rd_star)?;
        writeln!(f, "  L0:       {} kpc", p.l0)?;
        writeln!(f, "  Alpha:    {}", self.config.alpha)?;
        match &self.config.taper {
            Some(t) => writeln!(f, "  Taper:    r0={} k={}", t.r0, t.k)?,
            None => writeln!(f, "  Taper:    off")?,
        }
        if let Some(s) = self.summary() {
            writeln!(f, "  {}", s)?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>8} {:>8} {:>12} {:>12} {:>8} {:>10} {:>10}",
            "R_kpc", "r_frac", "chi_raw", "chi_used", "mask", "L_adapt", "L_eff"
        )?;
        writeln!(f, "{:-<74}", "")?;

        let n = p.r.len();
        let rows = rows_to_show(n);
        for (k, &i) in rows.iter().enumerate() {
            if k == 10 && n > 20 {
                writeln!(f, "{:>8}", "...")?;
            }
            writeln!(
                f,
                "{:>8.3} {:>8.4} {:>12.6} {:>12.6} {:>8.4} {:>10.4} {:>10.4}",
                p.r[i], p.r_frac[i], p.chi_raw[i], p.chi_used[i], p.mask[i], p.l_adapt[i], p.l_eff[i]
            )?;
        }
        Ok(())
    }
}

impl<T: Float + Display + Debug> Display for AdaptiveResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Radii:        {}", self.curve.r.len())?;
        writeln!(
            f,
            "  Basis L:      [{}, {}] kpc",
            self.basis_range.0, self.basis_range.1
        )?;
        writeln!(f, "  Clipped L_eff: {}", self.curve.clipped_count)?;
        writeln!(
            f,
            "  Outer gate:   r_frac >= {}, max|dV| = {:.6} km/s (tol {}) -> {}",
            self.gate.rfrac_outer,
            self.stability.max_abs_dv,
            self.gate.tol_kms,
            if self.stability.pass { "PASS" } else { "FAIL" }
        )?;
        writeln!(f)?;

        writeln!(
            f,
            "{:>8} {:>12} {:>12} {:>10} {:>10}",
            "R_kpc", "V_baseline", "V_adaptive", "dV", "L_eff"
        )?;
        writeln!(f, "{:-<56}", "")?;

        let n = self.curve.r.len();
        let rows = rows_to_show(n);
        for (k, &i) in rows.iter().enumerate() {
            if k == 10 && n > 20 {
                writeln!(f, "{:>8}", "...")?;
            }
            writeln!(
                f,
                "{:>8.3} {:>12.4} {:>12.4} {:>10.4} {:>10.4}",
                self.curve.r[i],
                self.v_baseline[i],
                self.curve.v_adaptive[i],
                self.dv[i],
                self.curve.l_eff[i]
            )?;
        }
        Ok(())
    }
}
