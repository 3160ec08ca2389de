#![cfg(feature = "dev")]
//! Tests for the stiffness field χ.
//!
//! These tests verify:
//! - The null-field property (flat acceleration gives χ ≡ 0)
//! - Amplitude invariance (χ depends on shape only)
//! - Hand-computed values on a non-uniform grid
//! - Input validation
//!
//! ## Test Organization
//!
//! 1. **Acceleration** - `V²/R` and the radius floor
//! 2. **Null Field** - Constant acceleration
//! 3. **Invariance** - Amplitude scaling
//! 4. **Values** - Hand-computed χ
//! 5. **Smoothing** - Pre-differentiation smoothing
//! 6. **Errors** - Invalid inputs

use approx::assert_relative_eq;

use galrot::internals::algorithms::chi::{
    acceleration, chi_from_curve, chi_from_gbar, ChiSmoothing, DEFAULT_EPS,
};
use galrot::internals::primitives::errors::GalrotError;

fn sample_curve() -> (Vec<f64>, Vec<f64>) {
    let r: Vec<f64> = (1..=24).map(|i| 0.35 * i as f64).collect();
    let v: Vec<f64> = r
        .iter()
        .map(|&ri| 120.0 * (1.0 - (-ri / 2.2f64).exp()) * (1.0 + 0.02 * ri))
        .collect();
    (r, v)
}

// ============================================================================
// Acceleration Tests
// ============================================================================

/// `g = V²/R`, with the radius floored to keep the centre finite.
#[test]
fn test_acceleration() {
    let g = acceleration(&[100.0f64, 50.0], &[2.0, 0.0]);
    assert_relative_eq!(g[0], 5000.0, epsilon = 1e-12);
    assert!(g[1].is_finite());
    assert!(g[1] > 1e30);
}

// ============================================================================
// Null Field Tests
// ============================================================================

/// A flat acceleration profile has zero stiffness everywhere.
#[test]
fn test_constant_field_zero_chi() {
    let r = vec![0.4f64, 0.9, 1.7, 2.6, 3.1, 5.0, 7.7];
    let g = vec![1.2e3f64; r.len()];

    let out = chi_from_gbar(&r, &g, 3.0, DEFAULT_EPS).unwrap();
    assert!(out.chi.iter().all(|&c| c.abs() < 1e-12));
    assert_eq!(out.chi.len(), r.len());
}

/// χ is non-negative for any curve.
#[test]
fn test_chi_non_negative() {
    let (r, v) = sample_curve();
    let out = chi_from_curve(&r, &v, 2.2, None, DEFAULT_EPS).unwrap();
    assert!(out.raw.chi.iter().all(|&c| c >= 0.0));
}

// ============================================================================
// Invariance Tests
// ============================================================================

/// Rescaling the baryonic curve leaves χ unchanged.
#[test]
fn test_amplitude_invariance() {
    let (r, v) = sample_curve();
    let v10: Vec<f64> = v.iter().map(|&x| 10.0 * x).collect();

    let a = chi_from_curve(&r, &v, 2.5, None, DEFAULT_EPS).unwrap();
    let b = chi_from_curve(&r, &v10, 2.5, None, DEFAULT_EPS).unwrap();

    for (x, y) in a.raw.chi.iter().zip(&b.raw.chi) {
        assert_relative_eq!(*x, *y, epsilon = 1e-12, max_relative = 1e-9);
    }
}

// ============================================================================
// Value Tests
// ============================================================================

/// χ matches hand-computed values on a non-uniform grid.
#[test]
fn test_hand_computed_chi() {
    let r = vec![1.0f64, 2.0, 4.0];
    let g = vec![1.0f64, 4.0, 16.0];

    // dg/dr = [3, 4, 6]; g / Rd = [0.5, 2, 8]
    let out = chi_from_gbar(&r, &g, 2.0, 0.0).unwrap();
    assert_relative_eq!(out.dgdr[1], 4.0, epsilon = 1e-12);
    assert_relative_eq!(out.chi[0], 6.0, epsilon = 1e-12);
    assert_relative_eq!(out.chi[1], 2.0, epsilon = 1e-12);
    assert_relative_eq!(out.chi[2], 0.75, epsilon = 1e-12);
}

/// χ scales linearly with the stellar scale length.
#[test]
fn test_chi_proportional_to_rd() {
    let (r, v) = sample_curve();
    let a = chi_from_curve(&r, &v, 1.0, None, 0.0).unwrap();
    let b = chi_from_curve(&r, &v, 3.0, None, 0.0).unwrap();
    for (x, y) in a.raw.chi.iter().zip(&b.raw.chi) {
        assert_relative_eq!(3.0 * x, *y, max_relative = 1e-12);
    }
}

// ============================================================================
// Smoothing Tests
// ============================================================================

/// The smoothed variant is only produced on request.
#[test]
fn test_smoothing_optional() {
    let (r, v) = sample_curve();

    let none = chi_from_curve(&r, &v, 2.0, None, DEFAULT_EPS).unwrap();
    assert!(none.smooth.is_none());

    let s = ChiSmoothing {
        sigma_idx: 1.0,
        radius: 4,
    };
    let some = chi_from_curve(&r, &v, 2.0, Some(s), DEFAULT_EPS).unwrap();
    let smooth = some.smooth.expect("smoothed variant");
    assert_eq!(smooth.chi.len(), r.len());
    assert_eq!(some.raw, none.raw);
}

/// Smoothing damps the stiffness spike produced by a single outlier.
#[test]
fn test_smoothing_damps_spike() {
    let r: Vec<f64> = (1..=40).map(|i| 0.25 * i as f64).collect();
    let v: Vec<f64> = (0..40).map(|i| if i == 20 { 130.0 } else { 100.0 }).collect();

    let s = ChiSmoothing {
        sigma_idx: 1.0,
        radius: 4,
    };
    let out = chi_from_curve(&r, &v, 2.0, Some(s), DEFAULT_EPS).unwrap();
    let smooth = out.smooth.unwrap();

    let peak = |x: &[f64]| x[15..26].iter().copied().fold(0.0f64, f64::max);
    assert!(peak(&smooth.chi) < peak(&out.raw.chi));
}

// ============================================================================
// Error Tests
// ============================================================================

/// Non-finite radii and accelerations are rejected.
#[test]
fn test_non_finite_rejected() {
    let err = chi_from_gbar(&[1.0f64, f64::NAN], &[1.0, 2.0], 1.0, 0.0).unwrap_err();
    assert!(matches!(err, GalrotError::InvalidNumericValue(_)));

    let err = chi_from_gbar(&[1.0f64, 2.0], &[1.0, f64::INFINITY], 1.0, 0.0).unwrap_err();
    assert!(matches!(err, GalrotError::InvalidNumericValue(_)));
}

/// Rd_star must be positive and finite.
#[test]
fn test_invalid_rd_star() {
    for rd in [0.0f64, -1.0, f64::NAN, f64::INFINITY] {
        let err = chi_from_gbar(&[1.0f64, 2.0], &[1.0, 2.0], rd, 0.0).unwrap_err();
        assert!(matches!(err, GalrotError::InvalidScaleLength(_)));
    }
}
