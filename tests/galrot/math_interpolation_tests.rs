#![cfg(feature = "dev")]
//! Tests for piecewise-linear interpolation.
//!
//! ## Test Organization
//!
//! 1. **Interior** - Values between samples
//! 2. **Out of Range** - Clamping and fill values
//! 3. **Helpers** - Grid comparison and clipping

use approx::assert_relative_eq;

use galrot::internals::math::interpolation::{
    allclose, clip, interp, interp_or, resample, resample_or,
};

// ============================================================================
// Interior Tests
// ============================================================================

/// Midpoints interpolate linearly; knots are reproduced.
#[test]
fn test_interior_values() {
    let xp = vec![1.0f64, 2.0, 4.0];
    let fp = vec![10.0f64, 20.0, 0.0];

    assert_relative_eq!(interp(1.5, &xp, &fp), 15.0, epsilon = 1e-12);
    assert_relative_eq!(interp(3.0, &xp, &fp), 10.0, epsilon = 1e-12);
    assert_relative_eq!(interp(2.0, &xp, &fp), 20.0, epsilon = 1e-12);
    assert_relative_eq!(interp(4.0, &xp, &fp), 0.0, epsilon = 1e-12);
}

// ============================================================================
// Out of Range Tests
// ============================================================================

/// Clamped interpolation returns the end values.
#[test]
fn test_clamped_outside() {
    let xp = vec![1.0f64, 2.0];
    let fp = vec![5.0f64, 7.0];

    assert_eq!(interp(0.0, &xp, &fp), 5.0);
    assert_eq!(interp(9.0, &xp, &fp), 7.0);
    assert_eq!(resample(&[0.0, 1.5, 3.0], &xp, &fp), vec![5.0, 6.0, 7.0]);
}

/// Filled interpolation returns the fill values outside the table.
#[test]
fn test_fill_outside() {
    let xp = vec![1.0f64, 2.0];
    let fp = vec![5.0f64, 7.0];

    assert!(interp_or(0.5, &xp, &fp, f64::NAN, f64::NAN).is_nan());
    assert_eq!(interp_or(3.0, &xp, &fp, -1.0, -2.0), -2.0);

    let out = resample_or(&[0.0, 1.0, 2.5], &xp, &fp, f64::NAN);
    assert!(out[0].is_nan());
    assert_eq!(out[1], 5.0);
    assert!(out[2].is_nan());
}

/// Empty tables yield NaN.
#[test]
fn test_empty_table() {
    assert!(interp(1.0f64, &[], &[]).is_nan());
}

// ============================================================================
// Helper Tests
// ============================================================================

/// Grid comparison honours the absolute tolerance and lengths.
#[test]
fn test_allclose() {
    let a = vec![1.0f64, 2.0, 3.0];
    let b = vec![1.0f64, 2.0 + 5e-11, 3.0];
    let c = vec![1.0f64, 2.0 + 1e-6, 3.0];

    assert!(allclose(&a, &b, 1e-10));
    assert!(!allclose(&a, &c, 1e-10));
    assert!(!allclose(&a, &a[..2], 1e-10));
}

/// Clip keeps values inside the interval.
#[test]
fn test_clip() {
    assert_eq!(clip(5.0f64, 1.0, 3.0), 3.0);
    assert_eq!(clip(-5.0f64, 1.0, 3.0), 1.0);
    assert_eq!(clip(2.0f64, 1.0, 3.0), 2.0);
}
