#![cfg(feature = "dev")]
//! Tests for basis assembly and adaptive interpolation.
//!
//! ## Test Organization
//!
//! 1. **Scale Selection** - Multipliers to scales
//! 2. **Basis Set** - Construction and validation
//! 3. **Alignment** - Strict and lenient grids
//! 4. **Interpolation** - Per-radius evaluation and clipping

use approx::assert_relative_eq;

use galrot::internals::algorithms::adaptive::interpolate;
use galrot::internals::algorithms::basis::{
    align, basis_scales, Alignment, BasisSet, DEFAULT_MULTIPLIERS,
};
use galrot::internals::primitives::errors::GalrotError;

fn three_scale_basis() -> BasisSet<f64> {
    let r = vec![1.0, 2.0, 3.0, 4.0];
    BasisSet::new(
        r,
        vec![
            (30.0, vec![50.0, 70.0, 80.0, 85.0]),
            (10.0, vec![60.0, 90.0, 100.0, 95.0]),
            (20.0, vec![55.0, 80.0, 90.0, 90.0]),
        ],
    )
    .unwrap()
}

// ============================================================================
// Scale Selection Tests
// ============================================================================

/// Scales are ascending and distinct.
#[test]
fn test_basis_scales_sorted_unique() {
    let s = basis_scales(20.0f64, &[1.0, 0.5, 1.0, 0.75]);
    assert_eq!(s, vec![10.0, 15.0, 20.0]);
}

/// The default multipliers give eight scales topped by L0.
#[test]
fn test_default_multipliers() {
    let s = basis_scales(50.0f64, &DEFAULT_MULTIPLIERS);
    assert_eq!(s.len(), 8);
    assert_relative_eq!(s[7], 50.0, epsilon = 1e-12);
    assert_relative_eq!(s[0], 15.0, epsilon = 1e-12);
}

// ============================================================================
// Basis Set Tests
// ============================================================================

/// Members are stored by ascending scale.
#[test]
fn test_basis_set_ordering() {
    let b = three_scale_basis();
    assert_eq!(b.scales(), &[10.0, 20.0, 30.0]);
    assert_eq!(b.curve(0), &[60.0, 90.0, 100.0, 95.0]);
    assert_eq!(b.l_min(), 10.0);
    assert_eq!(b.l_max(), 30.0);
    assert_eq!(b.column(1), vec![90.0, 80.0, 70.0]);
    assert_eq!(b.len(), 3);
}

/// A single distinct scale is not a basis.
#[test]
fn test_basis_needs_two_scales() {
    let err = BasisSet::new(
        vec![1.0f64, 2.0],
        vec![(10.0, vec![1.0, 2.0]), (10.0, vec![1.0, 2.0])],
    )
    .unwrap_err();
    assert_eq!(err, GalrotError::InsufficientBasis { got: 1, min: 2 });
}

/// Curves must match the reference grid and scales must be positive.
#[test]
fn test_basis_validation() {
    let err = BasisSet::new(
        vec![1.0f64, 2.0],
        vec![(10.0, vec![1.0, 2.0]), (20.0, vec![1.0])],
    )
    .unwrap_err();
    assert!(matches!(
        err,
        GalrotError::BasisGridMismatch {
            got: 1,
            expected: 2,
            ..
        }
    ));

    let err = BasisSet::new(
        vec![1.0f64, 2.0],
        vec![(-1.0, vec![1.0, 2.0]), (20.0, vec![1.0, 2.0])],
    )
    .unwrap_err();
    assert!(matches!(err, GalrotError::InvalidScaleLength(_)));
}

// ============================================================================
// Alignment Tests
// ============================================================================

/// Identical grids are used as-is.
#[test]
fn test_align_exact() {
    let r = vec![1.0f64, 2.0, 3.0];
    let out = align(10.0, &r, &r, &[5.0, 6.0, 7.0], true).unwrap();
    assert!(!out.was_resampled());
    assert_eq!(out.into_values(), vec![5.0, 6.0, 7.0]);
}

/// Strict mode rejects a shifted grid; lenient mode resamples it.
#[test]
fn test_align_mismatch() {
    let r_ref = vec![1.0f64, 2.0, 3.0];
    let r_now = vec![0.5f64, 1.5, 2.5];
    let v_now = vec![10.0f64, 20.0, 30.0];

    let err = align(15.0, &r_ref, &r_now, &v_now, true).unwrap_err();
    assert!(matches!(err, GalrotError::BasisGridMismatch { .. }));

    let out = align(15.0, &r_ref, &r_now, &v_now, false).unwrap();
    assert_eq!(
        out,
        Alignment::Resampled(vec![15.0, 25.0, 30.0]),
        "interior values interpolate, the outer value is clamped"
    );
}

// ============================================================================
// Interpolation Tests
// ============================================================================

/// A constant L_eff equal to a basis scale reproduces that curve.
#[test]
fn test_exact_scale_reproduces_curve() {
    let b = three_scale_basis();
    let out = interpolate(&b, &[20.0; 4]).unwrap();
    assert_eq!(out.v_adaptive, b.curve(1).to_vec());
    assert_eq!(out.clipped_count, 0);
}

/// Between scales the curve interpolates linearly on the scale axis.
#[test]
fn test_between_scales() {
    let b = three_scale_basis();
    let out = interpolate(&b, &[15.0, 25.0, 10.0, 30.0]).unwrap();
    assert_relative_eq!(out.v_adaptive[0], 57.5, epsilon = 1e-12);
    assert_relative_eq!(out.v_adaptive[1], 75.0, epsilon = 1e-12);
    assert_relative_eq!(out.v_adaptive[2], 100.0, epsilon = 1e-12);
    assert_relative_eq!(out.v_adaptive[3], 85.0, epsilon = 1e-12);
}

/// Out-of-range scales are clipped into the basis range.
#[test]
fn test_clipping() {
    let b = three_scale_basis();
    let out = interpolate(&b, &[5.0, 40.0, 20.0, 20.0]).unwrap();
    assert_eq!(out.l_eff_clipped, vec![10.0, 30.0, 20.0, 20.0]);
    assert_eq!(out.clipped_count, 2);
    assert_eq!(out.v_adaptive[0], 60.0);
    assert_eq!(out.v_adaptive[1], 70.0);
}

/// Every adaptive value lies within the basis column at its radius.
#[test]
fn test_values_within_column_bounds() {
    let b = three_scale_basis();
    let l_eff = vec![12.0, 18.5, 26.0, 29.9];
    let out = interpolate(&b, &l_eff).unwrap();
    for (j, &v) in out.v_adaptive.iter().enumerate() {
        let col = b.column(j);
        let lo = col.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(v >= lo - 1e-12 && v <= hi + 1e-12);
    }
}

/// L_eff must have one value per basis radius.
#[test]
fn test_length_mismatch() {
    let b = three_scale_basis();
    let err = interpolate(&b, &[20.0; 3]).unwrap_err();
    assert!(matches!(err, GalrotError::MismatchedInputs { .. }));
}
