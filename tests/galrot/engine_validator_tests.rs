#![cfg(feature = "dev")]
//! Tests for input and parameter validation.
//!
//! ## Test Organization
//!
//! 1. **Curves** - Shape, finiteness, ordering
//! 2. **Parameters** - Scales, strengths, fractions
//! 3. **Builder** - Duplicate detection

use galrot::internals::algorithms::leff::Taper;
use galrot::internals::engine::validator::Validator;
use galrot::internals::primitives::errors::GalrotError;

// ============================================================================
// Curve Validation Tests
// ============================================================================

/// Well-formed curves pass.
#[test]
fn test_valid_curve() {
    assert!(Validator::validate_curve(&[1.0f64, 2.0, 3.0], &[1.0, 1.0, 1.0], 2).is_ok());
}

/// Empty, mismatched and short curves fail in that order.
#[test]
fn test_curve_shape_errors() {
    assert_eq!(
        Validator::validate_curve::<f64>(&[], &[], 2),
        Err(GalrotError::EmptyInput)
    );
    assert_eq!(
        Validator::validate_curve(&[1.0f64, 2.0], &[1.0], 1),
        Err(GalrotError::MismatchedInputs { r_len: 2, v_len: 1 })
    );
    assert_eq!(
        Validator::validate_curve(&[1.0f64], &[1.0], 2),
        Err(GalrotError::TooFewPoints { got: 1, min: 2 })
    );
}

/// Non-finite values are reported with their position.
#[test]
fn test_curve_non_finite() {
    let err = Validator::validate_curve(&[1.0f64, 2.0], &[1.0, f64::NAN], 2).unwrap_err();
    match err {
        GalrotError::InvalidNumericValue(msg) => assert!(msg.starts_with("v[1]")),
        other => panic!("unexpected error {other:?}"),
    }
}

/// Repeated or decreasing radii are rejected.
#[test]
fn test_curve_ordering() {
    assert_eq!(
        Validator::validate_curve(&[1.0f64, 2.0, 2.0], &[1.0; 3], 2),
        Err(GalrotError::UnsortedRadii { index: 2 })
    );
    assert_eq!(
        Validator::validate_curve(&[3.0f64, 2.0], &[1.0; 2], 2),
        Err(GalrotError::UnsortedRadii { index: 1 })
    );
}

// ============================================================================
// Parameter Validation Tests
// ============================================================================

/// Length scales must be positive and finite.
#[test]
fn test_scale_length() {
    assert!(Validator::validate_scale_length(2.5f64).is_ok());
    assert!(Validator::validate_scale_length(0.0f64).is_err());
    assert!(Validator::validate_scale_length(f64::INFINITY).is_err());
}

/// Alpha and sigma accept zero but not negatives.
#[test]
fn test_alpha_and_sigma() {
    assert!(Validator::validate_alpha(0.0f64).is_ok());
    assert_eq!(
        Validator::validate_alpha(-1.0f64),
        Err(GalrotError::InvalidAlpha(-1.0))
    );
    assert!(Validator::validate_sigma(0.0f64).is_ok());
    assert!(Validator::validate_sigma(-0.5f64).is_err());
}

/// Fractions live in (0, 1]; floors in [0, 1).
#[test]
fn test_fractions() {
    assert!(Validator::validate_fraction(1.0f64).is_ok());
    assert!(Validator::validate_fraction(0.0f64).is_err());
    assert!(Validator::validate_fraction(1.2f64).is_err());
    assert!(Validator::validate_floor_fraction(0.0f64).is_ok());
    assert!(Validator::validate_floor_fraction(1.0f64).is_err());
    assert!(Validator::validate_tolerance(2.0f64).is_ok());
    assert!(Validator::validate_tolerance(0.0f64).is_err());
}

/// The taper midpoint lies strictly inside the disk and the slope is positive.
#[test]
fn test_taper() {
    assert!(Validator::validate_taper(&Taper { r0: 0.7f64, k: 80.0 }).is_ok());
    assert!(Validator::validate_taper(&Taper { r0: 1.0f64, k: 80.0 }).is_err());
    assert!(Validator::validate_taper(&Taper { r0: 0.7f64, k: 0.0 }).is_err());
}

/// Multipliers need two distinct positive values.
#[test]
fn test_multipliers() {
    assert!(Validator::validate_multipliers(&[1.0f64, 0.5]).is_ok());
    assert_eq!(
        Validator::validate_multipliers(&[1.0f64, 1.0]),
        Err(GalrotError::InsufficientBasis { got: 1, min: 2 })
    );
    assert!(Validator::validate_multipliers(&[1.0f64, -0.5]).is_err());
}

// ============================================================================
// Builder Validation Tests
// ============================================================================

/// A duplicate marker becomes an error naming the parameter.
#[test]
fn test_duplicates() {
    assert!(Validator::validate_no_duplicates(None).is_ok());
    assert_eq!(
        Validator::validate_no_duplicates(Some("alpha")),
        Err(GalrotError::DuplicateParameter { parameter: "alpha" })
    );
}
