//! Input validation for rotation-curve data and pipeline parameters.
//!
//! ## Purpose
//!
//! This module checks curves and parameters before any computation runs, so
//! that numerical routines can assume well-formed input.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Efficiency**: Checks are ordered from cheap to expensive.
//! * **Generics**: Validation is generic over `Float` types.
//!
//! ## Key concepts
//!
//! * **Curves**: Non-empty, equal lengths, finite, strictly increasing radii.
//! * **Parameter Bounds**: Scale lengths > 0, smoothing width >= 0, fractions in (0, 1].
//!
//! ## Invariants
//!
//! * Validation logic is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not sort, filter, or repair input data.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::format;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::leff::Taper;
use crate::primitives::errors::GalrotError;
use crate::primitives::sorting::first_non_increasing;

/// Validation utility for curves and parameters.
///
/// All methods return `Result<(), GalrotError>` and fail fast upon
/// identifying the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Curve Validation
    // ========================================================================

    /// Validate a curve sampled at radii `r`.
    pub fn validate_curve<T: Float>(r: &[T], v: &[T], min_points: usize) -> Result<(), GalrotError> {
        // Check 1: Non-empty arrays
        if r.is_empty() || v.is_empty() {
            return Err(GalrotError::EmptyInput);
        }

        // Check 2: Matching lengths
        let n = r.len();
        if n != v.len() {
            return Err(GalrotError::MismatchedInputs {
                r_len: n,
                v_len: v.len(),
            });
        }

        // Check 3: Enough points
        if n < min_points {
            return Err(GalrotError::TooFewPoints {
                got: n,
                min: min_points,
            });
        }

        // Check 4: All values finite
        for i in 0..n {
            if !r[i].is_finite() {
                return Err(GalrotError::InvalidNumericValue(format!(
                    "r[{}]={}",
                    i,
                    r[i].to_f64().unwrap_or(f64::NAN)
                )));
            }
            if !v[i].is_finite() {
                return Err(GalrotError::InvalidNumericValue(format!(
                    "v[{}]={}",
                    i,
                    v[i].to_f64().unwrap_or(f64::NAN)
                )));
            }
        }

        // Check 5: Strictly increasing radii
        if let Some(index) = first_non_increasing(r) {
            return Err(GalrotError::UnsortedRadii { index });
        }

        Ok(())
    }

    /// Validate that every value in `values` is finite.
    pub fn validate_finite<T: Float>(values: &[T], name: &str) -> Result<(), GalrotError> {
        match values.iter().position(|v| !v.is_finite()) {
            Some(i) => Err(GalrotError::InvalidNumericValue(format!(
                "{}[{}]={}",
                name,
                i,
                values[i].to_f64().unwrap_or(f64::NAN)
            ))),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Parameter Validation
    // ========================================================================

    /// Validate a physical length scale (Rd_star, L0, basis scales).
    pub fn validate_scale_length<T: Float>(l: T) -> Result<(), GalrotError> {
        if !l.is_finite() || l <= T::zero() {
            return Err(GalrotError::InvalidScaleLength(
                l.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate an index-space smoothing width.
    pub fn validate_sigma<T: Float>(sigma: T) -> Result<(), GalrotError> {
        if !sigma.is_finite() || sigma < T::zero() {
            return Err(GalrotError::InvalidSigma(sigma.to_f64().unwrap_or(f64::NAN)));
        }
        Ok(())
    }

    /// Validate the deformation strength.
    pub fn validate_alpha<T: Float>(alpha: T) -> Result<(), GalrotError> {
        if !alpha.is_finite() || alpha < T::zero() {
            return Err(GalrotError::InvalidAlpha(alpha.to_f64().unwrap_or(f64::NAN)));
        }
        Ok(())
    }

    /// Validate the L_adapt floor as a fraction of L0.
    pub fn validate_floor_fraction<T: Float>(f: T) -> Result<(), GalrotError> {
        if !f.is_finite() || f < T::zero() || f >= T::one() {
            return Err(GalrotError::InvalidFloorFraction(
                f.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate the outer taper.
    pub fn validate_taper<T: Float>(taper: &Taper<T>) -> Result<(), GalrotError> {
        let ok_r0 = taper.r0.is_finite() && taper.r0 > T::zero() && taper.r0 < T::one();
        let ok_k = taper.k.is_finite() && taper.k > T::zero();
        if !(ok_r0 && ok_k) {
            return Err(GalrotError::InvalidTaper {
                r0: taper.r0.to_f64().unwrap_or(f64::NAN),
                k: taper.k.to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(())
    }

    /// Validate a radial fraction in (0, 1].
    pub fn validate_fraction<T: Float>(fraction: T) -> Result<(), GalrotError> {
        if !fraction.is_finite() || fraction <= T::zero() || fraction > T::one() {
            return Err(GalrotError::InvalidFraction(
                fraction.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate a positive tolerance.
    pub fn validate_tolerance<T: Float>(tol: T) -> Result<(), GalrotError> {
        if !tol.is_finite() || tol <= T::zero() {
            return Err(GalrotError::InvalidTolerance(
                tol.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate a list of basis multipliers (positive, finite, at least two distinct).
    pub fn validate_multipliers<T: Float>(multipliers: &[T]) -> Result<(), GalrotError> {
        for &m in multipliers {
            Self::validate_scale_length(m)?;
        }
        let mut distinct = 0;
        for (i, &m) in multipliers.iter().enumerate() {
            if !multipliers[..i].contains(&m) {
                distinct += 1;
            }
        }
        if distinct < 2 {
            return Err(GalrotError::InsufficientBasis {
                got: distinct,
                min: 2,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Builder Validation
    // ========================================================================

    /// Report a parameter that was set more than once.
    pub fn validate_no_duplicates(duplicate: Option<&'static str>) -> Result<(), GalrotError> {
        match duplicate {
            Some(parameter) => Err(GalrotError::DuplicateParameter { parameter }),
            None => Ok(()),
        }
    }
}
