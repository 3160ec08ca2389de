//! Error types for rotation-curve diagnostics.
//!
//! ## Purpose
//!
//! This module defines the error conditions that can occur while computing
//! the stiffness field, the adaptive length-scale profile, and the adaptive
//! interpolation among basis curves.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors carry the offending value or the observed vs. expected sizes.
//! * **Deferred**: Builder misuse (duplicate parameters) is recorded and reported at `build()`.
//! * **No-std**: Supports `no_std` environments by using `alloc` for dynamic messages.
//! * **Trait Implementation**: Implements `Display` and `std::error::Error` (when `std` is enabled).
//!
//! ## Key concepts
//!
//! 1. **Input validation**: Empty or mismatched curves, non-finite samples, unsorted radii.
//! 2. **Parameter validation**: Scale lengths, smoothing widths, taper and gate settings.
//! 3. **Basis constraints**: Too few scales or radius grids that do not line up.
//!
//! ## Invariants
//!
//! * All variants provide sufficient context for diagnosis.
//! * Numeric values in errors are reported as `f64` regardless of the working precision.
//!
//! ## Non-goals
//!
//! * This module does not perform the validation logic itself.
//! * This module does not cover file or model errors (those live in the pipeline crate).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(feature = "std")]
use std::error::Error;
#[cfg(feature = "std")]
use std::string::String;

// External dependencies
use core::fmt::{Display, Formatter, Result};

// ============================================================================
// Error Type
// ============================================================================

/// Error type for rotation-curve diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum GalrotError {
    /// Input curve is empty.
    EmptyInput,

    /// Radius and velocity arrays must have the same number of elements.
    MismatchedInputs {
        /// Number of radii.
        r_len: usize,
        /// Number of values paired with the radii.
        v_len: usize,
    },

    /// Input data contains NaN or infinite values.
    InvalidNumericValue(String),

    /// Number of points is below the minimum for the requested operation.
    TooFewPoints {
        /// Number of points provided.
        got: usize,
        /// Minimum required points.
        min: usize,
    },

    /// Radii must be strictly increasing.
    UnsortedRadii {
        /// First index whose radius does not exceed its predecessor.
        index: usize,
    },

    /// Scale lengths (Rd_star, L0, basis scales) must be positive and finite.
    InvalidScaleLength(f64),

    /// Smoothing width must be non-negative and finite.
    InvalidSigma(f64),

    /// Deformation strength must be non-negative and finite.
    InvalidAlpha(f64),

    /// Floor fraction must lie in [0, 1).
    InvalidFloorFraction(f64),

    /// Outer taper needs a midpoint in (0, 1) and a positive steepness.
    InvalidTaper {
        /// Midpoint as a fraction of the outermost radius.
        r0: f64,
        /// Steepness of the sigmoid.
        k: f64,
    },

    /// Radial fractions must lie in (0, 1].
    InvalidFraction(f64),

    /// Tolerances must be positive and finite.
    InvalidTolerance(f64),

    /// A basis set needs at least two distinct scales.
    InsufficientBasis {
        /// Number of distinct scales provided.
        got: usize,
        /// Minimum required scales.
        min: usize,
    },

    /// A basis curve was sampled on a different radius grid than the reference.
    BasisGridMismatch {
        /// Scale of the offending basis curve.
        scale: f64,
        /// Number of radii in the offending curve.
        got: usize,
        /// Number of radii in the reference grid.
        expected: usize,
    },

    /// No radii satisfy the outer-region mask.
    NoOuterPoints,

    /// Parameter was set multiple times in the builder.
    DuplicateParameter {
        /// Name of the parameter that was set more than once.
        parameter: &'static str,
    },
}

// ============================================================================
// Display Implementation
// ============================================================================

impl Display for GalrotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::EmptyInput => write!(f, "Input curve is empty"),
            Self::MismatchedInputs { r_len, v_len } => {
                write!(f, "Length mismatch: r has {r_len} points, values have {v_len}")
            }
            Self::InvalidNumericValue(s) => write!(f, "Invalid numeric value: {s}"),
            Self::TooFewPoints { got, min } => {
                write!(f, "Too few points: got {got}, need at least {min}")
            }
            Self::UnsortedRadii { index } => write!(
                f,
                "Radii must be strictly increasing (violated at index {index})"
            ),
            Self::InvalidScaleLength(l) => {
                write!(f, "Invalid scale length: {l} (must be > 0 and finite)")
            }
            Self::InvalidSigma(s) => {
                write!(f, "Invalid smoothing width: {s} (must be >= 0 and finite)")
            }
            Self::InvalidAlpha(a) => {
                write!(f, "Invalid alpha: {a} (must be >= 0 and finite)")
            }
            Self::InvalidFloorFraction(x) => {
                write!(f, "Invalid floor fraction: {x} (must be in [0, 1))")
            }
            Self::InvalidTaper { r0, k } => write!(
                f,
                "Invalid taper: r0={r0} (must be in (0, 1)), k={k} (must be > 0)"
            ),
            Self::InvalidFraction(x) => {
                write!(f, "Invalid radial fraction: {x} (must be in (0, 1])")
            }
            Self::InvalidTolerance(t) => {
                write!(f, "Invalid tolerance: {t} (must be > 0 and finite)")
            }
            Self::InsufficientBasis { got, min } => {
                write!(f, "Insufficient basis: got {got} distinct scales, need at least {min}")
            }
            Self::BasisGridMismatch {
                scale,
                got,
                expected,
            } => write!(
                f,
                "Basis radii mismatch at L={scale} kpc: {got} radii vs {expected} in the reference grid"
            ),
            Self::NoOuterPoints => write!(f, "No radii fall in the outer region"),
            Self::DuplicateParameter { parameter } => write!(
                f,
                "Parameter '{parameter}' was set multiple times. Each parameter can only be configured once."
            ),
        }
    }
}

#[cfg(feature = "std")]
impl Error for GalrotError {}
