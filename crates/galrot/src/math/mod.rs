//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides pure mathematical functions used throughout the crate:
//! - Derivatives on non-uniform grids
//! - Index-space Gaussian smoothing and its boundary padding
//! - Linear interpolation
//! - Smooth hand-off masks
//!
//! These are reusable building blocks with no rotation-curve logic.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Non-uniform finite differences.
pub mod gradient;

/// Gaussian smoothing in index space.
pub mod kernel;

/// Boundary padding utilities.
pub mod boundary;

/// Linear interpolation.
pub mod interpolation;

/// Sigmoid and cosine masks.
pub mod taper;
