//! Layer 3: Algorithms
//!
//! # Purpose
//!
//! This layer implements the core rotation-curve algorithms:
//! - Stiffness field χ(r) from the baryonic curve
//! - Adaptive length-scale profile L_eff(r)
//! - Basis scale selection and grid alignment
//! - Per-radius interpolation across basis scales
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
//! Layer 3: Algorithms ← You are here
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Stiffness field.
pub mod chi;

/// Adaptive length-scale profile.
pub mod leff;

/// Basis scales and curves.
pub mod basis;

/// Interpolation across basis scales.
pub mod adaptive;
