//! Layer 5: Engine
//!
//! # Purpose
//!
//! This layer orchestrates the computation:
//! - Input and parameter validation
//! - The profile pass (χ and L_eff) and the adaptive pass (basis interpolation and gate)
//! - Result structures
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! Layer 4: Evaluation
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Pass execution.
pub mod executor;

/// Result types.
pub mod output;

/// Validation.
pub mod validator;
