//! Layer 1: Primitives
//!
//! # Purpose
//!
//! This layer provides the primitive abstractions and utility functions used
//! throughout the crate. It has zero internal dependencies within the crate.
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
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Radius ordering.
pub mod sorting;

/// Shared error types.
pub mod errors;
