//! Layer 4: Evaluation
//!
//! # Purpose
//!
//! This layer compares curves after the adaptive pass:
//! - Summary statistics (Pearson r, log scatter, profile summaries)
//! - Outer-region stability gate
//! - Correlation of χ with velocity changes and residuals
//! - Inner log-scatter comparison against the observed curve
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Engine
//!   ↓
//! Layer 4: Evaluation ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Summary statistics.
pub mod diagnostics;

/// Outer stability gate.
pub mod stability;

/// χ correlation tests.
pub mod correlation;

/// Inner scatter comparison.
pub mod scatter;
