//! # galrot: Adaptive length-scale diagnostics for galaxy rotation curves
//!
//! Numerical core of a rotation-curve diagnostic pipeline. From a baryonic
//! rotation curve it derives a dimensionless stiffness field χ(r), maps it to
//! an adaptive kernel length scale L_eff(r), and evaluates a family of basis
//! velocity curves (each computed at a fixed length scale) at L_eff(r) radius
//! by radius. The adaptive curve is then compared with the baseline curve and
//! with observations.
//!
//! ## Quick Start
//!
//! ```rust
//! use galrot::prelude::*;
//!
//! let r = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let v_baryon = vec![40.0, 70.0, 85.0, 90.0, 88.0, 84.0];
//!
//! let model = Adaptive::new()
//!     .alpha(1.0)          // L_adapt = L0 / (1 + alpha * chi_amp)
//!     .taper(0.70, 80.0)   // hand L_eff back to L0 in the outer disk
//!     .build()?;
//!
//! // Rd_star = 2.5 kpc, L0 = 30 kpc
//! let profile = model.profile(&r, &v_baryon, 2.5, 30.0)?;
//! assert!(profile.l_eff().iter().all(|&l| l <= 30.0 + 1e-9));
//!
//! println!("{}", profile);
//! # Result::<(), GalrotError>::Ok(())
//! ```
//!
//! ### Adaptive curve
//!
//! ```rust
//! use galrot::prelude::*;
//!
//! let r = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//! let v_baryon = vec![50.0, 80.0, 90.0, 88.0, 85.0];
//! let v_baseline = vec![60.0, 95.0, 110.0, 115.0, 117.0];
//!
//! let model = Adaptive::new().build()?;
//! let profile = model.profile(&r, &v_baryon, 2.0, 20.0)?;
//!
//! // Basis curves at 10 and 20 kpc (normally produced by the pipeline model)
//! let basis = BasisSet::new(
//!     r.clone(),
//!     vec![
//!         (10.0, vec![62.0, 98.0, 113.0, 117.0, 118.0]),
//!         (20.0, v_baseline.clone()),
//!     ],
//! )?;
//!
//! let result = model.adapt(&profile, &basis, &v_baseline)?;
//! println!("{}", result);
//! # Result::<(), GalrotError>::Ok(())
//! ```
//!
//! ## Minimal Usage (no_std)
//!
//! The crate supports `no_std` environments with `alloc`. Disable default
//! features to remove the standard library dependency:
//!
//! ```toml
//! [dependencies]
//! galrot = { version = "0.3", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

// Layer 1: Primitives - errors and radius ordering.
mod primitives;

// Layer 2: Math - pure mathematical functions.
mod math;

// Layer 3: Algorithms - χ, L_eff, basis, adaptive interpolation.
mod algorithms;

// Layer 4: Evaluation - statistics and diagnostic tests.
mod evaluation;

// Layer 5: Engine - validation and pass execution.
mod engine;

// High-level fluent API.
mod api;

// Standard prelude.
pub mod prelude {
    pub use crate::api::{
        basis_scales, AdaptiveBuilder as Adaptive, AdaptiveModel, AdaptiveResult, BaselineSummary,
        BasisSet, ChiSource, CorrelationReport, CorrelationTest, GalrotError, LeffResult,
        LeffSummary, OuterGate, OuterStability, ScatterReport, ScatterTest, Taper, Verdict,
        DEFAULT_MULTIPLIERS,
    };
}

// Building blocks used by the pipeline crate.
//
// These are stable entry points into the lower layers that the file-driven
// pipeline needs directly (sorting tables on load, resampling curves,
// residual correlations, RAR points).
pub mod numerics {
    pub use crate::algorithms::basis::{align, Alignment, RADII_ATOL};
    pub use crate::algorithms::chi::acceleration;
    pub use crate::algorithms::leff::radial_fraction;
    pub use crate::evaluation::correlation::{
        rar_residual_correlation, residual_correlation, RarResidualReport, ResidualReport,
    };
    pub use crate::evaluation::diagnostics::{max_abs, mean, pearson_r, rms_log_scatter};
    pub use crate::math::interpolation::{allclose, interp, interp_or, resample, resample_or};
    pub use crate::math::taper::{cosine_taper, DEFAULT_TAPER_K, DEFAULT_TAPER_R0};
    pub use crate::primitives::sorting::{permute, radius_permutation, sort_by_radius, SortedTable};
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing purposes.
// It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod math {
        pub use crate::math::*;
    }
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod evaluation {
        pub use crate::evaluation::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
