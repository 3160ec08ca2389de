//! High-level API for adaptive rotation-curve diagnostics.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements
//! a fluent builder for configuring the χ → L_eff mapping and the outer
//! gate, and a model that runs the profile and adaptive passes.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with defaults for every parameter.
//! * **Validated**: Parameters are validated once, when `.build()` is called.
//! * **Single assignment**: Setting a parameter twice is reported as
//!   [`GalrotError::DuplicateParameter`] at build time.
//! * **Type-Safe**: Generic over `Float` types.
//!
//! ### Configuration Flow
//!
//! 1. Create an [`AdaptiveBuilder`] via `Adaptive::new()`.
//! 2. Chain configuration methods (`.alpha()`, `.taper()`, etc.).
//! 3. Call `.build()` to obtain an [`AdaptiveModel`].
//! 4. Run `.profile(...)` and then `.adapt(...)`.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::chi::{ChiSmoothing, DEFAULT_EPS};
use crate::engine::executor::{Executor, ExecutorConfig};
use crate::engine::validator::Validator;
use crate::math::kernel::{DEFAULT_RADIUS, DEFAULT_SIGMA_IDX};

// Publicly re-exported types
pub use crate::algorithms::basis::{basis_scales, BasisSet, DEFAULT_MULTIPLIERS};
pub use crate::algorithms::leff::{ChiSource, LeffConfig, Taper};
pub use crate::engine::output::{AdaptiveResult, LeffResult};
pub use crate::evaluation::correlation::{CorrelationReport, CorrelationTest};
pub use crate::evaluation::diagnostics::{BaselineSummary, LeffSummary};
pub use crate::evaluation::scatter::{ScatterReport, ScatterTest, Verdict};
pub use crate::evaluation::stability::{OuterGate, OuterStability};
pub use crate::math::boundary::PaddingPolicy;
pub use crate::primitives::errors::GalrotError;

/// Fluent builder for the adaptive model.
#[derive(Debug, Clone)]
pub struct AdaptiveBuilder<T> {
    /// Deformation strength (default 1.0).
    pub alpha: Option<T>,

    /// Pre-differentiation smoothing of `g_bar` (off by default).
    pub smoothing: Option<(T, usize)>,

    /// Width of the display smoothing of χ (default 1 sample).
    pub display_sigma: Option<T>,

    /// χ variant that drives L_eff (default raw).
    pub chi_source: Option<ChiSource>,

    /// Normalize χ by its maximum (default true).
    pub normalize_chi: Option<bool>,

    /// Floor on L_adapt as a fraction of L0 (off by default).
    pub floor_fraction: Option<T>,

    /// Outer taper `(r0, k)` (off by default).
    pub taper: Option<Taper<T>>,

    /// Outer gate `(rfrac, tol_kms)` (default 0.70, 2 km/s).
    pub outer_gate: Option<OuterGate<T>>,

    /// Floor in the χ denominator (default 1e-30).
    pub eps: Option<T>,

    /// Tracks if any parameter was set multiple times (for validation).
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: Float> Default for AdaptiveBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> AdaptiveBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            alpha: None,
            smoothing: None,
            display_sigma: None,
            chi_source: None,
            normalize_chi: None,
            floor_fraction: None,
            taper: None,
            outer_gate: None,
            eps: None,
            duplicate_param: None,
        }
    }

    fn mark(&mut self, already_set: bool, name: &'static str) {
        if already_set {
            self.duplicate_param = Some(name);
        }
    }

    /// Set the deformation strength.
    pub fn alpha(mut self, alpha: T) -> Self {
        self.mark(self.alpha.is_some(), "alpha");
        self.alpha = Some(alpha);
        self
    }

    /// Smooth `g_bar` with a Gaussian of `sigma_idx` samples before differentiating.
    pub fn smoothing(mut self, sigma_idx: T, radius: usize) -> Self {
        self.mark(self.smoothing.is_some(), "smoothing");
        self.smoothing = Some((sigma_idx, radius));
        self
    }

    /// Smooth `g_bar` with the default 9-tap Gaussian before differentiating.
    pub fn default_smoothing(self) -> Self {
        self.smoothing(T::from(DEFAULT_SIGMA_IDX).unwrap(), DEFAULT_RADIUS)
    }

    /// Set the width of the display smoothing of χ.
    pub fn display_sigma(mut self, sigma_idx: T) -> Self {
        self.mark(self.display_sigma.is_some(), "display_sigma");
        self.display_sigma = Some(sigma_idx);
        self
    }

    /// Choose the χ variant that drives L_eff.
    pub fn chi_source(mut self, source: ChiSource) -> Self {
        self.mark(self.chi_source.is_some(), "chi_source");
        self.chi_source = Some(source);
        self
    }

    /// Enable or disable normalization of χ by its maximum.
    pub fn normalize_chi(mut self, normalize: bool) -> Self {
        self.mark(self.normalize_chi.is_some(), "normalize_chi");
        self.normalize_chi = Some(normalize);
        self
    }

    /// Floor L_adapt at `fraction · L0`.
    pub fn floor_fraction(mut self, fraction: T) -> Self {
        self.mark(self.floor_fraction.is_some(), "floor_fraction");
        self.floor_fraction = Some(fraction);
        self
    }

    /// Enable the outer taper with midpoint `r0` (fraction of r_max) and steepness `k`.
    pub fn taper(mut self, r0: T, k: T) -> Self {
        self.mark(self.taper.is_some(), "taper");
        self.taper = Some(Taper { r0, k });
        self
    }

    /// Configure the outer stability gate.
    pub fn outer_gate(mut self, rfrac_outer: T, tol_kms: T) -> Self {
        self.mark(self.outer_gate.is_some(), "outer_gate");
        self.outer_gate = Some(OuterGate {
            rfrac_outer,
            tol_kms,
        });
        self
    }

    /// Set the floor in the χ denominator.
    pub fn eps(mut self, eps: T) -> Self {
        self.mark(self.eps.is_some(), "eps");
        self.eps = Some(eps);
        self
    }

    /// Validate the configuration and build the model.
    pub fn build(self) -> Result<AdaptiveModel<T>, GalrotError> {
        Validator::validate_no_duplicates(self.duplicate_param)?;

        let alpha = self.alpha.unwrap_or_else(T::one);
        Validator::validate_alpha(alpha)?;

        let smoothing = match self.smoothing {
            Some((sigma_idx, radius)) => {
                Validator::validate_sigma(sigma_idx)?;
                Some(ChiSmoothing { sigma_idx, radius })
            }
            None => None,
        };

        let sigma_idx = self
            .display_sigma
            .unwrap_or_else(|| T::from(DEFAULT_SIGMA_IDX).unwrap());
        Validator::validate_sigma(sigma_idx)?;

        if let Some(f) = self.floor_fraction {
            Validator::validate_floor_fraction(f)?;
        }
        if let Some(t) = &self.taper {
            Validator::validate_taper(t)?;
        }

        let gate = self.outer_gate.unwrap_or_default();
        Validator::validate_fraction(gate.rfrac_outer)?;
        Validator::validate_tolerance(gate.tol_kms)?;

        let eps = self.eps.unwrap_or_else(|| T::from(DEFAULT_EPS).unwrap());
        if !eps.is_finite() || eps < T::zero() {
            return Err(GalrotError::InvalidTolerance(eps.to_f64().unwrap_or(f64::NAN)));
        }

        let config = ExecutorConfig {
            smoothing,
            leff: LeffConfig {
                alpha,
                sigma_idx,
                chi_source: self.chi_source.unwrap_or_default(),
                normalize: self.normalize_chi.unwrap_or(true),
                floor_fraction: self.floor_fraction,
                taper: self.taper,
            },
            eps,
            gate,
        };

        Ok(AdaptiveModel {
            executor: Executor::from_config(config),
        })
    }
}

/// Configured adaptive model.
#[derive(Debug, Clone)]
pub struct AdaptiveModel<T: Float> {
    executor: Executor<T>,
}

impl<T: Float> AdaptiveModel<T> {
    /// Resolved configuration.
    pub fn config(&self) -> &ExecutorConfig<T> {
        &self.executor.config
    }

    /// Compute χ and L_eff from a baryonic curve.
    pub fn profile(&self, r: &[T], v_baryon: &[T], rd_star: T, l0: T) -> Result<LeffResult<T>, GalrotError> {
        self.executor.profile_pass(r, v_baryon, rd_star, l0)
    }

    /// Interpolate the basis at L_eff and gate the result against the baseline.
    pub fn adapt(
        &self,
        profile: &LeffResult<T>,
        basis: &BasisSet<T>,
        v_baseline: &[T],
    ) -> Result<AdaptiveResult<T>, GalrotError> {
        self.executor.adaptive_pass(profile, basis, v_baseline)
    }

    /// Like [`adapt`](Self::adapt) for an L_eff profile stored on disk.
    pub fn adapt_profile(
        &self,
        r: &[T],
        l_eff: &[T],
        l0: T,
        basis: &BasisSet<T>,
        v_baseline: &[T],
    ) -> Result<AdaptiveResult<T>, GalrotError> {
        self.executor.adaptive_pass_on(r, l_eff, l0, basis, v_baseline)
    }
}
