#![cfg(feature = "dev")]
//! Tests for the high-level builder and model.
//!
//! ## Test Organization
//!
//! 1. **Builder** - Defaults, overrides, validation
//! 2. **Profile** - χ and L_eff through the model
//! 3. **Adapt** - Basis interpolation and the outer gate

use approx::assert_relative_eq;

use galrot::internals::api::{AdaptiveBuilder, BasisSet, ChiSource, GalrotError};

fn curve() -> (Vec<f64>, Vec<f64>) {
    let r: Vec<f64> = (1..=20).map(|i| 0.5 * i as f64).collect();
    let vb: Vec<f64> = r
        .iter()
        .map(|&x| 150.0 * x / (x + 1.5) * (-x / 25.0f64).exp())
        .collect();
    (r, vb)
}

fn basis(r: &[f64]) -> (BasisSet<f64>, Vec<f64>) {
    let v10: Vec<f64> = r.iter().map(|&x| 120.0 + 2.0 * x).collect();
    let v20: Vec<f64> = r.iter().map(|&x| 110.0 + 2.0 * x).collect();
    let b = BasisSet::new(r.to_vec(), vec![(10.0, v10), (20.0, v20.clone())]).unwrap();
    (b, v20)
}

// ============================================================================
// Builder Tests
// ============================================================================

/// Defaults resolve to the documented values.
#[test]
fn test_builder_defaults() {
    let model = AdaptiveBuilder::<f64>::new().build().unwrap();
    let cfg = model.config();
    assert_eq!(cfg.leff.alpha, 1.0);
    assert_eq!(cfg.leff.sigma_idx, 1.0);
    assert_eq!(cfg.leff.chi_source, ChiSource::Raw);
    assert!(cfg.leff.normalize);
    assert!(cfg.leff.taper.is_none());
    assert!(cfg.smoothing.is_none());
    assert_eq!(cfg.gate.rfrac_outer, 0.70);
    assert_eq!(cfg.gate.tol_kms, 2.0);
}

/// Setting a parameter twice is an error.
#[test]
fn test_duplicate_parameter() {
    let err = AdaptiveBuilder::<f64>::new()
        .alpha(1.0)
        .alpha(2.0)
        .build()
        .unwrap_err();
    assert_eq!(err, GalrotError::DuplicateParameter { parameter: "alpha" });
}

/// Invalid parameters are rejected at build time.
#[test]
fn test_invalid_parameters() {
    assert!(matches!(
        AdaptiveBuilder::<f64>::new().alpha(-0.1).build(),
        Err(GalrotError::InvalidAlpha(_))
    ));
    assert!(matches!(
        AdaptiveBuilder::<f64>::new().taper(1.5, 80.0).build(),
        Err(GalrotError::InvalidTaper { .. })
    ));
    assert!(matches!(
        AdaptiveBuilder::<f64>::new().outer_gate(0.0, 2.0).build(),
        Err(GalrotError::InvalidFraction(_))
    ));
    assert!(matches!(
        AdaptiveBuilder::<f64>::new().floor_fraction(1.0).build(),
        Err(GalrotError::InvalidFloorFraction(_))
    ));
}

// ============================================================================
// Profile Tests
// ============================================================================

/// The profile stays within `[L0 / (1 + alpha), L0]`.
#[test]
fn test_profile_bounds() {
    let (r, vb) = curve();
    let model = AdaptiveBuilder::new().alpha(2.0).build().unwrap();
    let out = model.profile(&r, &vb, 2.0, 30.0).unwrap();

    assert_eq!(out.r(), &r[..]);
    for &l in out.l_eff() {
        assert!(l <= 30.0 + 1e-9);
        assert!(l >= 10.0 - 1e-9);
    }
    let summary = out.summary().unwrap();
    assert!(summary.min <= summary.mean && summary.mean <= summary.max);
}

/// Unsorted radii are rejected before any computation.
#[test]
fn test_profile_rejects_unsorted() {
    let model = AdaptiveBuilder::<f64>::new().build().unwrap();
    let err = model
        .profile(&[1.0, 3.0, 2.0], &[10.0, 20.0, 30.0], 2.0, 20.0)
        .unwrap_err();
    assert_eq!(err, GalrotError::UnsortedRadii { index: 2 });
}

/// Requested smoothing produces the smoothed χ.
#[test]
fn test_profile_with_smoothing() {
    let (r, vb) = curve();
    let model = AdaptiveBuilder::new().default_smoothing().build().unwrap();
    let out = model.profile(&r, &vb, 2.0, 30.0).unwrap();
    assert!(out.chi.smooth.is_some());
}

// ============================================================================
// Adapt Tests
// ============================================================================

/// The adaptive curve lies between the basis curves and the gate sees ΔV.
#[test]
fn test_adapt_flow() {
    let (r, vb) = curve();
    let (b, v_baseline) = basis(&r);

    let model = AdaptiveBuilder::new().taper(0.7, 80.0).build().unwrap();
    let profile = model.profile(&r, &vb, 2.0, 20.0).unwrap();
    let out = model.adapt(&profile, &b, &v_baseline).unwrap();

    assert_eq!(out.r(), &r[..]);
    assert_eq!(out.basis_range, (10.0, 20.0));
    for (j, &v) in out.v_adaptive().iter().enumerate() {
        assert!(v >= 110.0 + 2.0 * r[j] - 1e-9);
        assert!(v <= 120.0 + 2.0 * r[j] + 1e-9);
        assert_relative_eq!(out.dv[j], v - v_baseline[j], epsilon = 1e-12);
    }
    assert_eq!(out.curve.clipped_count, 0);

    // Tapered outer radii sit near the L0 curve.
    assert!(out.stability.n_outer > 0);
    assert!(out.stability.max_abs_dv < 10.0);
}

/// A profile on a different grid than the basis is rejected.
#[test]
fn test_adapt_grid_mismatch() {
    let (r, vb) = curve();
    let (b, v_baseline) = basis(&r);

    let model = AdaptiveBuilder::new().build().unwrap();
    let profile = model.profile(&r[..10], &vb[..10], 2.0, 20.0).unwrap();
    let err = model.adapt(&profile, &b, &v_baseline).unwrap_err();
    assert!(matches!(err, GalrotError::BasisGridMismatch { .. }));
}
