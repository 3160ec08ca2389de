#![cfg(feature = "dev")]
//! Tests for the execution engine.
//!
//! ## Test Organization
//!
//! 1. **Profile Pass** - χ and L_eff from a baryonic curve
//! 2. **Adaptive Pass** - Basis interpolation, ΔV and grid checks

use approx::assert_relative_eq;

use galrot::internals::algorithms::adaptive::interpolate;
use galrot::internals::algorithms::basis::BasisSet;
use galrot::internals::algorithms::chi::{chi_from_curve, DEFAULT_EPS};
use galrot::internals::algorithms::leff::{leff_profile, LeffConfig};
use galrot::internals::engine::executor::{Executor, ExecutorConfig};
use galrot::internals::primitives::errors::GalrotError;

fn baryonic_curve() -> (Vec<f64>, Vec<f64>) {
    let r: Vec<f64> = (1..=12).map(|i| 0.5 * i as f64).collect();
    let v = r.iter().map(|&x| 100.0 * x / (x + 2.0)).collect();
    (r, v)
}

fn two_scale_basis(r: &[f64]) -> BasisSet<f64> {
    BasisSet::new(
        r.to_vec(),
        vec![
            (5.0, r.iter().map(|x| 120.0 + x).collect()),
            (10.0, r.iter().map(|x| 100.0 + x).collect()),
        ],
    )
    .unwrap()
}

// ============================================================================
// Profile Pass Tests
// ============================================================================

/// The profile pass is χ followed by the L_eff mapping of raw χ.
#[test]
fn test_profile_pass_matches_algorithms() {
    let (r, v) = baryonic_curve();
    let executor = Executor::<f64>::default();
    let result = executor.profile_pass(&r, &v, 2.0, 10.0).unwrap();

    let chi = chi_from_curve(&r, &v, 2.0, None, DEFAULT_EPS).unwrap();
    let profile = leff_profile(&r, &chi.raw.chi, 10.0, &LeffConfig::default());
    assert_eq!(result.chi, chi);
    assert_eq!(result.profile, profile);
    assert_eq!(result.rd_star, 2.0);
}

/// Invalid scale lengths are rejected before any work.
#[test]
fn test_profile_pass_rejects_bad_scales() {
    let (r, v) = baryonic_curve();
    let executor = Executor::<f64>::default();
    assert!(executor.profile_pass(&r, &v, 0.0, 10.0).is_err());
    assert!(executor.profile_pass(&r, &v, 2.0, -1.0).is_err());
}

// ============================================================================
// Adaptive Pass Tests
// ============================================================================

/// ΔV is the interpolated curve minus the baseline.
#[test]
fn test_adaptive_pass_on_loaded_profile() {
    let (r, _) = baryonic_curve();
    let basis = two_scale_basis(&r);
    let l_eff = vec![7.5; r.len()];
    let v_baseline: Vec<f64> = r.iter().map(|x| 100.0 + x).collect();

    let executor = Executor::from_config(ExecutorConfig::default());
    let result = executor
        .adaptive_pass_on(&r, &l_eff, 10.0, &basis, &v_baseline)
        .unwrap();

    assert_eq!(result.curve, interpolate(&basis, &l_eff).unwrap());
    for (j, dv) in result.dv.iter().enumerate() {
        assert_relative_eq!(*dv, result.curve.v_adaptive[j] - v_baseline[j], epsilon = 1e-12);
    }
    assert_eq!(result.basis_range, (5.0, 10.0));
}

/// A profile on another grid than the basis is a grid mismatch.
#[test]
fn test_adaptive_pass_grid_mismatch() {
    let (r, _) = baryonic_curve();
    let basis = two_scale_basis(&r);
    let shifted: Vec<f64> = r.iter().map(|x| x + 0.01).collect();
    let v_baseline = vec![100.0; r.len()];

    let executor = Executor::<f64>::default();
    assert!(matches!(
        executor.adaptive_pass_on(&shifted, &vec![7.5; r.len()], 10.0, &basis, &v_baseline),
        Err(GalrotError::BasisGridMismatch { .. })
    ));
}
