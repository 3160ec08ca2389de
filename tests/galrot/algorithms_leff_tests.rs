#![cfg(feature = "dev")]
//! Tests for the adaptive length-scale profile.
//!
//! ## Test Organization
//!
//! 1. **Mapping** - χ → L_adapt
//! 2. **Bounds** - L_eff <= L0, floor, monotonicity
//! 3. **Taper** - Outer hand-off to L0
//! 4. **Variants** - χ source and normalization

use approx::assert_relative_eq;

use galrot::internals::algorithms::leff::{
    adapt_scale, leff_profile, normalized_amplitude, radial_fraction, ChiSource, LeffConfig,
    Taper,
};

fn radii(n: usize) -> Vec<f64> {
    (1..=n).map(|i| i as f64 * 0.5).collect()
}

// ============================================================================
// Mapping Tests
// ============================================================================

/// `L_adapt = L0 / (1 + alpha * chi / max chi)`.
#[test]
fn test_mapping_values() {
    let r = vec![1.0f64, 2.0, 3.0];
    let chi = vec![0.0f64, 1.0, 2.0];
    let cfg = LeffConfig::default();

    let p = leff_profile(&r, &chi, 30.0, &cfg);
    assert_relative_eq!(p.l_adapt[0], 30.0, epsilon = 1e-12);
    assert_relative_eq!(p.l_adapt[1], 20.0, epsilon = 1e-12);
    assert_relative_eq!(p.l_adapt[2], 15.0, epsilon = 1e-12);
    assert_eq!(p.l_eff, p.l_adapt);
    assert!(p.mask.iter().all(|&m| m == 0.0));
}

/// Alpha scales the deformation.
#[test]
fn test_alpha_strength() {
    let l = adapt_scale(40.0f64, &[0.0, 0.5, 1.0], 2.0, None);
    assert_relative_eq!(l[0], 40.0, epsilon = 1e-12);
    assert_relative_eq!(l[1], 20.0, epsilon = 1e-12);
    assert_relative_eq!(l[2], 40.0 / 3.0, epsilon = 1e-12);
}

/// A vanishing χ leaves L_eff at L0.
#[test]
fn test_zero_chi_keeps_l0() {
    let r = radii(8);
    let chi = vec![0.0f64; 8];
    let p = leff_profile(&r, &chi, 12.0, &LeffConfig::default());
    assert!(p.l_eff.iter().all(|&l| l == 12.0));
    assert!(normalized_amplitude(&chi).iter().all(|&a| a == 0.0));
}

// ============================================================================
// Bound Tests
// ============================================================================

/// L_eff never exceeds L0 for non-negative alpha.
#[test]
fn test_leff_bounded_by_l0() {
    let r = radii(30);
    let chi: Vec<f64> = r.iter().map(|&x| (x * 1.3).sin().abs() * 4.0).collect();
    let cfg = LeffConfig {
        alpha: 2.0,
        taper: Some(Taper { r0: 0.7, k: 80.0 }),
        ..LeffConfig::default()
    };

    let p = leff_profile(&r, &chi, 50.0, &cfg);
    assert!(p.l_eff.iter().all(|&l| l <= 50.0 + 1e-9));
    assert!(p.l_eff.iter().all(|&l| l > 0.0));
}

/// Larger χ never gives a larger scale.
#[test]
fn test_monotone_in_chi() {
    let amp: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
    let l = adapt_scale(25.0f64, &amp, 1.5, None);
    assert!(l.windows(2).all(|w| w[1] <= w[0]));
}

/// The floor clamps L_adapt at a fraction of L0.
#[test]
fn test_floor_fraction() {
    let l = adapt_scale(100.0f64, &[0.0, 1.0], 1000.0, Some(0.05));
    assert_relative_eq!(l[0], 100.0, epsilon = 1e-12);
    assert_relative_eq!(l[1], 5.0, epsilon = 1e-12);
}

// ============================================================================
// Taper Tests
// ============================================================================

/// With the taper on, L_eff returns to L0 at the outermost radius.
#[test]
fn test_taper_returns_to_l0() {
    let r = radii(40);
    let chi = vec![1.0f64; 40];
    let cfg = LeffConfig {
        alpha: 1.0,
        normalize: true,
        taper: Some(Taper { r0: 0.7, k: 80.0 }),
        ..LeffConfig::default()
    };

    let p = leff_profile(&r, &chi, 20.0, &cfg);

    // Inner radii keep the full deformation.
    assert_relative_eq!(p.l_eff[0], 10.0, epsilon = 1e-9);
    // Outer radius is handed back to L0.
    assert_relative_eq!(p.l_eff[39], 20.0, epsilon = 1e-9);
    // Mask is monotone in radius.
    assert!(p.mask.windows(2).all(|w| w[1] >= w[0]));
    assert_relative_eq!(p.mask[27], 0.5, epsilon = 0.2);
}

/// Radial fraction is zero when the outermost radius is not positive.
#[test]
fn test_radial_fraction_degenerate() {
    assert_eq!(radial_fraction(&[0.0f64, 0.0]), vec![0.0, 0.0]);
    assert_eq!(radial_fraction(&[1.0f64, 2.0, 4.0]), vec![0.25, 0.5, 1.0]);
}

// ============================================================================
// Variant Tests
// ============================================================================

/// The smoothed χ can drive the deformation instead of the raw χ.
#[test]
fn test_chi_source_smoothed() {
    let r = radii(20);
    let chi: Vec<f64> = (0..20).map(|i| if i == 10 { 5.0 } else { 1.0 }).collect();

    let raw = leff_profile(&r, &chi, 10.0, &LeffConfig::default());
    let smoothed = leff_profile(
        &r,
        &chi,
        10.0,
        &LeffConfig {
            chi_source: ChiSource::Smoothed,
            ..LeffConfig::default()
        },
    );

    assert_eq!(raw.chi_used, raw.chi_raw);
    assert_eq!(smoothed.chi_used, smoothed.chi_smooth);
    assert!(smoothed.chi_smooth[10] < 5.0);
    assert_ne!(raw.l_eff, smoothed.l_eff);
}

/// Without normalization χ enters the mapping directly.
#[test]
fn test_unnormalized() {
    let r = vec![1.0f64, 2.0];
    let chi = vec![1.0f64, 3.0];
    let cfg = LeffConfig {
        normalize: false,
        ..LeffConfig::default()
    };
    let p = leff_profile(&r, &chi, 8.0, &cfg);
    assert_relative_eq!(p.l_adapt[0], 4.0, epsilon = 1e-12);
    assert_relative_eq!(p.l_adapt[1], 2.0, epsilon = 1e-12);
}
