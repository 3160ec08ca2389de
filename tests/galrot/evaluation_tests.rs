#![cfg(feature = "dev")]
//! Tests for the evaluation layer.
//!
//! ## Test Organization
//!
//! 1. **Statistics** - Pearson r, log scatter, summaries
//! 2. **Outer Gate** - Stability of the outer curve
//! 3. **Correlations** - χ against ΔV and residuals
//! 4. **Scatter** - Inner log-scatter comparison and verdicts

use approx::assert_relative_eq;

use galrot::internals::evaluation::correlation::{
    rar_residual_correlation, residual_correlation, CorrelationTest,
};
use galrot::internals::evaluation::diagnostics::{
    max_abs, pearson_r, rms_log_scatter, round_to, BaselineSummary, LeffSummary,
};
use galrot::internals::evaluation::scatter::{ScatterTest, Verdict};
use galrot::internals::evaluation::stability::OuterGate;
use galrot::internals::primitives::errors::GalrotError;

fn grid(n: usize) -> Vec<f64> {
    (1..=n).map(|i| i as f64).collect()
}

// ============================================================================
// Statistics Tests
// ============================================================================

/// Perfectly linear data correlates to ±1; constant data gives NaN.
#[test]
fn test_pearson_r() {
    let x = [1.0f64, 2.0, 3.0, 4.0];
    assert_relative_eq!(pearson_r(&x, &[2.0, 4.0, 6.0, 8.0]), 1.0, epsilon = 1e-12);
    assert_relative_eq!(pearson_r(&x, &[8.0, 6.0, 4.0, 2.0]), -1.0, epsilon = 1e-12);
    assert!(pearson_r(&x, &[1.0, 1.0, 1.0, 1.0]).is_nan());
    assert!(pearson_r(&[1.0f64], &[2.0]).is_nan());
}

/// A uniform factor of ten is one dex of scatter.
#[test]
fn test_log_scatter() {
    let obs = [10.0f64, 20.0, 30.0];
    let model = [100.0f64, 200.0, 300.0];
    assert_relative_eq!(rms_log_scatter(&model, &obs), 1.0, epsilon = 1e-12);
    assert_relative_eq!(rms_log_scatter(&obs, &obs), 0.0);
    assert!(rms_log_scatter::<f64>(&[], &[]).is_nan());
}

/// Helpers on empty and signed inputs.
#[test]
fn test_small_helpers() {
    assert_eq!(max_abs(&[1.0f64, -3.0, 2.0]), 3.0);
    assert!(max_abs::<f64>(&[]).is_nan());
    assert_relative_eq!(round_to(1.234_567f64, 4), 1.2346, epsilon = 1e-12);
}

/// L_eff summary reads the last radius as the outermost one.
#[test]
fn test_leff_summary() {
    let s = LeffSummary::from_profile(&[10.0f64, 6.0, 8.0, 9.123_456]).unwrap();
    assert_eq!(s.min, 6.0);
    assert_eq!(s.max, 10.0);
    assert_eq!(s.at_rmax, 9.123_456);
    assert_relative_eq!(s.rounded().at_rmax, 9.1235, epsilon = 1e-12);
    assert!(LeffSummary::<f64>::from_profile(&[]).is_none());
}

/// Kernel activity, inner overshoot and outer decay indicators.
#[test]
fn test_baseline_summary() {
    let vb = [50.0f64, 80.0, 95.0, 100.0, 100.0, 98.0, 96.0, 95.0];
    let vk = [30.0f64, 28.0, 25.0, 20.0, 15.0, 10.0, 8.0, 6.0];
    let vt: Vec<f64> = vb.iter().zip(&vk).map(|(b, k)| (b * b + k * k).sqrt()).collect();

    let s = BaselineSummary::from_decomposition(&vb, &vk, &vt).unwrap();
    assert_eq!(s.max_v_baryon, 100.0);
    assert_eq!(s.max_v_kernel, 30.0);
    assert_relative_eq!(s.kernel_to_baryon_ratio, 0.3, epsilon = 1e-12);
    assert!(s.kernel_active);
    assert!(s.outer_decay);
    // Inner quarter is the first two radii.
    let expected = ((vt[0] - 50.0) / 50.0 + (vt[1] - 80.0) / 80.0) / 2.0;
    assert_relative_eq!(s.inner_excess, expected, epsilon = 1e-12);
    assert!(s.inner_overshoot);

    assert!(BaselineSummary::from_decomposition(&vb[..4], &vk[..4], &vt[..4]).is_none());
    assert!(BaselineSummary::from_decomposition(&[0.0f64; 6], &[1.0; 6], &[1.0; 6]).is_none());
}

// ============================================================================
// Outer Gate Tests
// ============================================================================

/// The gate looks only at r / r_max >= 0.7.
#[test]
fn test_outer_gate() {
    let r = grid(10);
    let vb = vec![100.0f64; 10];
    let mut va = vb.clone();
    va[0] = 150.0;
    va[8] = 101.5;

    let gate = OuterGate::default();
    let s = gate.evaluate(&r, &vb, &va).unwrap();
    assert_eq!(s.n_outer, 4);
    assert_relative_eq!(s.max_abs_dv, 1.5);
    assert!(s.pass);

    va[9] = 97.0;
    assert!(!gate.evaluate(&r, &vb, &va).unwrap().pass);
    assert!(matches!(
        gate.evaluate(&r, &vb, &va[..3]),
        Err(GalrotError::MismatchedInputs { .. })
    ));
}

/// An empty outer region fails with NaN.
#[test]
fn test_outer_gate_empty_region() {
    let gate = OuterGate {
        rfrac_outer: 1.5f64,
        tol_kms: 2.0,
    };
    let s = gate.evaluate(&[1.0, 2.0], &[1.0, 1.0], &[1.0, 1.0]).unwrap();
    assert_eq!(s.n_outer, 0);
    assert!(s.max_abs_dv.is_nan());
    assert!(!s.pass);
}

// ============================================================================
// Correlation Tests
// ============================================================================

/// ΔV proportional to χ correlates perfectly inside the window.
#[test]
fn test_chi_dv_correlation() {
    let r = grid(10);
    let chi: Vec<f64> = r.iter().map(|x| 1.0 / x).collect();
    let vb = vec![100.0f64; 10];
    let va: Vec<f64> = chi.iter().map(|c| 100.0 + 5.0 * c).collect();

    let report = CorrelationTest::default()
        .evaluate(&r, &chi, &r, &vb, &va)
        .unwrap();
    assert_eq!(report.n, 6);
    assert_relative_eq!(report.r, 1.0, epsilon = 1e-12);
    assert_relative_eq!(report.max_abs_dv, 5.0, epsilon = 1e-12);
}

/// ΔV on a different grid is interpolated onto the χ radii.
#[test]
fn test_chi_dv_correlation_resampled() {
    let r_chi = grid(10);
    let chi: Vec<f64> = r_chi.iter().map(|x| 20.0 - x).collect();
    let r_dv: Vec<f64> = (0..=40).map(|i| 0.25 * i as f64 + 0.5).collect();
    let vb = vec![0.0f64; r_dv.len()];
    let va: Vec<f64> = r_dv.iter().map(|x| -2.0 * x).collect();

    let report = CorrelationTest::default()
        .evaluate(&r_chi, &chi, &r_dv, &vb, &va)
        .unwrap();
    assert_relative_eq!(report.r, 1.0, epsilon = 1e-12);
    assert!(CorrelationTest::default()
        .evaluate(&[] as &[f64], &[], &r_dv, &vb, &va)
        .is_err());
}

/// Residual correlations use 0 < r < 0.3 r_max.
#[test]
fn test_residual_correlations() {
    let r = grid(20);
    let chi: Vec<f64> = r.iter().map(|x| 10.0 - x).collect();
    let vb: Vec<f64> = r.iter().map(|x| 50.0 + x).collect();
    let v_obs: Vec<f64> = r.iter().zip(&chi).map(|(x, c)| 50.0 + x - c).collect();

    let res = residual_correlation(&r, &chi, &vb, &r, &v_obs).unwrap();
    assert_eq!(res.n, 5);
    assert_relative_eq!(res.r_signed, 1.0, epsilon = 1e-12);

    // Baryonic share grows outward, so the proxy shrinks along with χ.
    let v_baryon: Vec<f64> = vb
        .iter()
        .enumerate()
        .map(|(j, v)| v * (0.5 + 0.05 * j as f64))
        .collect();
    let rar = rar_residual_correlation(&r, &chi, &v_baryon, &vb).unwrap();
    assert_eq!(rar.n, 5);
    assert!(rar.r > 0.99);
    assert_relative_eq!(rar.resid_range.1, -2.0 * 0.5f64.log10(), epsilon = 1e-12);
    assert_relative_eq!(rar.resid_range.0, -2.0 * 0.7f64.log10(), epsilon = 1e-12);
}

// ============================================================================
// Scatter Tests
// ============================================================================

/// A model closer to the observations improves the scatter.
#[test]
fn test_scatter_improved() {
    let r = grid(10);
    let obs: Vec<f64> = r.iter().map(|x| 50.0 + 5.0 * x).collect();
    let base: Vec<f64> = obs.iter().map(|v| v * 0.8).collect();
    let adapt: Vec<f64> = obs.iter().map(|v| v * 0.98).collect();

    let report = ScatterTest::default()
        .evaluate(&r, &obs, &r, &base, &r, &adapt)
        .unwrap();
    assert_eq!(report.n, 4);
    assert_relative_eq!(report.r_cut, 5.0);
    assert_relative_eq!(report.sigma_baseline, -(0.8f64).log10(), epsilon = 1e-12);
    assert_eq!(report.verdict, Verdict::Improved);
    assert_eq!(report.verdict.to_string(), "improved");
}

/// Verdict thresholds and the minimum inner point count.
#[test]
fn test_scatter_verdicts_and_errors() {
    assert_eq!(Verdict::classify(0.005f64, 0.01), Verdict::Neutral);
    assert_eq!(Verdict::classify(0.02f64, 0.01), Verdict::Worsened);
    assert_eq!(Verdict::classify(-0.02f64, 0.01), Verdict::Improved);

    let r = [1.0f64, 2.0, 3.0, 4.0];
    let v = [10.0f64; 4];
    assert!(matches!(
        ScatterTest::default().evaluate(&r, &v, &r, &v, &r, &v),
        Err(GalrotError::TooFewPoints { got: 1, min: 3 })
    ));
}
