#![cfg(feature = "dev")]
//! Tests for derivatives on non-uniform grids.
//!
//! ## Test Organization
//!
//! 1. **Null Field** - Constant profiles
//! 2. **Exactness** - Linear and quadratic profiles
//! 3. **Edge Cases** - Short profiles

use approx::assert_relative_eq;

use galrot::internals::math::gradient::gradient;

// ============================================================================
// Null Field Tests
// ============================================================================

/// A constant profile has an exactly zero derivative.
#[test]
fn test_constant_profile_zero_gradient() {
    let x = vec![0.3f64, 0.7, 1.6, 2.2, 4.9, 5.0, 8.1];
    let f = vec![3.14159f64; x.len()];

    let g = gradient(&f, &x);
    assert!(g.iter().all(|&v| v == 0.0));
}

// ============================================================================
// Exactness Tests
// ============================================================================

/// Linear profiles are differentiated exactly, ends included.
#[test]
fn test_linear_profile_exact() {
    let x = vec![0.0f64, 0.5, 1.7, 2.0, 3.9];
    let f: Vec<f64> = x.iter().map(|&xi| 2.5 * xi - 1.0).collect();

    for d in gradient(&f, &x) {
        assert_relative_eq!(d, 2.5, epsilon = 1e-12);
    }
}

/// The interior stencil is second-order exact on a non-uniform grid.
#[test]
fn test_quadratic_interior_exact() {
    let x = vec![0.0f64, 1.0, 3.0, 3.5, 6.0];
    let f: Vec<f64> = x.iter().map(|&xi| xi * xi).collect();

    let g = gradient(&f, &x);
    for i in 1..x.len() - 1 {
        assert_relative_eq!(g[i], 2.0 * x[i], epsilon = 1e-12);
    }

    // One-sided ends are first order: secant slopes.
    assert_relative_eq!(g[0], 1.0, epsilon = 1e-12);
    assert_relative_eq!(g[4], (36.0 - 12.25) / 2.5, epsilon = 1e-12);
}

/// Matches the reference values of a hand-computed example.
#[test]
fn test_matches_hand_computed_values() {
    let x = vec![1.0f64, 2.0, 4.0];
    let f = vec![1.0f64, 4.0, 16.0];

    // Interior: hl=1, hr=2 -> (1*(16-4) + 4*(4-1)) / (1*2*3) = 24/6 = 4
    let g = gradient(&f, &x);
    assert_relative_eq!(g[0], 3.0, epsilon = 1e-12);
    assert_relative_eq!(g[1], 4.0, epsilon = 1e-12);
    assert_relative_eq!(g[2], 6.0, epsilon = 1e-12);
}

// ============================================================================
// Edge Case Tests
// ============================================================================

/// Fewer than two samples produce zeros of the same length.
#[test]
fn test_short_profiles() {
    assert!(gradient::<f64>(&[], &[]).is_empty());
    assert_eq!(gradient(&[5.0f64], &[1.0]), vec![0.0]);

    let g = gradient(&[1.0f64, 3.0], &[0.0, 2.0]);
    assert_eq!(g, vec![1.0, 1.0]);
}
