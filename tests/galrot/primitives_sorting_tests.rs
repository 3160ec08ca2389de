#![cfg(feature = "dev")]
//! Tests for radius ordering of rotation-curve tables.
//!
//! ## Test Organization
//!
//! 1. **Fast Path** - Already sorted input
//! 2. **Stable Sort** - Unsorted input and ties
//! 3. **Order Checks** - Strictly increasing detection

use galrot::internals::primitives::sorting::{
    first_non_increasing, is_non_decreasing, is_strictly_increasing, radius_permutation,
    sort_by_radius, unsort,
};

// ============================================================================
// Fast Path Tests
// ============================================================================

/// Sorted radii keep the identity permutation.
#[test]
fn test_sorted_input_identity() {
    let r = vec![0.5f64, 1.0, 2.0, 4.0];
    let v = vec![10.0, 20.0, 30.0, 40.0];

    let sorted = sort_by_radius(&r, &[&v]);

    assert_eq!(sorted.indices, vec![0, 1, 2, 3]);
    assert_eq!(sorted.r, r);
    assert_eq!(sorted.columns[0], v);
}

// ============================================================================
// Stable Sort Tests
// ============================================================================

/// Companion columns follow the radius column.
#[test]
fn test_companion_columns_follow_radius() {
    let r = vec![3.0f64, 1.0, 2.0];
    let vb = vec![30.0, 10.0, 20.0];
    let vt = vec![33.0, 11.0, 22.0];

    let sorted = sort_by_radius(&r, &[&vb, &vt]);

    assert_eq!(sorted.r, vec![1.0, 2.0, 3.0]);
    assert_eq!(sorted.columns[0], vec![10.0, 20.0, 30.0]);
    assert_eq!(sorted.columns[1], vec![11.0, 22.0, 33.0]);
    assert_eq!(sorted.indices, vec![1, 2, 0]);
}

/// Equal radii keep their file order.
#[test]
fn test_ties_are_stable() {
    let r = vec![2.0f64, 1.0, 2.0, 1.0];
    let perm = radius_permutation(&r);
    assert_eq!(perm, vec![1, 3, 0, 2]);
}

/// Unsort restores the original order.
#[test]
fn test_unsort_roundtrip() {
    let r = vec![5.0f64, 1.0, 3.0];
    let sorted = sort_by_radius(&r, &[]);
    let restored = unsort(&sorted.r, &sorted.indices);
    assert_eq!(restored, r);
}

// ============================================================================
// Order Check Tests
// ============================================================================

/// Duplicates are non-decreasing but not strictly increasing.
#[test]
fn test_order_checks() {
    let strict = vec![1.0f64, 2.0, 3.0];
    let dup = vec![1.0f64, 2.0, 2.0, 3.0];

    assert!(is_non_decreasing(&strict));
    assert!(is_non_decreasing(&dup));
    assert_eq!(first_non_increasing(&strict), None);
    assert_eq!(first_non_increasing(&dup), Some(2));
    assert!(is_strictly_increasing(&strict));
    assert!(!is_strictly_increasing(&dup));
}
