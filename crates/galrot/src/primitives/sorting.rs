//! Radius ordering for rotation-curve tables.
//!
//! ## Purpose
//!
//! Rotation-curve tables arrive in file order. Everything downstream (the
//! gradient, interpolation, outer masks) assumes radii increase with index,
//! so tables are sorted by radius once at load time.
//!
//! ## Design notes
//!
//! * **Stability**: Uses stable sorting so rows with equal radii keep their file order.
//! * **Fast path**: Already-sorted input is returned without building a permutation.
//! * **Columnar**: Any number of companion columns can be reordered with the same permutation.
//!
//! ## Invariants
//!
//! * The permutation is a valid permutation of `0..n`.
//! * Sorted radii are non-decreasing (NaN compares as equal and keeps its place).
//!
//! ## Non-goals
//!
//! * This module does not remove duplicate radii or reject non-finite values.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use core::cmp::Ordering;
use num_traits::Float;

// ============================================================================
// Data Structures
// ============================================================================

/// A radius column and its companion columns, reordered by radius.
#[derive(Debug, Clone, PartialEq)]
pub struct SortedTable<T> {
    /// Radii in non-decreasing order.
    pub r: Vec<T>,

    /// Companion columns reordered to match `r`.
    pub columns: Vec<Vec<T>>,

    /// Index mapping where `indices[sorted_pos] = original_pos`.
    pub indices: Vec<usize>,
}

// ============================================================================
// Sorting Functions
// ============================================================================

/// Compute the stable permutation that orders `r` ascending.
#[inline]
pub fn radius_permutation<T: Float>(r: &[T]) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..r.len()).collect();
    if is_non_decreasing(r) {
        return idx;
    }
    idx.sort_by(|&a, &b| r[a].partial_cmp(&r[b]).unwrap_or(Ordering::Equal));
    idx
}

/// Sort a radius column together with any number of companion columns.
///
/// Companion columns shorter than `r` are a caller bug; they are indexed by
/// the same permutation and would panic, so the loaders always build them
/// row by row.
pub fn sort_by_radius<T: Float>(r: &[T], columns: &[&[T]]) -> SortedTable<T> {
    let indices = radius_permutation(r);
    SortedTable {
        r: permute(r, &indices),
        columns: columns.iter().map(|c| permute(c, &indices)).collect(),
        indices,
    }
}

/// Apply a permutation produced by [`radius_permutation`].
#[inline]
pub fn permute<T: Copy>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i]).collect()
}

/// Map sorted values back to the original order.
#[inline]
pub fn unsort<T: Float>(sorted_values: &[T], indices: &[usize]) -> Vec<T> {
    let mut result = vec![T::zero(); indices.len()];
    for (sorted_idx, &orig_idx) in indices.iter().enumerate() {
        result[orig_idx] = sorted_values[sorted_idx];
    }
    result
}

// ============================================================================
// Order Checks
// ============================================================================

/// `true` when every radius is `<=` its successor.
#[inline]
pub fn is_non_decreasing<T: Float>(r: &[T]) -> bool {
    r.windows(2).all(|w| w[0] <= w[1])
}

/// Index of the first radius that does not strictly exceed its predecessor.
#[inline]
pub fn first_non_increasing<T: Float>(r: &[T]) -> Option<usize> {
    r.windows(2).position(|w| w[1] <= w[0] || w[1].is_nan()).map(|i| i + 1)
}

/// `true` when every radius strictly exceeds its predecessor.
#[inline]
pub fn is_strictly_increasing<T: Float>(r: &[T]) -> bool {
    first_non_increasing(r).is_none()
}
