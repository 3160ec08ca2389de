//! Spectral operators on the periodic grid.
//!
//! ## Purpose
//!
//! This module provides the FFT machinery of the baseline model: the 3-D
//! forward transform, the Poisson solve, spectral gradients, and evaluation
//! of a spectral field on the mid-plane.
//!
//! ## Design notes
//!
//! * **Axis by axis**: A 3-D transform is three passes of 1-D transforms,
//!   one per axis. Each pass walks the lanes of one slab at a time; with the
//!   `cpu` feature the slabs run in parallel.
//! * **Mid-plane only**: The model only reads fields at `z = 0`. Instead of
//!   a full inverse 3-D transform, the z-sum for plane `n/2` is folded first
//!   (`e^{iπ k_z} = (−1)^{k_z}`) and a 2-D inverse transform finishes the job.
//!
//! ## Invariants
//!
//! * Forward transforms are unnormalized; every inverse divides by the
//!   number of points it sums over, matching the usual `ifft` convention.

// Feature-gated imports
#[cfg(feature = "cpu")]
use ndarray::parallel::prelude::*;

// External dependencies
use ndarray::{Array2, Array3, ArrayViewMut1, Axis, Zip};
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

// Internal dependencies
use crate::model::grid::Grid;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// In-plane components of a vector field on the mid-plane.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneField {
    /// x component, indexed `[ix, iy]`.
    pub gx: Array2<f64>,

    /// y component, indexed `[ix, iy]`.
    pub gy: Array2<f64>,
}

impl PlaneField {
    /// Component-wise sum.
    pub fn add(&self, other: &Self) -> Self {
        Self {
            gx: &self.gx + &other.gx,
            gy: &self.gy + &other.gy,
        }
    }

    /// Squared magnitude at every cell.
    pub fn magnitude_sq(&self) -> Array2<f64> {
        Zip::from(&self.gx)
            .and(&self.gy)
            .map_collect(|&x, &y| x * x + y * y)
    }

    /// Sum of the cell-wise dot products with `other`.
    pub fn dot(&self, other: &Self) -> f64 {
        let mut acc = 0.0;
        Zip::from(&self.gx)
            .and(&self.gy)
            .and(&other.gx)
            .and(&other.gy)
            .for_each(|&ax, &ay, &bx, &by| acc += ax * bx + ay * by);
        acc
    }

    /// Euclidean norm over all cells.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Flip the sign of both components.
    pub fn negate(&mut self) {
        self.gx.mapv_inplace(|v| -v);
        self.gy.mapv_inplace(|v| -v);
    }
}

/// FFT plans and wavenumbers for one grid.
#[derive(Clone)]
pub struct Spectral {
    n: usize,
    k: Vec<f64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for Spectral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spectral").field("n", &self.n).finish()
    }
}

// ============================================================================
// Lane transforms
// ============================================================================

fn transform_lane(
    plan: &dyn Fft<f64>,
    lane: &mut ArrayViewMut1<'_, Complex64>,
    buf: &mut [Complex64],
    scratch: &mut [Complex64],
) {
    for (b, v) in buf.iter_mut().zip(lane.iter()) {
        *b = *v;
    }
    plan.process_with_scratch(buf, scratch);
    for (v, b) in lane.iter_mut().zip(buf.iter()) {
        *v = *b;
    }
}

/// Transform every lane of `data` along `axis`.
fn transform_axis3(data: &mut Array3<Complex64>, axis: usize, plan: &Arc<dyn Fft<f64>>) {
    let n = data.len_of(Axis(axis));
    // Slabs are taken across another axis; inside a slab the target axis
    // keeps its relative position.
    let outer = if axis == 0 { 1 } else { 0 };
    let inner = if axis == 2 { 1 } else { 0 };
    let scratch_len = plan.get_inplace_scratch_len();

    let run = |mut slab: ndarray::ArrayViewMut2<'_, Complex64>| {
        let mut buf = vec![ZERO; n];
        let mut scratch = vec![ZERO; scratch_len];
        for mut lane in slab.lanes_mut(Axis(inner)) {
            transform_lane(plan.as_ref(), &mut lane, &mut buf, &mut scratch);
        }
    };

    #[cfg(feature = "cpu")]
    data.axis_iter_mut(Axis(outer)).into_par_iter().for_each(run);

    #[cfg(not(feature = "cpu"))]
    data.axis_iter_mut(Axis(outer)).for_each(run);
}

/// Transform every lane of a 2-D array along `axis`.
fn transform_axis2(data: &mut Array2<Complex64>, axis: usize, plan: &Arc<dyn Fft<f64>>) {
    let n = data.len_of(Axis(axis));
    let scratch_len = plan.get_inplace_scratch_len();
    let mut buf = vec![ZERO; n];
    let mut scratch = vec![ZERO; scratch_len];
    for mut lane in data.lanes_mut(Axis(axis)) {
        transform_lane(plan.as_ref(), &mut lane, &mut buf, &mut scratch);
    }
}

// ============================================================================
// Operators
// ============================================================================

impl Spectral {
    /// Plan transforms for `grid`.
    pub fn new(grid: &Grid) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            n: grid.n,
            k: grid.wavenumbers(),
            forward: planner.plan_fft_forward(grid.n),
            inverse: planner.plan_fft_inverse(grid.n),
        }
    }

    /// Cells per axis.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Unnormalized forward 3-D transform of a real field.
    pub fn forward(&self, field: &Array3<f64>) -> Array3<Complex64> {
        let mut data = field.mapv(|v| Complex64::new(v, 0.0));
        for axis in 0..3 {
            transform_axis3(&mut data, axis, &self.forward);
        }
        data
    }

    /// Inverse 3-D transform, real part.
    pub fn inverse_real(&self, spectrum: &Array3<Complex64>) -> Array3<f64> {
        let mut data = spectrum.clone();
        for axis in 0..3 {
            transform_axis3(&mut data, axis, &self.inverse);
        }
        let scale = 1.0 / (self.n * self.n * self.n) as f64;
        data.mapv(|c| c.re * scale)
    }

    /// `φ_k = 4πG ρ_k / k²`, with the `k = 0` mode set to zero.
    pub fn poisson(&self, rho_k: &Array3<Complex64>, g_newton: f64) -> Array3<Complex64> {
        let k = &self.k;
        let four_pi_g = 4.0 * PI * g_newton;
        let mut phi = rho_k.clone();
        Zip::indexed(&mut phi).for_each(|(a, b, c), v| {
            let k2 = k[a] * k[a] + k[b] * k[b] + k[c] * k[c];
            *v = if k2 != 0.0 { *v * (four_pi_g / k2) } else { ZERO };
        });
        phi
    }

    /// Fold the z axis of a spectrum onto the mid-plane (`iz = n/2`).
    fn fold_midplane(&self, spectrum: &Array3<Complex64>) -> Array2<Complex64> {
        let scale = 1.0 / self.n as f64;
        let mut out = Array2::from_elem((self.n, self.n), ZERO);
        let fold = |o: &mut Complex64, lane: ndarray::ArrayView1<'_, Complex64>| {
            let s = lane.iter().enumerate().fold(ZERO, |acc, (c, &v)| {
                if c % 2 == 0 {
                    acc + v
                } else {
                    acc - v
                }
            });
            *o = s * scale;
        };

        #[cfg(feature = "cpu")]
        Zip::from(&mut out)
            .and(spectrum.lanes(Axis(2)))
            .par_for_each(fold);

        #[cfg(not(feature = "cpu"))]
        Zip::from(&mut out).and(spectrum.lanes(Axis(2))).for_each(fold);

        out
    }

    /// Real part of the inverse 2-D transform.
    fn inverse_plane(&self, mut plane: Array2<Complex64>) -> Array2<f64> {
        transform_axis2(&mut plane, 0, &self.inverse);
        transform_axis2(&mut plane, 1, &self.inverse);
        let scale = 1.0 / (self.n * self.n) as f64;
        plane.mapv(|c| c.re * scale)
    }

    /// Spectral gradient `(∂x φ, ∂y φ)` evaluated on the mid-plane.
    pub fn midplane_gradient(&self, phi_k: &Array3<Complex64>) -> PlaneField {
        let folded = self.fold_midplane(phi_k);
        let k = &self.k;
        let i = Complex64::new(0.0, 1.0);

        let mut sx = folded.clone();
        Zip::indexed(&mut sx).for_each(|(a, _), v| *v *= i * k[a]);
        let mut sy = folded;
        Zip::indexed(&mut sy).for_each(|(_, b), v| *v *= i * k[b]);

        PlaneField {
            gx: self.inverse_plane(sx),
            gy: self.inverse_plane(sy),
        }
    }

    /// Values of a spectral scalar field on the mid-plane.
    pub fn midplane_values(&self, spectrum: &Array3<Complex64>) -> Array2<f64> {
        self.inverse_plane(self.fold_midplane(spectrum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_forward_inverse_identity() {
        let grid = Grid::new(4.0, 8);
        let sp = Spectral::new(&grid);
        let field = Array3::from_shape_fn((8, 8, 8), |(i, j, k)| {
            (i as f64 * 0.3).sin() + (j * k) as f64 * 0.01
        });
        let back = sp.inverse_real(&sp.forward(&field));
        for (a, b) in field.iter().zip(back.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_midplane_matches_full_inverse() {
        let grid = Grid::new(4.0, 8);
        let sp = Spectral::new(&grid);
        let field = Array3::from_shape_fn((8, 8, 8), |(i, j, k)| {
            ((i + 2 * j) as f64).cos() * (k as f64 + 1.0)
        });
        let spec = sp.forward(&field);
        let plane = sp.midplane_values(&spec);
        for i in 0..8 {
            for j in 0..8 {
                assert_relative_eq!(plane[[i, j]], field[[i, j, 4]], epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_gradient_of_plane_wave() {
        // φ = sin(2π x / Lx) has ∂x φ = (2π / Lx) cos(2π x / Lx).
        let grid = Grid::new(4.0, 16);
        let sp = Spectral::new(&grid);
        let lx = 2.0 * grid.half_width;
        let w = 2.0 * PI / lx;
        let phi = Array3::from_shape_fn((16, 16, 16), |(i, _, _)| (w * grid.coord(i)).sin());
        let g = sp.midplane_gradient(&sp.forward(&phi));
        for i in 0..16 {
            assert_relative_eq!(g.gx[[i, 3]], w * (w * grid.coord(i)).cos(), epsilon = 1e-10);
            assert_relative_eq!(g.gy[[i, 3]], 0.0, epsilon = 1e-10);
        }
    }
}
