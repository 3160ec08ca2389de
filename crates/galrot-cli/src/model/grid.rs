//! Periodic simulation box.
//!
//! The box spans `[-half_width, half_width)` on each axis with `n` cells;
//! the cell at index `n / 2` sits at the origin.

// External dependencies
use std::f64::consts::PI;
use tracing::warn;

/// Smallest number of cells per axis.
pub const MIN_CELLS: usize = 64;

/// Largest number of cells per axis when the box is sized automatically.
pub const AUTO_MAX_CELLS: usize = 320;

/// Half-width of the box when the cell size is fixed.
pub const FIXED_HALF_WIDTH_KPC: f64 = 80.0;

/// Cell size used when the box is sized automatically.
pub const AUTO_DX_KPC: f64 = 0.5;

/// Cubic periodic grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// Half the box side in kpc.
    pub half_width: f64,

    /// Cells per axis (always even).
    pub n: usize,

    /// Cell size in kpc.
    pub dx: f64,
}

fn make_even(n: usize) -> usize {
    if n % 2 == 1 {
        n + 1
    } else {
        n
    }
}

impl Grid {
    /// Grid with `n` cells spanning `[-half_width, half_width)`.
    pub fn new(half_width: f64, n: usize) -> Self {
        let n = make_even(n.max(2));
        Self {
            half_width,
            n,
            dx: 2.0 * half_width / n as f64,
        }
    }

    /// Choose the box for a galaxy observed out to `r_obs_max` and a kernel
    /// of scale `l`.
    ///
    /// With `dx` set, the box is fixed at ±80 kpc and the cell count follows
    /// from `dx`, clipped to `[64, max_n]`. Otherwise the box covers
    /// `max(1.5 r_obs_max, 4 l, 20)` at 0.5 kpc cells, clipped to
    /// `[64, min(320, max_n)]`.
    pub fn choose(r_obs_max: f64, l: f64, dx: Option<f64>, max_n: usize) -> Self {
        match dx {
            Some(dx) => {
                let half = FIXED_HALF_WIDTH_KPC;
                let requested = (2.0 * half / dx).round() as usize;
                let n = make_even(requested.clamp(MIN_CELLS, max_n.max(MIN_CELLS)));
                if n != requested {
                    warn!(dx, requested, n, "cell count clipped");
                }
                Self::new(half, n)
            }
            None => {
                let half = (1.5 * r_obs_max).max(4.0 * l).max(20.0);
                let cap = AUTO_MAX_CELLS.min(max_n).max(MIN_CELLS);
                let n = ((2.0 * half / AUTO_DX_KPC).round() as usize).clamp(MIN_CELLS, cap);
                Self::new(half, make_even(n))
            }
        }
    }

    /// Coordinate of cell `i` along any axis.
    #[inline]
    pub fn coord(&self, i: usize) -> f64 {
        -self.half_width + i as f64 * self.dx
    }

    /// Index of the cell at the origin.
    #[inline]
    pub fn center(&self) -> usize {
        self.n / 2
    }

    /// Volume of one cell in kpc³.
    #[inline]
    pub fn cell_volume(&self) -> f64 {
        self.dx * self.dx * self.dx
    }

    /// Angular wavenumbers in FFT order (`2π · fftfreq(n, dx)`).
    pub fn wavenumbers(&self) -> Vec<f64> {
        let n = self.n;
        let scale = 2.0 * PI / (n as f64 * self.dx);
        (0..n)
            .map(|i| {
                let f = if i < n.div_ceil(2) {
                    i as f64
                } else {
                    i as f64 - n as f64
                };
                f * scale
            })
            .collect()
    }

    /// Identity key for caches: `(n, half-width rounded to 0.01 kpc)`.
    pub fn key(&self) -> (usize, i64) {
        (self.n, (self.half_width * 100.0).round() as i64)
    }
}
