//! Real-space interaction kernels and their cache.
//!
//! ## Purpose
//!
//! The baseline model convolves the baryonic density with a scalar kernel
//! `U(r; L)`. This module builds `U` on the grid, conditions it for a
//! periodic box, and caches its spectrum.
//!
//! ## Key concepts
//!
//! * **Shapes**: `plummer = 1/sqrt(max(r, 1e-6)² + L²)`,
//!   `exp-core = exp(−r/L)/(r + 1e-6)`,
//!   `ananta-hybrid = ½ ln(1 + (r_s/L)²)` with `r_s = sqrt(r² + (0.01 L)²)`.
//! * **Conditioning**: A cosine roll-off to zero at
//!   `R_cut = min(3L, 0.45 half_width)`; rescaling so that `Σ U dV = 1/L`;
//!   mean subtraction; the first cell set to zero.
//!
//! ## Invariants
//!
//! * At least 2% of the cells survive the roll-off.
//! * The cache key is `(shape, L, n, half-width to 0.01 kpc, beta)`.
//!
//! ## Non-goals
//!
//! * `beta` is recorded in the cache key but does not change the amplitude.

// External dependencies
use ndarray::{Array3, Zip};
use rustfft::num_complex::Complex64;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

// Export dependencies from galrot crate
use galrot::numerics::cosine_taper;

// Internal dependencies
use crate::error::{PipelineError, Result};
use crate::model::grid::Grid;
use crate::model::spectral::Spectral;

/// Smallest fraction of cells allowed to survive the roll-off.
pub const MIN_NONZERO_FRACTION: f64 = 0.02;

/// Roll-off radius in units of L.
pub const CUT_IN_SCALES: f64 = 3.0;

/// Roll-off radius cap as a fraction of the box half-width.
pub const CUT_IN_BOX: f64 = 0.45;

// ============================================================================
// Kernel Shapes
// ============================================================================

/// Radial profile of the interaction kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelShape {
    Plummer,
    ExpCore,
    AnantaHybrid,
}

impl KernelShape {
    /// Name used in parameter files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plummer => "plummer",
            Self::ExpCore => "exp-core",
            Self::AnantaHybrid => "ananta-hybrid",
        }
    }

    /// Unnormalized kernel value at distance `r` for scale `l`.
    #[inline]
    pub fn value(self, r: f64, l: f64) -> f64 {
        match self {
            Self::Plummer => {
                let rs = r.max(1e-6);
                1.0 / (rs * rs + l * l).sqrt()
            }
            Self::ExpCore => (-r / l).exp() / (r + 1e-6),
            Self::AnantaHybrid => {
                let eps = 0.01 * l;
                let rs = (r * r + eps * eps).sqrt();
                0.5 * (1.0 + (rs / l) * (rs / l)).ln()
            }
        }
    }
}

impl fmt::Display for KernelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KernelShape {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plummer" => Ok(Self::Plummer),
            "exp-core" | "exp_core" => Ok(Self::ExpCore),
            "ananta-hybrid" | "ananta_hybrid" => Ok(Self::AnantaHybrid),
            other => Err(PipelineError::InvalidParameter(format!(
                "unknown kernel '{other}' (expected plummer, exp-core or ananta-hybrid)"
            ))),
        }
    }
}

// ============================================================================
// Kernel Grid
// ============================================================================

/// Build the conditioned kernel `U` for scale `l` on `grid`.
pub fn build_kernel_grid(grid: &Grid, l: f64, shape: KernelShape) -> Result<Array3<f64>> {
    let n = grid.n;
    let r_cut = (CUT_IN_SCALES * l).min(CUT_IN_BOX * grid.half_width);
    let mut u = Array3::<f64>::zeros((n, n, n));

    let fill = |(i, j, k): (usize, usize, usize), v: &mut f64| {
        let (x, y, z) = (grid.coord(i), grid.coord(j), grid.coord(k));
        let r = (x * x + y * y + z * z).sqrt();
        let taper = cosine_taper(r, r_cut);
        *v = if taper > 0.0 {
            shape.value(r, l) * taper
        } else {
            0.0
        };
    };

    #[cfg(feature = "cpu")]
    Zip::indexed(&mut u).par_for_each(fill);

    #[cfg(not(feature = "cpu"))]
    Zip::indexed(&mut u).for_each(fill);

    let nonzero = u.iter().filter(|&&v| v != 0.0).count() as f64 / u.len() as f64;
    debug!(nonzero, r_cut, "kernel roll-off");
    if nonzero < MIN_NONZERO_FRACTION {
        return Err(PipelineError::Model(format!(
            "kernel roll-off removed too much: nonzero fraction {nonzero:.6} for L={l}"
        )));
    }

    let integral = u.sum() * grid.cell_volume();
    if !integral.is_finite() || integral.abs() < 1e-30 {
        return Err(PipelineError::Model(format!(
            "bad kernel integral {integral:.3e} for L={l} at dx={}",
            grid.dx
        )));
    }
    let desired = 1.0 / l.max(1e-12);
    let scale = desired / integral;
    u.mapv_inplace(|v| v * scale);

    let mean = u.mean().unwrap_or(0.0);
    u.mapv_inplace(|v| v - mean);
    u[[0, 0, 0]] = 0.0;

    debug!(integral, desired, scale, "kernel renormalized");
    Ok(u)
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KernelKey {
    shape: KernelShape,
    l_bits: u64,
    n: usize,
    half_width_centi: i64,
    beta_bits: u64,
}

/// Shared cache of kernel spectra.
#[derive(Debug, Default)]
pub struct KernelCache {
    entries: Mutex<HashMap<KernelKey, Arc<Array3<Complex64>>>>,
}

impl KernelCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached spectra.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spectrum of the kernel for `(shape, l, beta)` on the grid of `spectral`.
    ///
    /// Building happens outside the lock; concurrent misses on the same key
    /// build twice and keep the first result.
    pub fn spectrum(
        &self,
        grid: &Grid,
        spectral: &Spectral,
        l: f64,
        shape: KernelShape,
        beta: f64,
    ) -> Result<Arc<Array3<Complex64>>> {
        let (n, half_width_centi) = grid.key();
        let key = KernelKey {
            shape,
            l_bits: l.to_bits(),
            n,
            half_width_centi,
            beta_bits: beta.to_bits(),
        };

        if let Some(hit) = self
            .entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Ok(Arc::clone(hit));
        }

        let u = build_kernel_grid(grid, l, shape)?;
        let spectrum = Arc::new(spectral.forward(&u));
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(entries.entry(key).or_insert(spectrum)))
    }
}
