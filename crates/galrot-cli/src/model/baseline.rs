//! Baseline rotation-curve model.
//!
//! ## Purpose
//!
//! Given a galaxy's disks, its observed curve, and a kernel `(L, μ, shape)`,
//! this module predicts the baryonic, kernel, and total circular velocities
//! on a radial grid. It produces the basis curves and can rebuild missing
//! baseline decompositions.
//!
//! ## Design notes
//!
//! * **Shared baryons**: The Newtonian fields depend only on the grid, not on
//!   `L` or `μ`. They are computed once per grid and shared by every scale.
//! * **Mid-plane**: Fields are only evaluated on the plane `z = 0`.
//!
//! ## Key concepts
//!
//! * **Newtonian field**: `φ_k = 4πG ρ_k / k²`, `g = ∇φ` for each disk.
//! * **Kernel field**: `φ_K,k = μ G ρ_k U_k` with the `k = 0` mode removed.
//!   The kernel grid is centred on the box and used without re-centring.
//! * **Polarity**: If the kernel field is anti-aligned with the baryonic one
//!   over the mid-plane, the kernel field is flipped.
//! * **Velocities**: `v = sqrt(R · sqrt(⟨g²⟩))`, with `⟨g²⟩` the annulus mean.
//! * **Amplitude fit**: With enough observed points, the kernel velocity is
//!   rescaled by `α = sqrt(mean(max((v_obs² − v_bar²)/(v_K² + 1e-8), 0)))`.
//!
//! ## Invariants
//!
//! * `v_total² = v_baryon² + v_kernel²` after the amplitude fit.

// External dependencies
use ndarray::{Array2, Array3, Zip};
use rustfft::num_complex::Complex64;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{debug, warn};

// Export dependencies from galrot crate
use galrot::numerics::resample_or;

// Internal dependencies
use crate::config::ModelConfig;
use crate::error::{PipelineError, Result};
use crate::io::{BasisCurve, GalaxyRecord, ObservedCurve};
use crate::model::density::{disk_density, DiskComponent, G_NEWTON};
use crate::model::grid::Grid;
use crate::model::kernels::{KernelCache, KernelShape};
use crate::model::profile::{radial_profile, RadialBins};
use crate::model::spectral::{PlaneField, Spectral};

/// Relative dot-product threshold below which the polarity is left alone.
const POLARITY_TOLERANCE: f64 = 1e-6;

/// Kernel velocities at or below this are excluded from the amplitude fit.
const MIN_FIT_KERNEL_KMS: f64 = 1e-6;

/// Regularizer of the amplitude-fit denominator.
const FIT_EPS: f64 = 1e-8;

/// Tolerance of the quadrature consistency check in km/s.
const QUADRATURE_TOL: f64 = 1e-6;

// ============================================================================
// Output
// ============================================================================

/// Predicted decomposition on the radial bin centres.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineCurve {
    /// Bin centres in kpc.
    pub r: Vec<f64>,

    /// Total velocity in km/s.
    pub v_total: Vec<f64>,

    /// Baryonic velocity in km/s.
    pub v_baryon: Vec<f64>,

    /// Kernel velocity in km/s (after the amplitude fit).
    pub v_kernel: Vec<f64>,

    /// Stellar-disk velocity in km/s.
    pub v_star: Vec<f64>,

    /// Gas-disk velocity in km/s.
    pub v_gas: Vec<f64>,

    /// Fitted kernel amplitude, if the fit ran.
    pub alpha: Option<f64>,

    /// True when the kernel field was flipped.
    pub polarity_flipped: bool,
}

impl BaselineCurve {
    /// Number of radii.
    pub fn len(&self) -> usize {
        self.r.len()
    }

    /// True when the curve has no radii.
    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    /// Median absolute fractional error against an observed curve.
    ///
    /// The prediction is interpolated onto the observed radii it covers;
    /// `None` when it covers none of them.
    pub fn mafe(&self, observed: &ObservedCurve) -> Option<f64> {
        let predicted = resample_or(&observed.r, &self.r, &self.v_total, f64::NAN);
        let mut errors: Vec<f64> = predicted
            .iter()
            .zip(&observed.v)
            .filter(|(p, _)| p.is_finite())
            .map(|(p, o)| (p - o).abs() / o.max(1e-6))
            .collect();
        median(&mut errors)
    }

    /// Columns written to a basis file.
    pub fn to_basis(&self) -> BasisCurve {
        BasisCurve {
            r: self.r.clone(),
            v_baryon: self.v_baryon.clone(),
            v_kernel: self.v_kernel.clone(),
            v_total: self.v_total.clone(),
        }
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let n = values.len();
    Some(if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    })
}

// ============================================================================
// Baryonic Fields
// ============================================================================

/// Newtonian fields of one galaxy on one grid.
struct BaryonField {
    grid: Grid,
    spectral: Spectral,
    rho_k: Array3<Complex64>,
    star: PlaneField,
    gas: PlaneField,
}

impl BaryonField {
    fn compute(grid: Grid, stars: &DiskComponent, gas: &DiskComponent) -> Self {
        let spectral = Spectral::new(&grid);
        let star_k = spectral.forward(&disk_density(&grid, stars));
        let gas_k = spectral.forward(&disk_density(&grid, gas));

        let star = spectral.midplane_gradient(&spectral.poisson(&star_k, G_NEWTON));
        let gas_field = spectral.midplane_gradient(&spectral.poisson(&gas_k, G_NEWTON));
        let rho_k = star_k + gas_k;

        debug!(n = grid.n, half_width = grid.half_width, "baryonic fields ready");
        Self {
            grid,
            spectral,
            rho_k,
            star,
            gas: gas_field,
        }
    }

    /// Mid-plane field of the kernel potential `μ G ρ ⊛ U`.
    fn kernel_field(&self, u_k: &Array3<Complex64>, mu: f64) -> PlaneField {
        let coupling = mu * G_NEWTON;
        let mut phi_k = Zip::from(&self.rho_k)
            .and(u_k)
            .map_collect(|&r, &u| r * u * coupling);
        phi_k[[0, 0, 0]] = Complex64::new(0.0, 0.0);
        self.spectral.midplane_gradient(&phi_k)
    }
}

fn velocities(g2: &Array2<f64>, grid: &Grid, bins: &RadialBins) -> Vec<f64> {
    radial_profile(g2, grid.dx, bins)
        .iter()
        .zip(&bins.centres)
        .map(|(&m, &r)| (r * m.max(0.0).sqrt()).max(0.0).sqrt())
        .collect()
}

// ============================================================================
// Galaxy Model
// ============================================================================

type FieldSlot = Arc<OnceLock<Arc<BaryonField>>>;

/// Baseline model of one galaxy.
pub struct GalaxyModel {
    name: String,
    stars: DiskComponent,
    gas: DiskComponent,
    observed: ObservedCurve,
    config: ModelConfig,
    fields: Mutex<HashMap<(usize, i64), FieldSlot>>,
}

impl std::fmt::Debug for GalaxyModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalaxyModel")
            .field("name", &self.name)
            .field("stars", &self.stars)
            .field("gas", &self.gas)
            .field("config", &self.config)
            .finish()
    }
}

impl GalaxyModel {
    /// Model for `record` constrained by `observed`.
    pub fn new(record: &GalaxyRecord, observed: ObservedCurve, config: ModelConfig) -> Self {
        Self {
            name: record.name.clone(),
            stars: DiskComponent::stars(record),
            gas: DiskComponent::gas(record, config.helium_factor),
            observed,
            config,
            fields: Mutex::new(HashMap::new()),
        }
    }

    /// Galaxy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Observed curve used for the box size and the amplitude fit.
    pub fn observed(&self) -> &ObservedCurve {
        &self.observed
    }

    /// Grid used for kernel scale `l`.
    pub fn grid_for(&self, l: f64) -> Grid {
        Grid::choose(self.observed.r_max(), l, self.config.dx, self.config.max_n)
    }

    /// Baryonic fields on `grid`, computed at most once.
    fn baryon_field(&self, grid: Grid) -> Arc<BaryonField> {
        let slot = {
            let mut fields = self.fields.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(fields.entry(grid.key()).or_default())
        };
        Arc::clone(slot.get_or_init(|| Arc::new(BaryonField::compute(grid, &self.stars, &self.gas))))
    }

    /// Predict the decomposition for kernel scale `l` and coupling `mu`.
    pub fn predict(
        &self,
        l: f64,
        mu: f64,
        shape: KernelShape,
        beta: f64,
        kernels: &KernelCache,
    ) -> Result<BaselineCurve> {
        if !(l.is_finite() && l > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "kernel scale must be positive, got {l}"
            )));
        }
        if !mu.is_finite() {
            return Err(PipelineError::InvalidParameter(format!(
                "kernel coupling must be finite, got {mu}"
            )));
        }
        let r_obs_max = self.observed.r_max();
        if !(r_obs_max.is_finite() && r_obs_max > 0.0) {
            return Err(PipelineError::Model(format!(
                "{}: observed curve has no positive radius",
                self.name
            )));
        }

        let field = self.baryon_field(self.grid_for(l));
        let grid = field.grid;
        let u_k = kernels.spectrum(&grid, &field.spectral, l, shape, beta)?;

        let baryon = field.star.add(&field.gas);
        let mut kernel = field.kernel_field(&u_k, mu);

        let dot = baryon.dot(&kernel);
        let mag_b = baryon.norm();
        let mag_k = kernel.norm();
        let polarity_flipped =
            dot < 0.0 && mag_k > 0.0 && dot.abs() > POLARITY_TOLERANCE * mag_b * mag_k;
        if polarity_flipped {
            debug!(l, mu, dot, "kernel anti-aligned with baryons; flipping");
            kernel.negate();
        }

        let bins = RadialBins::new(r_obs_max, self.config.radial_bins);
        let v_baryon = velocities(&baryon.magnitude_sq(), &grid, &bins);
        let mut v_kernel = velocities(&kernel.magnitude_sq(), &grid, &bins);
        let v_star = velocities(&field.star.magnitude_sq(), &grid, &bins);
        let v_gas = velocities(&field.gas.magnitude_sq(), &grid, &bins);

        let combined = quadrature(&v_baryon, &v_kernel);
        let mut v_total: Vec<f64> = v_star
            .iter()
            .zip(&v_gas)
            .zip(&v_kernel)
            .map(|((s, g), k)| (s * s + g * g + k * k).max(0.0).sqrt())
            .collect();
        let max_diff = v_total
            .iter()
            .zip(&combined)
            .map(|(a, b)| (a - b).abs())
            .filter(|d| d.is_finite())
            .fold(0.0, f64::max);
        if max_diff > QUADRATURE_TOL {
            debug!(max_diff, "using baryon + kernel quadrature for the total");
            v_total = combined;
        }

        let alpha = self.fit_amplitude(&bins.centres, &v_baryon, &v_kernel);
        if let Some(a) = alpha {
            v_kernel.iter_mut().for_each(|v| *v *= a);
            v_total = quadrature(&v_baryon, &v_kernel);
        }

        Ok(BaselineCurve {
            r: bins.centres,
            v_total,
            v_baryon,
            v_kernel,
            v_star,
            v_gas,
            alpha,
            polarity_flipped,
        })
    }

    /// Least-squares-like amplitude of the kernel velocity.
    fn fit_amplitude(&self, r: &[f64], v_baryon: &[f64], v_kernel: &[f64]) -> Option<f64> {
        let v_obs = resample_or(r, &self.observed.r, &self.observed.v, f64::NAN);
        let ratios: Vec<f64> = v_obs
            .iter()
            .zip(v_baryon)
            .zip(v_kernel)
            .filter(|((o, _), k)| o.is_finite() && **o > 0.0 && **k > MIN_FIT_KERNEL_KMS)
            .map(|((o, b), k)| ((o * o - b * b) / (k * k + FIT_EPS)).max(0.0))
            .filter(|q| q.is_finite())
            .collect();

        if ratios.len() < self.config.min_fit_points {
            warn!(
                galaxy = %self.name,
                points = ratios.len(),
                "too few points for the kernel amplitude fit"
            );
            return None;
        }
        let alpha2 = ratios.iter().sum::<f64>() / ratios.len() as f64;
        let alpha = if alpha2 > 0.0 { alpha2.sqrt() } else { 1.0 };
        debug!(galaxy = %self.name, alpha, "kernel amplitude");
        Some(alpha)
    }
}

fn quadrature(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x * x + y * y).max(0.0).sqrt())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record() -> GalaxyRecord {
        GalaxyRecord {
            name: "TEST".to_string(),
            rd_star: 2.0,
            mstar: 2e10,
            hz_star: 0.3,
            rd_gas: 4.0,
            mgas: 5e9,
            hz_gas: 0.15,
        }
    }

    fn observed() -> ObservedCurve {
        let r: Vec<f64> = (1..=12).map(|i| i as f64).collect();
        let v = r.iter().map(|&x| 150.0 * x / (x + 1.5)).collect();
        ObservedCurve {
            v_err: vec![5.0; r.len()],
            r,
            v,
        }
    }

    fn small() -> ModelConfig {
        ModelConfig {
            dx: None,
            max_n: 64,
            radial_bins: 12,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_predict_with_amplitude_fit() {
        let model = GalaxyModel::new(&record(), observed(), small());
        let cache = KernelCache::new();
        let curve = model
            .predict(5.0, 50.0, KernelShape::AnantaHybrid, 1.15, &cache)
            .unwrap();

        assert_eq!(curve.len(), 12);
        assert!(curve.alpha.is_some());
        for j in 0..curve.len() {
            let expected = (curve.v_baryon[j].powi(2) + curve.v_kernel[j].powi(2)).sqrt();
            assert_relative_eq!(curve.v_total[j], expected, max_relative = 1e-12);
            assert!(curve.v_baryon[j].is_finite());
        }
        assert!(curve.v_baryon[4] > 0.0);
        let score = curve.mafe(model.observed()).unwrap();
        assert!(score.is_finite() && score >= 0.0);
    }

    #[test]
    fn test_zero_coupling_is_baryonic() {
        let model = GalaxyModel::new(&record(), observed(), small());
        let cache = KernelCache::new();
        let curve = model
            .predict(5.0, 0.0, KernelShape::Plummer, 1.15, &cache)
            .unwrap();
        assert!(curve.alpha.is_none());
        assert!(!curve.polarity_flipped);
        assert!(curve.v_kernel.iter().all(|&v| v == 0.0));
        for j in 0..curve.len() {
            assert_relative_eq!(curve.v_total[j], curve.v_baryon[j], epsilon = 1e-5);
        }
    }

    #[test]
    fn test_fields_shared_across_scales() {
        let model = GalaxyModel::new(&record(), observed(), small());
        let cache = KernelCache::new();
        model.predict(4.0, 10.0, KernelShape::Plummer, 1.15, &cache).unwrap();
        model.predict(5.0, 10.0, KernelShape::Plummer, 1.15, &cache).unwrap();
        assert_eq!(model.fields.lock().unwrap().len(), 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_invalid_scale() {
        let model = GalaxyModel::new(&record(), observed(), small());
        let err = model
            .predict(0.0, 1.0, KernelShape::Plummer, 1.15, &KernelCache::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }
}
