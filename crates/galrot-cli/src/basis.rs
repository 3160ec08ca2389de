//! Basis generation and loading.
//!
//! ## Purpose
//!
//! Phase 4 interpolates among model curves computed at fixed scales
//! `L0 · m`. This module makes sure a curve exists on disk for every scale,
//! running the baseline model for the missing ones, and assembles the
//! curves into a core [`BasisSet`] on the baseline radius grid.
//!
//! ## Design notes
//!
//! * **Cache on disk**: With reuse on, an existing `rc_decomp_<NAME>_L<tag>.csv`
//!   is read instead of recomputed.
//! * **Lazy model**: The galaxy model (structure table, observed curve,
//!   baryonic fields) is only built when at least one scale is missing.
//! * **Parallel scales**: With the `cpu` feature, missing scales run in
//!   parallel; they share the baryonic fields of the galaxy.
//!
//! ## Invariants
//!
//! * Every assembled curve has one value per reference radius.

// Feature-gated imports
#[cfg(feature = "cpu")]
use rayon::prelude::*;

// External dependencies
use std::path::PathBuf;
use tracing::{debug, info, warn};

// Export dependencies from galrot crate
use galrot::numerics::align;
use galrot::prelude::{basis_scales, BasisSet};

// Internal dependencies
use crate::config::{BasisConfig, ModelConfig};
use crate::error::{PipelineError, Result};
use crate::io::{BasisCurve, CanonicalParams, DataLayout, GalaxyTable, ObservedCurve};
use crate::model::{GalaxyModel, KernelCache, KernelShape};

/// One basis curve and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleCurve {
    /// Kernel scale in kpc.
    pub l: f64,

    /// Decomposition at that scale.
    pub curve: BasisCurve,

    /// Path of the CSV.
    pub path: PathBuf,

    /// True when the model ran for this scale.
    pub generated: bool,
}

/// Bookkeeping of one assembled basis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasisReport {
    /// Scales in ascending order.
    pub scales: Vec<f64>,

    /// Scales computed by the model.
    pub generated: Vec<f64>,

    /// Scales read from disk.
    pub reused: Vec<f64>,

    /// Scales resampled onto the reference grid.
    pub resampled: Vec<f64>,
}

/// Produces basis curves for one galaxy at a time.
#[derive(Debug)]
pub struct BasisGenerator<'a> {
    layout: &'a DataLayout,
    config: &'a BasisConfig,
    model: ModelConfig,
    kernels: &'a KernelCache,
}

impl<'a> BasisGenerator<'a> {
    /// Generator writing under `layout`.
    pub fn new(
        layout: &'a DataLayout,
        config: &'a BasisConfig,
        model: ModelConfig,
        kernels: &'a KernelCache,
    ) -> Self {
        Self {
            layout,
            config,
            model,
            kernels,
        }
    }

    /// Kernel shape of `params`, falling back to the configured default.
    pub fn kernel_shape(&self, params: &CanonicalParams) -> Result<KernelShape> {
        params
            .kernel
            .as_deref()
            .unwrap_or(self.config.default_kernel.as_str())
            .parse()
    }

    /// Scales of the basis around `l0`, ascending.
    pub fn scales(&self, l0: f64) -> Result<Vec<f64>> {
        if !(l0.is_finite() && l0 > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "canonical scale must be positive, got {l0}"
            )));
        }
        Ok(basis_scales(l0, &self.config.multipliers))
    }

    /// Make sure a curve exists for every scale around `params.l`.
    pub fn ensure(&self, name: &str, params: &CanonicalParams) -> Result<Vec<ScaleCurve>> {
        let shape = self.kernel_shape(params)?;
        let scales = self.scales(params.l)?;

        let (cached, missing): (Vec<f64>, Vec<f64>) = scales
            .iter()
            .copied()
            .partition(|&l| self.config.reuse && self.layout.basis_file(name, l).exists());

        let mut out: Vec<ScaleCurve> = cached
            .iter()
            .map(|&l| {
                let path = self.layout.basis_file(name, l);
                debug!(galaxy = name, l, path = %path.display(), "reusing basis curve");
                Ok(ScaleCurve {
                    l,
                    curve: BasisCurve::read(&path)?,
                    path,
                    generated: false,
                })
            })
            .collect::<Result<_>>()?;

        if !missing.is_empty() {
            info!(galaxy = name, scales = missing.len(), kernel = %shape, "generating basis curves");
            let model = self.galaxy_model(name)?;
            out.extend(self.generate(name, &model, &missing, params.mu, shape)?);
        }

        out.sort_by(|a, b| a.l.total_cmp(&b.l));
        Ok(out)
    }

    fn galaxy_model(&self, name: &str) -> Result<GalaxyModel> {
        let table = GalaxyTable::read(self.layout.galaxies_csv())?;
        let record = table.find(name)?;
        let observed = ObservedCurve::load(self.layout, name)?;
        Ok(GalaxyModel::new(record, observed, self.model))
    }

    fn generate(
        &self,
        name: &str,
        model: &GalaxyModel,
        scales: &[f64],
        mu: f64,
        shape: KernelShape,
    ) -> Result<Vec<ScaleCurve>> {
        let run = |&l: &f64| -> Result<ScaleCurve> {
            let predicted = model.predict(l, mu, shape, self.config.beta, self.kernels)?;
            let curve = predicted.to_basis();
            let path = self.layout.basis_file(name, l);
            curve.write(&path)?;
            debug!(
                galaxy = name,
                l,
                alpha = ?predicted.alpha,
                flipped = predicted.polarity_flipped,
                "basis curve written"
            );
            Ok(ScaleCurve {
                l,
                curve,
                path,
                generated: true,
            })
        };

        #[cfg(feature = "cpu")]
        let curves: Result<Vec<ScaleCurve>> = scales.par_iter().map(run).collect();

        #[cfg(not(feature = "cpu"))]
        let curves: Result<Vec<ScaleCurve>> = scales.iter().map(run).collect();

        curves
    }

    /// Place the curves on `r_ref` and build the basis set.
    pub fn assemble(
        &self,
        r_ref: &[f64],
        curves: &[ScaleCurve],
    ) -> Result<(BasisSet<f64>, BasisReport)> {
        let mut report = BasisReport::default();
        let mut members = Vec::with_capacity(curves.len());

        for sc in curves {
            let aligned = align(
                sc.l,
                r_ref,
                &sc.curve.r,
                &sc.curve.v_total,
                self.config.strict_radii,
            )?;
            if aligned.was_resampled() {
                warn!(
                    l = sc.l,
                    path = %sc.path.display(),
                    got = sc.curve.r.len(),
                    expected = r_ref.len(),
                    "basis radii differ from the baseline; resampling"
                );
                report.resampled.push(sc.l);
            }
            if sc.generated {
                report.generated.push(sc.l);
            } else {
                report.reused.push(sc.l);
            }
            report.scales.push(sc.l);
            members.push((sc.l, aligned.into_values()));
        }

        let set = BasisSet::new(r_ref.to_vec(), members)?;
        Ok((set, report))
    }
}
