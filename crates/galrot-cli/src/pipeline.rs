//! Per-galaxy phases and fleet-wide rebuilds.
//!
//! ## Purpose
//!
//! [`Pipeline`] ties configuration, file layout and the core crate together.
//! Each public method is one command: it reads its inputs from the data
//! root, runs the numerical step and writes its outputs.
//!
//! ## Design notes
//!
//! * **Files between phases**: Phase 4 reads the L_eff table written by
//!   phase 3 rather than recomputing it, so phases can be rerun one at a time.
//! * **One model**: The core [`AdaptiveModel`] is built once from the
//!   configuration and reused for every galaxy.
//! * **Shared kernels**: The kernel-spectrum cache lives as long as the
//!   pipeline, so a fleet run reuses spectra across galaxies.
//!
//! ## Key concepts
//!
//! * **Phase 3**: χ and L_eff from the baseline baryonic curve.
//! * **Phase 4**: Adaptive curve from the basis and L_eff, with the outer gate.
//! * **Test 2**: Correlation of χ with the velocity change.
//! * **Test 3**: Inner log-scatter of baseline and adaptive curves against
//!   the observed curve.
//!
//! ## Invariants
//!
//! * Phase 4 refuses an L_eff table whose radii differ from the baseline.

// External dependencies
use std::cmp::Ordering;
use std::path::PathBuf;
use tracing::{debug, info, warn};

// Export dependencies from galrot crate
use galrot::numerics::{
    acceleration, allclose, radial_fraction, rar_residual_correlation, resample,
    residual_correlation, RarResidualReport, ResidualReport, RADII_ATOL,
};
use galrot::prelude::{
    AdaptiveModel, AdaptiveResult, BaselineSummary, CorrelationReport, CorrelationTest,
    LeffResult, ScatterReport, ScatterTest,
};

// Internal dependencies
use crate::basis::{BasisGenerator, BasisReport, ScaleCurve};
use crate::config::PipelineConfig;
use crate::error::{require_exists, PipelineError, Result};
use crate::io::table::fmt_f64;
use crate::io::{
    write_adaptive_table, write_chi_table, write_leff_table, AdaptiveMeta, AdaptiveTable,
    BaselineDecomposition, CanonicalParams, DataLayout, GalaxyTable, LeffMeta, LeffTable,
    ObservedCurve, ParamsFile, TableWriter,
};
use crate::model::KernelCache;

// ============================================================================
// Outcomes
// ============================================================================

/// Result of phase 3 for one galaxy.
#[derive(Debug, Clone)]
pub struct Phase3Outcome {
    /// Galaxy name as spelled in the baseline file.
    pub galaxy: String,

    /// Canonical parameters used.
    pub params: CanonicalParams,

    /// χ and L_eff profiles.
    pub result: LeffResult<f64>,
}

/// Result of phase 4 for one galaxy.
#[derive(Debug, Clone)]
pub struct Phase4Outcome {
    /// Galaxy name as spelled in the baseline file.
    pub galaxy: String,

    /// Adaptive curve and outer gate.
    pub result: AdaptiveResult<f64>,

    /// How the basis was obtained.
    pub basis: BasisReport,
}

/// Residual correlations of one galaxy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualsOutcome {
    /// χ against the observed-minus-baseline velocity residual.
    pub velocity: ResidualReport<f64>,

    /// χ against the RAR offset of the baseline.
    pub rar: RarResidualReport<f64>,
}

/// One row of the baseline summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub galaxy: String,
    pub mafe: Option<f64>,
    pub summary: BaselineSummary<f64>,
}

/// Totals of a RAR rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct RarOutcome {
    pub galaxies: usize,
    pub points: usize,
    pub path: PathBuf,
}

// ============================================================================
// Pipeline
// ============================================================================

/// The file-driven pipeline over one data root.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    layout: DataLayout,
    model: AdaptiveModel<f64>,
    kernels: KernelCache,
}

impl Pipeline {
    /// Pipeline for `config`; fails if the configuration does not validate.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let model = config.adaptive_model()?;
        let layout = DataLayout::new(&config.paths);
        Ok(Self {
            config,
            layout,
            model,
            kernels: KernelCache::new(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// File layout.
    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    fn params(&self, name: &str) -> Result<CanonicalParams> {
        ParamsFile::read(self.layout.params_json())?.get(name)
    }

    fn generator(&self) -> BasisGenerator<'_> {
        BasisGenerator::new(
            &self.layout,
            &self.config.basis,
            self.config.model,
            &self.kernels,
        )
    }

    // ========================================================================
    // Phase 3
    // ========================================================================

    /// χ and L_eff for `name`; writes the χ and L_eff tables.
    pub fn phase3(&self, name: &str) -> Result<Phase3Outcome> {
        let baseline = BaselineDecomposition::load(&self.layout, name)?;
        let galaxy = baseline.name.clone();
        let rd_star = GalaxyTable::read(self.layout.galaxies_csv())?.rd_star(&galaxy)?;
        let params = self.params(&galaxy)?;

        let result = self
            .model
            .profile(&baseline.r, &baseline.v_baryon, rd_star, params.l)?;

        write_chi_table(&self.layout.chi_csv(&galaxy), &galaxy, &result)?;
        let meta = LeffMeta {
            galaxy: galaxy.clone(),
            mu: params.mu,
            kernel: params
                .kernel
                .clone()
                .unwrap_or_else(|| self.config.basis.default_kernel.clone()),
            taper_r0: self.config.leff.taper_r0,
            taper_k: self.config.leff.taper_k,
        };
        write_leff_table(&self.layout.leff_csv(&galaxy), &meta, &result)?;

        let p = &result.profile;
        info!(
            galaxy = %galaxy,
            n = p.r.len(),
            l0 = p.l0,
            l_eff_min = p.l_eff.iter().copied().fold(f64::INFINITY, f64::min),
            l_eff_max = p.l_eff.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            "phase 3 done"
        );

        if self.config.plots {
            self.plot_phase3(&galaxy, &result);
        }

        Ok(Phase3Outcome {
            galaxy,
            params,
            result,
        })
    }

    // ========================================================================
    // Basis
    // ========================================================================

    /// Make sure every basis curve of `name` exists on disk.
    pub fn basis(&self, name: &str) -> Result<Vec<ScaleCurve>> {
        let baseline = BaselineDecomposition::load(&self.layout, name)?;
        let params = self.params(&baseline.name)?;
        let curves = self.generator().ensure(&baseline.name, &params)?;
        info!(
            galaxy = %baseline.name,
            scales = curves.len(),
            generated = curves.iter().filter(|c| c.generated).count(),
            "basis ready"
        );
        Ok(curves)
    }

    // ========================================================================
    // Phase 4
    // ========================================================================

    /// Adaptive curve for `name`; writes the adaptive table.
    pub fn phase4(&self, name: &str) -> Result<Phase4Outcome> {
        let baseline = BaselineDecomposition::load(&self.layout, name)?;
        let galaxy = baseline.name.clone();
        let leff_path = self.layout.leff_csv(&galaxy);
        require_exists(&leff_path, "L_eff table (run phase3 first)")?;
        let leff = LeffTable::read(&leff_path)?;

        if !allclose(&leff.r, &baseline.r, RADII_ATOL) {
            return Err(PipelineError::RadiiMismatch {
                context: format!("{} vs baseline of {galaxy}", leff_path.display()),
                got: leff.r.len(),
                expected: baseline.r.len(),
            });
        }

        // The basis brackets the profile that phase 3 wrote.
        let params = CanonicalParams {
            name: galaxy.clone(),
            l: leff.l0,
            mu: leff.mu,
            kernel: Some(leff.kernel.clone()),
            mafe: None,
        };
        let generator = self.generator();
        let curves = generator.ensure(&galaxy, &params)?;
        let (basis, report) = generator.assemble(&baseline.r, &curves)?;

        let result =
            self.model
                .adapt_profile(&baseline.r, &leff.l_eff, leff.l0, &basis, &baseline.v_total)?;

        let meta = AdaptiveMeta {
            galaxy: galaxy.clone(),
            l0: leff.l0,
            mu: params.mu,
            kernel: generator.kernel_shape(&params)?.to_string(),
            strict_radii: self.config.basis.strict_radii,
        };
        write_adaptive_table(
            &self.layout.adaptive_csv(&galaxy),
            &meta,
            &baseline.v_baryon,
            &result,
        )?;

        let s = &result.stability;
        if result.curve.clipped_count > 0 {
            warn!(
                galaxy = %galaxy,
                clipped = result.curve.clipped_count,
                "L_eff clipped to the basis range"
            );
        }
        info!(
            galaxy = %galaxy,
            outer_max_abs_dv = s.max_abs_dv,
            n_outer = s.n_outer,
            pass = s.pass,
            "phase 4 done"
        );

        if self.config.plots {
            self.plot_phase4(&galaxy, leff.l0, &baseline.v_baryon, &result);
        }

        Ok(Phase4Outcome {
            galaxy,
            result,
            basis: report,
        })
    }

    // ========================================================================
    // Tests
    // ========================================================================

    fn resolve(&self, name: &str) -> String {
        self.layout
            .find_baseline(name)
            .ok()
            .and_then(|p| {
                p.file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .and_then(|f| {
                        crate::io::layout::galaxy_from_baseline_name(&f).map(str::to_string)
                    })
            })
            .unwrap_or_else(|| name.to_string())
    }

    fn read_adaptive(&self, galaxy: &str) -> Result<AdaptiveTable> {
        let path = self.layout.adaptive_csv(galaxy);
        require_exists(&path, "adaptive table (run phase4 first)")?;
        AdaptiveTable::read(&path)
    }

    fn read_leff(&self, galaxy: &str) -> Result<LeffTable> {
        let path = self.layout.leff_csv(galaxy);
        require_exists(&path, "L_eff table (run phase3 first)")?;
        LeffTable::read(&path)
    }

    /// Correlation of χ with the adaptive velocity change.
    pub fn test2(&self, name: &str) -> Result<CorrelationReport<f64>> {
        let galaxy = self.resolve(name);
        let leff_path = self.layout.leff_csv(&galaxy);
        let leff = self.read_leff(&galaxy)?;
        let chi = leff.require_chi(&leff_path)?;
        let adaptive = self.read_adaptive(&galaxy)?;

        let test = CorrelationTest {
            max_rfrac: self.config.gates.test2_max_rfrac,
        };
        let report = test.evaluate(
            &leff.r,
            chi,
            &adaptive.r,
            &adaptive.v_baseline,
            &adaptive.v_adaptive,
        )?;
        info!(
            galaxy = %galaxy,
            r = report.r,
            n = report.n,
            max_abs_dv = report.max_abs_dv,
            "test 2"
        );
        Ok(report)
    }

    /// Inner log-scatter of baseline and adaptive curves.
    pub fn test3(&self, name: &str) -> Result<ScatterReport<f64>> {
        let galaxy = self.resolve(name);
        let observed = ObservedCurve::load(&self.layout, &galaxy)?;
        let adaptive = self.read_adaptive(&galaxy)?;

        let test = ScatterTest {
            inner_frac: self.config.gates.test3_inner_frac,
            neutral_band: self.config.gates.test3_neutral_dex,
        };
        let report = test.evaluate(
            &observed.r,
            &observed.v,
            &adaptive.r,
            &adaptive.v_baseline,
            &adaptive.r,
            &adaptive.v_adaptive,
        )?;
        info!(
            galaxy = %galaxy,
            sigma_baseline = report.sigma_baseline,
            sigma_adaptive = report.sigma_adaptive,
            delta_sigma = report.delta_sigma,
            n = report.n,
            verdict = %report.verdict,
            "test 3"
        );
        Ok(report)
    }

    /// χ against the baseline residuals.
    pub fn residuals(&self, name: &str) -> Result<ResidualsOutcome> {
        let galaxy = self.resolve(name);
        let leff_path = self.layout.leff_csv(&galaxy);
        let leff = self.read_leff(&galaxy)?;
        let chi_native = leff.require_chi(&leff_path)?;
        let adaptive = self.read_adaptive(&galaxy)?;
        let observed = ObservedCurve::load(&self.layout, &galaxy)?;

        let chi = if allclose(&leff.r, &adaptive.r, RADII_ATOL) {
            chi_native.to_vec()
        } else {
            debug!(galaxy = %galaxy, "interpolating χ onto the adaptive grid");
            resample(&adaptive.r, &leff.r, chi_native)
        };

        let velocity = residual_correlation(
            &adaptive.r,
            &chi,
            &adaptive.v_baseline,
            &observed.r,
            &observed.v,
        )?;
        let rar =
            rar_residual_correlation(&adaptive.r, &chi, &adaptive.v_baryon, &adaptive.v_baseline)?;
        info!(
            galaxy = %galaxy,
            n = velocity.n,
            r_signed = velocity.r_signed,
            r_abs = velocity.r_abs,
            rar_n = rar.n,
            rar_r = rar.r,
            "residual correlations"
        );
        Ok(ResidualsOutcome { velocity, rar })
    }

    // ========================================================================
    // Fleet-wide rebuilds
    // ========================================================================

    /// Rebuild `rar_points.csv` from every baseline decomposition.
    pub fn rar(&self) -> Result<RarOutcome> {
        let galaxies = self.layout.list_galaxies()?;
        let mut w = TableWriter::new(&["galaxy", "R_kpc", "g_bar", "g_obs", "r_frac", "idx"]);
        let mut used = 0;

        for name in &galaxies {
            let baseline = match BaselineDecomposition::load(&self.layout, name) {
                Ok(b) => b,
                Err(e) => {
                    warn!(galaxy = %name, error = %e, "skipping baseline");
                    continue;
                }
            };
            let g_bar = acceleration(&baseline.v_baryon, &baseline.r);
            let g_obs = acceleration(&baseline.v_total, &baseline.r);
            let r_frac = radial_fraction(&baseline.r);
            for j in 0..baseline.len() {
                w.push(vec![
                    baseline.name.clone(),
                    fmt_f64(baseline.r[j]),
                    fmt_f64(g_bar[j]),
                    fmt_f64(g_obs[j]),
                    fmt_f64(r_frac[j]),
                    j.to_string(),
                ]);
            }
            used += 1;
        }

        let path = self.layout.rar_csv();
        w.write(&path)?;
        info!(galaxies = used, points = w.len(), path = %path.display(), "RAR points written");
        Ok(RarOutcome {
            galaxies: used,
            points: w.len(),
            path,
        })
    }

    /// Shape summary of every baseline with a kernel column.
    pub fn summarize(&self) -> Result<Vec<SummaryRow>> {
        let params = match ParamsFile::read(self.layout.params_json()) {
            Ok(p) => Some(p),
            Err(PipelineError::MissingFile { .. }) => None,
            Err(e) => return Err(e),
        };

        let mut rows = Vec::new();
        for name in self.layout.list_galaxies()? {
            let baseline = match BaselineDecomposition::load(&self.layout, &name) {
                Ok(b) => b,
                Err(e) => {
                    warn!(galaxy = %name, error = %e, "skipping baseline");
                    continue;
                }
            };
            let Some(vk) = baseline.v_kernel.as_deref() else {
                debug!(galaxy = %name, "no V_kernel column");
                continue;
            };
            let Some(summary) =
                BaselineSummary::from_decomposition(&baseline.v_baryon, vk, &baseline.v_total)
            else {
                debug!(galaxy = %name, "too short to summarize");
                continue;
            };
            let mafe = params
                .as_ref()
                .and_then(|p| p.get(&baseline.name).ok())
                .and_then(|p| p.mafe);
            rows.push(SummaryRow {
                galaxy: baseline.name,
                mafe,
                summary,
            });
        }

        rows.sort_by(|a, b| match (a.mafe, b.mafe) {
            (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a.galaxy.cmp(&b.galaxy)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.galaxy.cmp(&b.galaxy),
        });

        let mut w = TableWriter::new(&[
            "galaxy",
            "mafe",
            "max_V_baryon",
            "max_V_kernel",
            "max_V_total",
            "kernel_to_baryon_ratio",
            "kernel_active",
            "inner_excess",
            "inner_overshoot",
            "outer_decay",
        ]);
        for row in &rows {
            let s = &row.summary;
            w.push(vec![
                row.galaxy.clone(),
                row.mafe.map(fmt_f64).unwrap_or_default(),
                fmt_f64(s.max_v_baryon),
                fmt_f64(s.max_v_kernel),
                fmt_f64(s.max_v_total),
                fmt_f64(s.kernel_to_baryon_ratio),
                s.kernel_active.to_string(),
                fmt_f64(s.inner_excess),
                s.inner_overshoot.to_string(),
                s.outer_decay.to_string(),
            ]);
        }
        let path = self.layout.baseline_summary_csv();
        w.write(&path)?;
        info!(galaxies = rows.len(), path = %path.display(), "baseline summary written");
        Ok(rows)
    }

    // ========================================================================
    // Charts
    // ========================================================================

    /// Render the charts of `name` from the tables on disk.
    pub fn plot(&self, name: &str) -> Result<()> {
        let galaxy = self.resolve(name);
        #[cfg(feature = "plot")]
        {
            use crate::plot;

            let leff = self.read_leff(&galaxy)?;
            plot::leff(
                &self.layout.phase4_leff_png(&galaxy),
                &galaxy,
                &leff.r,
                &leff.l_eff,
                leff.l0,
                None,
            )?;
            let adaptive = self.read_adaptive(&galaxy)?;
            let observed = ObservedCurve::load(&self.layout, &galaxy).ok();
            plot::rotation_curve(
                &self.layout.rc_png(&galaxy),
                &galaxy,
                &plot::RotationCurves {
                    r: &adaptive.r,
                    v_baryon: &adaptive.v_baryon,
                    v_baseline: &adaptive.v_baseline,
                    v_adaptive: &adaptive.v_adaptive,
                },
                observed.as_ref(),
            )?;
            let dv: Vec<f64> = adaptive
                .v_adaptive
                .iter()
                .zip(&adaptive.v_baseline)
                .map(|(a, b)| a - b)
                .collect();
            plot::delta_v(&self.layout.delta_v_png(&galaxy), &galaxy, &adaptive.r, &dv)?;
            info!(galaxy = %galaxy, "charts written");
            Ok(())
        }
        #[cfg(not(feature = "plot"))]
        {
            Err(PipelineError::Plot(format!(
                "cannot chart {galaxy}: built without the `plot` feature"
            )))
        }
    }

    #[cfg(feature = "plot")]
    fn plot_phase3(&self, galaxy: &str, result: &LeffResult<f64>) {
        use crate::plot;

        let p = &result.profile;
        let smooth = result.chi.smooth.as_ref().map(|s| s.chi.as_slice());
        let l_adapt = result.config.taper.as_ref().map(|_| p.l_adapt.as_slice());
        let outcome = plot::chi(
            &self.layout.chi_png(galaxy),
            galaxy,
            &p.r,
            &result.chi.raw.chi,
            smooth,
        )
        .and_then(|_| {
            plot::leff(
                &self.layout.leff_png(galaxy),
                galaxy,
                &p.r,
                &p.l_eff,
                p.l0,
                l_adapt,
            )
        });
        if let Err(e) = outcome {
            warn!(galaxy, error = %e, "phase 3 charts failed");
        }
    }

    #[cfg(not(feature = "plot"))]
    fn plot_phase3(&self, galaxy: &str, _result: &LeffResult<f64>) {
        warn!(galaxy, "charts requested but the `plot` feature is off");
    }

    #[cfg(feature = "plot")]
    fn plot_phase4(&self, galaxy: &str, l0: f64, v_baryon: &[f64], result: &AdaptiveResult<f64>) {
        use crate::plot;

        let c = &result.curve;
        let observed = ObservedCurve::load(&self.layout, galaxy).ok();
        let outcome = plot::rotation_curve(
            &self.layout.rc_png(galaxy),
            galaxy,
            &plot::RotationCurves {
                r: &c.r,
                v_baryon,
                v_baseline: &result.v_baseline,
                v_adaptive: &c.v_adaptive,
            },
            observed.as_ref(),
        )
        .and_then(|_| plot::delta_v(&self.layout.delta_v_png(galaxy), galaxy, &c.r, &result.dv))
        .and_then(|_| {
            plot::leff(
                &self.layout.phase4_leff_png(galaxy),
                galaxy,
                &c.r,
                &c.l_eff,
                l0,
                None,
            )
        });
        if let Err(e) = outcome {
            warn!(galaxy, error = %e, "phase 4 charts failed");
        }
    }

    #[cfg(not(feature = "plot"))]
    fn plot_phase4(
        &self,
        galaxy: &str,
        _l0: f64,
        _v_baryon: &[f64],
        _result: &AdaptiveResult<f64>,
    ) {
        warn!(galaxy, "charts requested but the `plot` feature is off");
    }
}
