//! Pipeline configuration.
//!
//! ## Purpose
//!
//! This module holds every tunable of the file-driven pipeline in one
//! serde-backed structure. A JSON file may override any subset of the
//! defaults; command-line flags are applied on top of that.
//!
//! ## Design notes
//!
//! * **Sections**: Paths, χ smoothing, the L_eff mapping, basis generation,
//!   the baseline model grid and the diagnostic gates each get a section.
//! * **Partial files**: Every section is `#[serde(default)]`, so a file that
//!   sets only `{"leff": {"alpha": 2.0}}` is valid.
//! * **One bridge**: [`PipelineConfig::adaptive_model`] is the only place
//!   that turns configuration into a core [`AdaptiveModel`].
//!
//! ## Invariants
//!
//! * A configuration that passed [`PipelineConfig::validate`] builds a model.

// External dependencies
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Export dependencies from galrot crate
use galrot::numerics::{DEFAULT_TAPER_K, DEFAULT_TAPER_R0};
use galrot::prelude::{Adaptive, AdaptiveModel, ChiSource, DEFAULT_MULTIPLIERS};

// Internal dependencies
use crate::error::{PathContext, PipelineError, Result};

// ============================================================================
// Sections
// ============================================================================

/// Where the pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root every other path is relative to.
    pub data_root: PathBuf,

    /// Frozen baseline decompositions (`rc_decomp_<NAME>_best.csv`).
    pub baseline_dir: PathBuf,

    /// Observed rotation curves (`<NAME>_rotmod.dat`).
    pub sparc_dir: PathBuf,

    /// Outputs of every phase.
    pub derived_dir: PathBuf,

    /// Galaxy structure table.
    pub galaxies_csv: PathBuf,

    /// Canonical per-galaxy parameters.
    pub params_json: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            baseline_dir: PathBuf::from("baseline"),
            sparc_dir: PathBuf::from("sparc"),
            derived_dir: PathBuf::from("derived"),
            galaxies_csv: PathBuf::from("galaxies.csv"),
            params_json: PathBuf::from("baseline/all_galaxy_params.json"),
        }
    }
}

/// Pre-differentiation smoothing of `g_bar` for the χ table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChiConfig {
    /// Also compute the smoothed χ variant.
    pub smooth: bool,

    /// Gaussian width in samples.
    pub sigma_idx: f64,

    /// Gaussian half-width in samples.
    pub radius: usize,
}

impl Default for ChiConfig {
    fn default() -> Self {
        Self {
            smooth: true,
            sigma_idx: 1.0,
            radius: 4,
        }
    }
}

/// χ variant named in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChiVariant {
    #[default]
    Raw,
    Smoothed,
}

impl From<ChiVariant> for ChiSource {
    fn from(v: ChiVariant) -> Self {
        match v {
            ChiVariant::Raw => ChiSource::Raw,
            ChiVariant::Smoothed => ChiSource::Smoothed,
        }
    }
}

/// χ → L_eff mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeffSettings {
    /// Deformation strength.
    pub alpha: f64,

    /// Display smoothing width of χ in samples.
    pub sigma_idx: f64,

    /// χ variant driving L_eff.
    pub chi_source: ChiVariant,

    /// Divide χ by its maximum.
    pub normalize: bool,

    /// Optional floor on L_adapt as a fraction of L0.
    pub floor_fraction: Option<f64>,

    /// Enable the outer taper.
    pub taper: bool,

    /// Taper midpoint as a fraction of r_max.
    pub taper_r0: f64,

    /// Taper steepness.
    pub taper_k: f64,
}

impl Default for LeffSettings {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            sigma_idx: 1.0,
            chi_source: ChiVariant::Raw,
            normalize: true,
            floor_fraction: None,
            taper: false,
            taper_r0: DEFAULT_TAPER_R0,
            taper_k: DEFAULT_TAPER_K,
        }
    }
}

/// Basis generation and loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasisConfig {
    /// Scales are `L0 · m` for each multiplier `m`.
    pub multipliers: Vec<f64>,

    /// Fail on radius-grid mismatch instead of resampling.
    pub strict_radii: bool,

    /// Reuse basis files already on disk.
    pub reuse: bool,

    /// Kernel shape parameter recorded in the cache key.
    pub beta: f64,

    /// Kernel used when the parameter file names none.
    pub default_kernel: String,
}

impl Default for BasisConfig {
    fn default() -> Self {
        Self {
            multipliers: DEFAULT_MULTIPLIERS.to_vec(),
            strict_radii: false,
            reuse: true,
            beta: 1.15,
            default_kernel: "ananta-hybrid".to_string(),
        }
    }
}

/// Grid and profile settings of the baseline model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Fixed cell size in kpc; `None` derives it from the galaxy extent.
    pub dx: Option<f64>,

    /// Upper bound on cells per axis.
    pub max_n: usize,

    /// Radial bins of the velocity profile.
    pub radial_bins: usize,

    /// Factor applied to the gas mass for helium.
    pub helium_factor: f64,

    /// Minimum valid radii for the kernel amplitude fit.
    pub min_fit_points: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dx: Some(1.0),
            max_n: 512,
            radial_bins: 30,
            helium_factor: 1.33,
            min_fit_points: 5,
        }
    }
}

/// Thresholds of the diagnostic tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Outer region of the stability gate (fraction of r_max).
    pub outer_rfrac: f64,

    /// Outer gate tolerance in km/s.
    pub outer_tol_kms: f64,

    /// Upper radial fraction of the χ–ΔV correlation.
    pub test2_max_rfrac: f64,

    /// Inner region of the scatter test (fraction of the outermost observed radius).
    pub test3_inner_frac: f64,

    /// Half-width of the neutral band of the scatter test in dex.
    pub test3_neutral_dex: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            outer_rfrac: 0.70,
            outer_tol_kms: 2.0,
            test2_max_rfrac: 0.70,
            test3_inner_frac: 0.5,
            test3_neutral_dex: 0.01,
        }
    }
}

/// Fleet runner settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Deformation strength used for every galaxy.
    pub alpha: f64,

    /// Taper setting used for every galaxy.
    pub taper: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            alpha: 2.0,
            taper: false,
        }
    }
}

/// Every setting of the pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub chi: ChiConfig,
    pub leff: LeffSettings,
    pub basis: BasisConfig,
    pub model: ModelConfig,
    pub gates: GateConfig,
    pub fleet: FleetConfig,

    /// Render PNG charts next to the tables.
    pub plots: bool,
}

// ============================================================================
// Loading and Validation
// ============================================================================

impl PipelineConfig {
    /// Read a JSON configuration file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).at(path)?;
        let config: Self = serde_json::from_str(&text).at(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).at(path)?;
        fs::write(path, text).at(path)
    }

    /// Check the settings the core crate does not see.
    pub fn validate(&self) -> Result<()> {
        let m = &self.model;
        if let Some(dx) = m.dx {
            if !(dx.is_finite() && dx > 0.0) {
                return Err(PipelineError::InvalidParameter(format!(
                    "model.dx must be positive, got {dx}"
                )));
            }
        }
        if m.max_n < 16 {
            return Err(PipelineError::InvalidParameter(format!(
                "model.max_n must be at least 16, got {}",
                m.max_n
            )));
        }
        if m.radial_bins < 2 {
            return Err(PipelineError::InvalidParameter(format!(
                "model.radial_bins must be at least 2, got {}",
                m.radial_bins
            )));
        }
        if !(m.helium_factor.is_finite() && m.helium_factor > 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "model.helium_factor must be positive, got {}",
                m.helium_factor
            )));
        }
        let g = &self.gates;
        for (name, v) in [
            ("gates.test2_max_rfrac", g.test2_max_rfrac),
            ("gates.test3_inner_frac", g.test3_inner_frac),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                return Err(PipelineError::InvalidParameter(format!(
                    "{name} must lie in (0, 1], got {v}"
                )));
            }
        }
        if !(g.test3_neutral_dex >= 0.0) {
            return Err(PipelineError::InvalidParameter(format!(
                "gates.test3_neutral_dex must be non-negative, got {}",
                g.test3_neutral_dex
            )));
        }

        // Remaining ranges are owned by the core builder.
        self.adaptive_model()?;
        Ok(())
    }

    // ========================================================================
    // Bridge to the core crate
    // ========================================================================

    /// Build the core model for phase 3 and phase 4.
    pub fn adaptive_model(&self) -> Result<AdaptiveModel<f64>> {
        let l = &self.leff;
        let mut builder = Adaptive::new()
            .alpha(l.alpha)
            .display_sigma(l.sigma_idx)
            .chi_source(l.chi_source.into())
            .normalize_chi(l.normalize)
            .outer_gate(self.gates.outer_rfrac, self.gates.outer_tol_kms);
        if self.chi.smooth {
            builder = builder.smoothing(self.chi.sigma_idx, self.chi.radius);
        }
        if let Some(f) = l.floor_fraction {
            builder = builder.floor_fraction(f);
        }
        if l.taper {
            builder = builder.taper(l.taper_r0, l.taper_k);
        }
        Ok(builder.build()?)
    }

    /// Copy of this configuration with the fleet overrides applied.
    pub fn for_fleet(&self) -> Self {
        let mut out = self.clone();
        out.leff.alpha = self.fleet.alpha;
        out.leff.taper = self.fleet.taper;
        out
    }
}
