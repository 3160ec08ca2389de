//! File layout under the data root.
//!
//! All file names the pipeline reads or writes are produced here, so the
//! naming conventions live in one place.

// External dependencies
use std::fs;
use std::path::{Path, PathBuf};

// Internal dependencies
use crate::config::PathsConfig;
use crate::error::{PathContext, PipelineError, Result};

const BASELINE_PREFIX: &str = "rc_decomp_";
const BASELINE_SUFFIX: &str = "_best.csv";
const ROTMOD_SUFFIX: &str = "_rotmod.dat";

/// Resolved directories and file-name conventions.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLayout {
    root: PathBuf,
    baseline_dir: PathBuf,
    sparc_dir: PathBuf,
    derived_dir: PathBuf,
    galaxies_csv: PathBuf,
    params_json: PathBuf,
}

/// File tag of a basis scale: `<int>kpc` when integral, else three decimals.
pub fn basis_tag(l_kpc: f64) -> String {
    if (l_kpc - l_kpc.round()).abs() < 1e-9 {
        format!("{}kpc", l_kpc.round() as i64)
    } else {
        format!("{l_kpc:.3}kpc")
    }
}

/// Galaxy name encoded in a baseline file name, if it is one.
pub fn galaxy_from_baseline_name(file_name: &str) -> Option<&str> {
    file_name
        .strip_prefix(BASELINE_PREFIX)?
        .strip_suffix(BASELINE_SUFFIX)
        .filter(|name| !name.is_empty())
}

fn sorted_names(dir: &Path, extract: impl Fn(&str) -> Option<&str>) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).at(dir)? {
        let entry = entry.at(dir)?;
        let file_name = entry.file_name();
        if let Some(name) = extract(&file_name.to_string_lossy()) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

fn find_case_insensitive(dir: &Path, wanted: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().eq_ignore_ascii_case(wanted))
        .map(|e| e.path())
}

impl DataLayout {
    /// Resolve the configured paths against the data root.
    pub fn new(paths: &PathsConfig) -> Self {
        let root = paths.data_root.clone();
        Self {
            baseline_dir: root.join(&paths.baseline_dir),
            sparc_dir: root.join(&paths.sparc_dir),
            derived_dir: root.join(&paths.derived_dir),
            galaxies_csv: root.join(&paths.galaxies_csv),
            params_json: root.join(&paths.params_json),
            root,
        }
    }

    /// The data root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========================================================================
    // Inputs
    // ========================================================================

    /// Directory of baseline decompositions.
    pub fn baseline_dir(&self) -> &Path {
        &self.baseline_dir
    }

    /// Directory of observed curves.
    pub fn sparc_dir(&self) -> &Path {
        &self.sparc_dir
    }

    /// Galaxy structure table.
    pub fn galaxies_csv(&self) -> &Path {
        &self.galaxies_csv
    }

    /// Canonical parameter file.
    pub fn params_json(&self) -> &Path {
        &self.params_json
    }

    /// Expected baseline path for `name`.
    pub fn baseline_file(&self, name: &str) -> PathBuf {
        self.baseline_dir
            .join(format!("{BASELINE_PREFIX}{name}{BASELINE_SUFFIX}"))
    }

    /// Baseline path for `name`, matching the file name case-insensitively.
    pub fn find_baseline(&self, name: &str) -> Result<PathBuf> {
        let exact = self.baseline_file(name);
        if exact.exists() {
            return Ok(exact);
        }
        let wanted = format!("{BASELINE_PREFIX}{name}{BASELINE_SUFFIX}");
        find_case_insensitive(&self.baseline_dir, &wanted).ok_or(PipelineError::MissingFile {
            label: "baseline decomposition",
            path: exact,
        })
    }

    /// Expected observed-curve path for `name`.
    pub fn rotmod_file(&self, name: &str) -> PathBuf {
        self.sparc_dir.join(format!("{name}{ROTMOD_SUFFIX}"))
    }

    /// Observed-curve path for `name`, matching case-insensitively.
    pub fn find_rotmod(&self, name: &str) -> Result<PathBuf> {
        let exact = self.rotmod_file(name);
        if exact.exists() {
            return Ok(exact);
        }
        let wanted = format!("{name}{ROTMOD_SUFFIX}");
        find_case_insensitive(&self.sparc_dir, &wanted).ok_or(PipelineError::MissingFile {
            label: "observed rotation curve",
            path: exact,
        })
    }

    /// Galaxies with a baseline decomposition, sorted.
    pub fn list_galaxies(&self) -> Result<Vec<String>> {
        sorted_names(&self.baseline_dir, galaxy_from_baseline_name)
    }

    /// Galaxies with an observed curve, sorted.
    pub fn list_observed(&self) -> Result<Vec<String>> {
        sorted_names(&self.sparc_dir, |f| {
            f.strip_suffix(ROTMOD_SUFFIX).filter(|n| !n.is_empty())
        })
    }

    // ========================================================================
    // Derived outputs
    // ========================================================================

    /// Root of every output.
    pub fn derived_dir(&self) -> &Path {
        &self.derived_dir
    }

    fn phase3_dir(&self) -> PathBuf {
        self.derived_dir.join("phase3")
    }

    fn phase4_dir(&self) -> PathBuf {
        self.derived_dir.join("phase4")
    }

    /// χ table.
    pub fn chi_csv(&self, name: &str) -> PathBuf {
        self.phase3_dir().join(format!("chi_{name}.csv"))
    }

    /// L_eff table.
    pub fn leff_csv(&self, name: &str) -> PathBuf {
        self.phase3_dir().join(format!("leff_{name}.csv"))
    }

    /// χ chart.
    pub fn chi_png(&self, name: &str) -> PathBuf {
        self.phase3_dir().join(format!("chi_{name}.png"))
    }

    /// L_eff chart of phase 3.
    pub fn leff_png(&self, name: &str) -> PathBuf {
        self.phase3_dir().join(format!("leff_{name}.png"))
    }

    /// Directory of basis curves.
    pub fn basis_dir(&self) -> PathBuf {
        self.phase4_dir().join("basis")
    }

    /// Basis curve of `name` at scale `l_kpc`.
    pub fn basis_file(&self, name: &str, l_kpc: f64) -> PathBuf {
        self.basis_dir()
            .join(format!("{BASELINE_PREFIX}{name}_L{}.csv", basis_tag(l_kpc)))
    }

    fn phase4_outputs(&self) -> PathBuf {
        self.phase4_dir().join("outputs")
    }

    /// Adaptive decomposition.
    pub fn adaptive_csv(&self, name: &str) -> PathBuf {
        self.phase4_outputs()
            .join(format!("{BASELINE_PREFIX}{name}_adaptive.csv"))
    }

    /// Rotation-curve chart of phase 4.
    pub fn rc_png(&self, name: &str) -> PathBuf {
        self.phase4_outputs().join(format!("phase4_rc_{name}.png"))
    }

    /// ΔV chart of phase 4.
    pub fn delta_v_png(&self, name: &str) -> PathBuf {
        self.phase4_outputs().join(format!("phase4_deltaV_{name}.png"))
    }

    /// L_eff chart of phase 4.
    pub fn phase4_leff_png(&self, name: &str) -> PathBuf {
        self.phase4_outputs().join(format!("phase4_leff_{name}.png"))
    }

    /// Fleet summary table.
    pub fn fleet_csv(&self) -> PathBuf {
        self.derived_dir.join("fleet").join("fleet_summary.csv")
    }

    /// Fleet summary records.
    pub fn fleet_json(&self) -> PathBuf {
        self.derived_dir.join("fleet").join("fleet_summary.json")
    }

    /// Rebuilt RAR points.
    pub fn rar_csv(&self) -> PathBuf {
        self.derived_dir.join("rar_points.csv")
    }

    /// Baseline shape summary.
    pub fn baseline_summary_csv(&self) -> PathBuf {
        self.derived_dir.join("baseline_summary.csv")
    }
}
