//! Galaxy inputs: baseline decompositions, structure table, canonical
//! parameters and observed rotation curves.
//!
//! ## Purpose
//!
//! This module loads the four per-galaxy inputs of the pipeline and checks
//! them at the boundary, so that later phases can assume sorted, complete
//! data.
//!
//! ## Design notes
//!
//! * **Case-insensitive lookup**: An exact name match is tried first, then a
//!   case-insensitive one; the name stored in the file wins.
//! * **Sorted on load**: Baseline rows and observed points are sorted by
//!   radius with a stable sort.
//! * **Two header styles**: The structure table accepts both `Rd_star` and
//!   `Rd_star_kpc` style headers.
//!
//! ## Invariants
//!
//! * A loaded [`BaselineDecomposition`] has at least one row and increasing
//!   or equal radii.
//! * A loaded [`GalaxyRecord`] has a positive, finite `rd_star`.

// External dependencies
use serde_json::Value;
use std::fs;
use std::path::Path;

// Export dependencies from galrot crate
use galrot::numerics::{permute, radius_permutation, sort_by_radius};

// Internal dependencies
use crate::error::{PathContext, PipelineError, Result};
use crate::io::layout::{galaxy_from_baseline_name, DataLayout};
use crate::io::table::{parse_f64, Table};

// ============================================================================
// Baseline Decomposition
// ============================================================================

/// Frozen baseline decomposition of one galaxy.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineDecomposition {
    /// Galaxy name as spelled in the file name.
    pub name: String,

    /// Radii in kpc.
    pub r: Vec<f64>,

    /// Baryonic velocity in km/s.
    pub v_baryon: Vec<f64>,

    /// Total velocity in km/s.
    pub v_total: Vec<f64>,

    /// Kernel velocity in km/s, when the file has it.
    pub v_kernel: Option<Vec<f64>>,
}

impl BaselineDecomposition {
    /// Read a decomposition file; `name` labels the result.
    pub fn read(path: &Path, name: &str) -> Result<Self> {
        let table = Table::read(path)?;
        table.require(&["R_kpc", "V_baryon", "V_total"])?;
        table.require_rows()?;

        let r = table.floats("R_kpc")?;
        let vb = table.floats("V_baryon")?;
        let vt = table.floats("V_total")?;
        let vk = if table.has("V_kernel") {
            Some(table.floats("V_kernel")?)
        } else {
            None
        };

        let idx = radius_permutation(&r);
        Ok(Self {
            name: name.to_string(),
            r: permute(&r, &idx),
            v_baryon: permute(&vb, &idx),
            v_total: permute(&vt, &idx),
            v_kernel: vk.map(|k| permute(&k, &idx)),
        })
    }

    /// Load the decomposition of `name` from the baseline directory.
    pub fn load(layout: &DataLayout, name: &str) -> Result<Self> {
        let path = layout.find_baseline(name)?;
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let resolved = galaxy_from_baseline_name(&file_name).unwrap_or(name);
        Self::read(&path, resolved)
    }

    /// Number of radii.
    pub fn len(&self) -> usize {
        self.r.len()
    }

    /// True when the decomposition has no radii.
    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    /// Outermost radius.
    pub fn r_max(&self) -> f64 {
        self.r.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

// ============================================================================
// Structure Table
// ============================================================================

/// One row of the galaxy structure table.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyRecord {
    /// Galaxy name.
    pub name: String,

    /// Stellar disk scale length in kpc.
    pub rd_star: f64,

    /// Stellar mass in M☉ (0 when absent).
    pub mstar: f64,

    /// Stellar disk scale height in kpc.
    pub hz_star: f64,

    /// Gas disk scale length in kpc (0 when absent).
    pub rd_gas: f64,

    /// Gas mass in M☉ as listed, before any helium correction.
    pub mgas: f64,

    /// Gas disk scale height in kpc.
    pub hz_gas: f64,
}

/// Default stellar scale height in kpc.
pub const DEFAULT_HZ_STAR: f64 = 0.3;

/// Default gas scale height in kpc.
pub const DEFAULT_HZ_GAS: f64 = 0.15;

fn pick<'n>(table: &Table, names: &[&'n str]) -> Option<&'n str> {
    names.iter().copied().find(|n| table.has(n))
}

fn optional_column(table: &Table, names: &[&str], default: f64) -> Result<Vec<f64>> {
    match pick(table, names) {
        Some(col) => Ok(table
            .strings(col)?
            .into_iter()
            .map(|s| match parse_f64(s) {
                Some(v) if v.is_finite() => v,
                Some(_) if s.trim().is_empty() => default,
                _ => 0.0,
            })
            .collect()),
        None => Ok(vec![default; table.len()]),
    }
}

/// Galaxy structure table.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxyTable {
    source: String,
    records: Vec<GalaxyRecord>,
}

impl GalaxyTable {
    /// Read `galaxies.csv`.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingFile {
                label: "galaxy structure table",
                path: path.to_path_buf(),
            });
        }
        let table = Table::read(path)?;
        let rd_col = pick(&table, &["Rd_star", "Rd_star_kpc"]).unwrap_or("Rd_star");
        table.require(&["name", rd_col])?;

        let names = table.strings("name")?;
        let rd: Vec<f64> = table
            .strings(rd_col)?
            .into_iter()
            .map(|s| parse_f64(s).unwrap_or(f64::NAN))
            .collect();
        let mstar = optional_column(&table, &["Mstar", "Mstar_Msun"], 0.0)?;
        let hz_star = optional_column(&table, &["hz_star", "hz_star_kpc"], DEFAULT_HZ_STAR)?;
        let rd_gas = optional_column(&table, &["Rd_gas", "Rd_gas_kpc"], 0.0)?;
        let mgas = optional_column(&table, &["Mgas", "Mgas_Msun"], 0.0)?;
        let hz_gas = optional_column(&table, &["hz_gas", "hz_gas_kpc"], DEFAULT_HZ_GAS)?;

        let records = (0..table.len())
            .map(|i| GalaxyRecord {
                name: names[i].to_string(),
                rd_star: rd[i],
                mstar: mstar[i],
                hz_star: hz_star[i],
                rd_gas: rd_gas[i],
                mgas: mgas[i],
                hz_gas: hz_gas[i],
            })
            .collect();

        Ok(Self {
            source: table.file,
            records,
        })
    }

    /// All rows in file order.
    pub fn records(&self) -> &[GalaxyRecord] {
        &self.records
    }

    /// Row for `name`, exact match first.
    pub fn find(&self, name: &str) -> Result<&GalaxyRecord> {
        self.records
            .iter()
            .find(|g| g.name == name)
            .or_else(|| {
                self.records
                    .iter()
                    .find(|g| g.name.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| PipelineError::GalaxyNotFound {
                name: name.to_string(),
                table: self.source.clone(),
            })
    }

    /// Stellar disk scale length of `name`, which must be positive.
    pub fn rd_star(&self, name: &str) -> Result<f64> {
        let g = self.find(name)?;
        if g.rd_star.is_finite() && g.rd_star > 0.0 {
            Ok(g.rd_star)
        } else {
            Err(PipelineError::InvalidParameter(format!(
                "invalid Rd_star for '{name}': {}",
                g.rd_star
            )))
        }
    }
}

// ============================================================================
// Canonical Parameters
// ============================================================================

/// Canonical baseline parameters of one galaxy.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalParams {
    /// Galaxy name as spelled in the parameter file.
    pub name: String,

    /// Canonical kernel scale L0 in kpc.
    pub l: f64,

    /// Kernel coupling.
    pub mu: f64,

    /// Kernel shape name.
    pub kernel: Option<String>,

    /// Median absolute fractional error of the baseline fit.
    pub mafe: Option<f64>,
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Canonical parameters of every galaxy.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamsFile {
    source: String,
    entries: serde_json::Map<String, Value>,
}

impl ParamsFile {
    /// Read `all_galaxy_params.json`.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::MissingFile {
                label: "canonical parameter file",
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).at(path)?;
        let value: Value = serde_json::from_str(&text).at(path)?;
        let entries = match value {
            Value::Object(map) => map,
            _ => {
                return Err(PipelineError::Parse {
                    file: path.display().to_string(),
                    line: 1,
                    message: "expected an object keyed by galaxy name".to_string(),
                })
            }
        };
        Ok(Self {
            source: path.display().to_string(),
            entries,
        })
    }

    /// Galaxy names in the file.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Parameters of `name`; `L` and `mu` are required.
    pub fn get(&self, name: &str) -> Result<CanonicalParams> {
        let (key, entry) = self
            .entries
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
            })
            .ok_or_else(|| PipelineError::GalaxyNotFound {
                name: name.to_string(),
                table: self.source.clone(),
            })?;

        let field = |f: &str| entry.get(f).and_then(as_f64);
        let (l, mu) = match (field("L"), field("mu")) {
            (Some(l), Some(mu)) => (l, mu),
            _ => {
                return Err(PipelineError::InvalidParameter(format!(
                    "{key}: missing 'L' or 'mu' in {}",
                    self.source
                )))
            }
        };

        Ok(CanonicalParams {
            name: key.clone(),
            l,
            mu,
            kernel: entry
                .get("kernel")
                .and_then(Value::as_str)
                .map(str::to_string),
            mafe: field("mafe"),
        })
    }
}

// ============================================================================
// Observed Rotation Curve
// ============================================================================

/// Observed rotation curve.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedCurve {
    /// Radii in kpc.
    pub r: Vec<f64>,

    /// Observed velocity in km/s.
    pub v: Vec<f64>,

    /// Velocity uncertainty in km/s (NaN when the file has no third column).
    pub v_err: Vec<f64>,
}

impl ObservedCurve {
    /// Parse a whitespace-separated `rotmod` file.
    ///
    /// Comment lines (`#`) and lines whose first two fields are not numbers
    /// are skipped. Only points with `r >= 0` and `v > 0` are kept.
    pub fn parse(text: &str) -> Self {
        let mut r = Vec::new();
        let mut v = Vec::new();
        let mut e = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace().map(str::parse::<f64>);
            let (ri, vi) = match (parts.next(), parts.next()) {
                (Some(Ok(ri)), Some(Ok(vi))) => (ri, vi),
                _ => continue,
            };
            let ei = match parts.next() {
                Some(Ok(ei)) => ei,
                _ => f64::NAN,
            };
            if ri.is_finite() && vi.is_finite() && ri >= 0.0 && vi > 0.0 {
                r.push(ri);
                v.push(vi);
                e.push(ei);
            }
        }

        let sorted = sort_by_radius(&r, &[v.as_slice(), e.as_slice()]);
        let mut columns = sorted.columns.into_iter();
        Self {
            r: sorted.r,
            v: columns.next().unwrap_or_default(),
            v_err: columns.next().unwrap_or_default(),
        }
    }

    /// Read a `rotmod` file.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).at(path)?;
        let curve = Self::parse(&text);
        if curve.r.is_empty() {
            return Err(PipelineError::EmptyTable {
                file: path.display().to_string(),
            });
        }
        Ok(curve)
    }

    /// Load the observed curve of `name`.
    pub fn load(layout: &DataLayout, name: &str) -> Result<Self> {
        Self::read(&layout.find_rotmod(name)?)
    }

    /// Outermost observed radius.
    pub fn r_max(&self) -> f64 {
        self.r.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotmod_parse() {
        let text = "# Distance = 13.8 Mpc\n# Rad Vobs errV\n\
                    2.0 80.0 3.0\n1.0 50.0 2.5\nRad Vobs\n3.0 -1.0 1.0\n4.0 95.0\n";
        let c = ObservedCurve::parse(text);
        assert_eq!(c.r, vec![1.0, 2.0, 4.0]);
        assert_eq!(c.v, vec![50.0, 80.0, 95.0]);
        assert_eq!(c.v_err[0], 2.5);
        assert!(c.v_err[2].is_nan());
    }
}
