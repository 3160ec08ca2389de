//! Tables written by one phase and read by the next.
//!
//! ## Purpose
//!
//! Phase 3 writes the χ and L_eff tables, basis generation writes one
//! decomposition per scale, and phase 4 writes the adaptive decomposition.
//! This module owns their column layouts.
//!
//! ## Design notes
//!
//! * **Broadcast metadata**: Scalars such as `L0_kpc` and `kernel` are
//!   repeated on every row so that each table is self-describing.
//! * **Sorted on read**: Tables are re-sorted by radius when read.
//!
//! ## Non-goals
//!
//! * Fleet and RAR tables are written by their own modules.

// External dependencies
use std::path::Path;

// Export dependencies from galrot crate
use galrot::numerics::sort_by_radius;
use galrot::prelude::{AdaptiveResult, LeffResult};

// Internal dependencies
use crate::error::{PipelineError, Result};
use crate::io::table::{fmt_f64, parse_flag, Table, TableWriter};

fn flag(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

/// Sort a radius column and companions read from a table.
fn sorted(r: Vec<f64>, columns: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let refs: Vec<&[f64]> = columns.iter().map(Vec::as_slice).collect();
    let s = sort_by_radius(&r, &refs);
    (s.r, s.columns)
}

// ============================================================================
// χ Table
// ============================================================================

/// Write `chi_<NAME>.csv`.
pub fn write_chi_table(path: &Path, galaxy: &str, result: &LeffResult<f64>) -> Result<()> {
    let raw = &result.chi.raw;
    let smooth = result.chi.smooth.as_ref();

    let mut headers = vec!["galaxy", "R_kpc", "g_bar_raw", "dgdr_raw", "chi_raw"];
    if smooth.is_some() {
        headers.extend(["g_bar_smooth", "dgdr_smooth", "chi_smooth"]);
    }

    let mut w = TableWriter::new(&headers);
    for j in 0..raw.r.len() {
        let mut row = vec![
            galaxy.to_string(),
            fmt_f64(raw.r[j]),
            fmt_f64(raw.g_bar[j]),
            fmt_f64(raw.dgdr[j]),
            fmt_f64(raw.chi[j]),
        ];
        if let Some(s) = smooth {
            row.extend([fmt_f64(s.g_bar[j]), fmt_f64(s.dgdr[j]), fmt_f64(s.chi[j])]);
        }
        w.push(row);
    }
    w.write(path)
}

// ============================================================================
// L_eff Table
// ============================================================================

/// Scalars recorded next to an L_eff profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LeffMeta {
    /// Galaxy name.
    pub galaxy: String,

    /// Baseline kernel coupling.
    pub mu: f64,

    /// Baseline kernel shape.
    pub kernel: String,

    /// Configured taper midpoint, recorded whether or not the taper is on.
    pub taper_r0: f64,

    /// Configured taper steepness.
    pub taper_k: f64,
}

const LEFF_COLUMNS: [&str; 18] = [
    "R_kpc",
    "r_frac",
    "chi_raw",
    "chi_smooth",
    "chi_used",
    "mask_outer",
    "L_adapt_kpc",
    "L_eff_kpc",
    "galaxy",
    "L0_kpc",
    "alpha",
    "sigma_idx",
    "taper_on",
    "taper_r0",
    "taper_k",
    "mu",
    "kernel",
    "Rd_star_kpc",
];

/// Write `leff_<NAME>.csv`.
pub fn write_leff_table(path: &Path, meta: &LeffMeta, result: &LeffResult<f64>) -> Result<()> {
    let p = &result.profile;
    let cfg = &result.config;
    let (taper_on, r0, k) = match cfg.taper {
        Some(t) => (true, t.r0, t.k),
        None => (false, meta.taper_r0, meta.taper_k),
    };

    let mut w = TableWriter::new(&LEFF_COLUMNS);
    for j in 0..p.r.len() {
        w.push(vec![
            fmt_f64(p.r[j]),
            fmt_f64(p.r_frac[j]),
            fmt_f64(p.chi_raw[j]),
            fmt_f64(p.chi_smooth[j]),
            fmt_f64(p.chi_used[j]),
            fmt_f64(p.mask[j]),
            fmt_f64(p.l_adapt[j]),
            fmt_f64(p.l_eff[j]),
            meta.galaxy.clone(),
            fmt_f64(p.l0),
            fmt_f64(cfg.alpha),
            fmt_f64(cfg.sigma_idx),
            flag(taper_on),
            fmt_f64(r0),
            fmt_f64(k),
            fmt_f64(meta.mu),
            meta.kernel.clone(),
            fmt_f64(result.rd_star),
        ]);
    }
    w.write(path)
}

/// An L_eff table read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct LeffTable {
    /// Radii in kpc.
    pub r: Vec<f64>,

    /// Effective scale in kpc.
    pub l_eff: Vec<f64>,

    /// χ that drove L_eff (`chi_used`, else `chi_raw`), when present.
    pub chi: Option<Vec<f64>>,

    /// Canonical scale.
    pub l0: f64,

    /// Baseline kernel coupling.
    pub mu: f64,

    /// Baseline kernel shape.
    pub kernel: String,
}

impl LeffTable {
    /// Read `leff_<NAME>.csv`.
    pub fn read(path: &Path) -> Result<Self> {
        let table = Table::read(path)?;
        table.require(&["R_kpc", "L_eff_kpc", "L0_kpc", "mu", "kernel"])?;
        table.require_rows()?;

        let chi_col = ["chi_used", "chi_raw"].into_iter().find(|c| table.has(c));
        let mut columns = vec![table.floats("L_eff_kpc")?];
        if let Some(c) = chi_col {
            columns.push(table.floats(c)?);
        }
        let (r, mut columns) = sorted(table.floats("R_kpc")?, columns);
        let chi = if chi_col.is_some() { columns.pop() } else { None };
        let l_eff = columns.pop().unwrap_or_default();

        Ok(Self {
            r,
            l_eff,
            chi,
            l0: table.first_f64("L0_kpc")?,
            mu: table.first_f64("mu")?,
            kernel: table.first_str("kernel")?.to_string(),
        })
    }

    /// The χ column, or an error naming the file.
    pub fn require_chi(&self, path: &Path) -> Result<&[f64]> {
        self.chi
            .as_deref()
            .ok_or_else(|| PipelineError::MissingColumns {
                file: path.display().to_string(),
                missing: vec!["chi_used".to_string()],
                found: Vec::new(),
            })
    }
}

// ============================================================================
// Basis Curve
// ============================================================================

/// Decomposition at one kernel scale.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisCurve {
    /// Radii in kpc.
    pub r: Vec<f64>,

    /// Baryonic velocity in km/s.
    pub v_baryon: Vec<f64>,

    /// Kernel velocity in km/s.
    pub v_kernel: Vec<f64>,

    /// Total velocity in km/s.
    pub v_total: Vec<f64>,
}

impl BasisCurve {
    /// Write `rc_decomp_<NAME>_L<tag>.csv`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut w = TableWriter::new(&["R_kpc", "V_baryon", "V_kernel", "V_total"]);
        for j in 0..self.r.len() {
            w.push(vec![
                fmt_f64(self.r[j]),
                fmt_f64(self.v_baryon[j]),
                fmt_f64(self.v_kernel[j]),
                fmt_f64(self.v_total[j]),
            ]);
        }
        w.write(path)
    }

    /// Read a basis decomposition; only `R_kpc` and `V_total` are required.
    pub fn read(path: &Path) -> Result<Self> {
        let table = Table::read(path)?;
        table.require(&["R_kpc", "V_total"])?;
        table.require_rows()?;

        let n = table.len();
        let optional = |name: &str| -> Result<Vec<f64>> {
            if table.has(name) {
                table.floats(name)
            } else {
                Ok(vec![f64::NAN; n])
            }
        };
        let columns = vec![
            optional("V_baryon")?,
            optional("V_kernel")?,
            table.floats("V_total")?,
        ];
        let (r, columns) = sorted(table.floats("R_kpc")?, columns);
        let mut it = columns.into_iter();
        Ok(Self {
            r,
            v_baryon: it.next().unwrap_or_default(),
            v_kernel: it.next().unwrap_or_default(),
            v_total: it.next().unwrap_or_default(),
        })
    }
}

// ============================================================================
// Adaptive Table
// ============================================================================

/// Scalars recorded next to an adaptive decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveMeta {
    /// Galaxy name.
    pub galaxy: String,

    /// Canonical scale.
    pub l0: f64,

    /// Baseline kernel coupling.
    pub mu: f64,

    /// Baseline kernel shape.
    pub kernel: String,

    /// Whether basis grids had to match exactly.
    pub strict_radii: bool,
}

const ADAPTIVE_COLUMNS: [&str; 17] = [
    "R_kpc",
    "V_baryon",
    "V_total_base",
    "V_total_adaptive",
    "dV_adaptive_minus_base",
    "L_eff_kpc",
    "galaxy",
    "L0_kpc",
    "mu",
    "kernel",
    "basis_L_min_kpc",
    "basis_L_max_kpc",
    "outer_rfrac",
    "outer_tol_kms",
    "outer_max_abs_dV_kms",
    "outer_pass",
    "strict_radii",
];

/// Write `rc_decomp_<NAME>_adaptive.csv`.
pub fn write_adaptive_table(
    path: &Path,
    meta: &AdaptiveMeta,
    v_baryon: &[f64],
    result: &AdaptiveResult<f64>,
) -> Result<()> {
    let c = &result.curve;
    let mut w = TableWriter::new(&ADAPTIVE_COLUMNS);
    for j in 0..c.r.len() {
        w.push(vec![
            fmt_f64(c.r[j]),
            fmt_f64(v_baryon[j]),
            fmt_f64(result.v_baseline[j]),
            fmt_f64(c.v_adaptive[j]),
            fmt_f64(result.dv[j]),
            fmt_f64(c.l_eff[j]),
            meta.galaxy.clone(),
            fmt_f64(meta.l0),
            fmt_f64(meta.mu),
            meta.kernel.clone(),
            fmt_f64(result.basis_range.0),
            fmt_f64(result.basis_range.1),
            fmt_f64(result.gate.rfrac_outer),
            fmt_f64(result.gate.tol_kms),
            fmt_f64(result.stability.max_abs_dv),
            flag(result.stability.pass),
            flag(meta.strict_radii),
        ]);
    }
    w.write(path)
}

/// An adaptive decomposition read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveTable {
    /// Radii in kpc.
    pub r: Vec<f64>,

    /// Baryonic velocity (NaN when absent).
    pub v_baryon: Vec<f64>,

    /// Baseline total velocity.
    pub v_baseline: Vec<f64>,

    /// Adaptive total velocity.
    pub v_adaptive: Vec<f64>,

    /// Effective scale (NaN when absent).
    pub l_eff: Vec<f64>,

    /// Outer gate outcome, when recorded.
    pub outer_pass: Option<bool>,
}

impl AdaptiveTable {
    /// Read `rc_decomp_<NAME>_adaptive.csv`.
    pub fn read(path: &Path) -> Result<Self> {
        let table = Table::read(path)?;
        table.require(&["R_kpc", "V_total_base", "V_total_adaptive"])?;
        table.require_rows()?;

        let n = table.len();
        let optional = |name: &str| -> Result<Vec<f64>> {
            if table.has(name) {
                table.floats(name)
            } else {
                Ok(vec![f64::NAN; n])
            }
        };
        let columns = vec![
            optional("V_baryon")?,
            table.floats("V_total_base")?,
            table.floats("V_total_adaptive")?,
            optional("L_eff_kpc")?,
        ];
        let outer_pass = if table.has("outer_pass") {
            parse_flag(table.first_str("outer_pass")?)
        } else {
            None
        };

        let (r, columns) = sorted(table.floats("R_kpc")?, columns);
        let mut it = columns.into_iter();
        Ok(Self {
            r,
            v_baryon: it.next().unwrap_or_default(),
            v_baseline: it.next().unwrap_or_default(),
            v_adaptive: it.next().unwrap_or_default(),
            l_eff: it.next().unwrap_or_default(),
            outer_pass,
        })
    }
}
