//! Fleet runner.
//!
//! ## Purpose
//!
//! Runs phase 3, phase 4, Test 2 and Test 3 over many galaxies in one
//! process and collects one [`FleetRecord`] per galaxy.
//!
//! ## Design notes
//!
//! * **Isolation**: A failing galaxy is recorded with its status and the run
//!   moves on.
//! * **Optional tests**: A failed Test 2 or Test 3 leaves its fields empty;
//!   the status stays `OK`.
//!
//! ## Invariants
//!
//! * Records appear in the order the galaxies were given.

// External dependencies
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use tracing::{error, info, warn};

// Export dependencies from galrot crate
use galrot::prelude::LeffSummary;

// Internal dependencies
use crate::config::PipelineConfig;
use crate::error::{PathContext, Result};
use crate::io::table::fmt_f64;
use crate::io::TableWriter;
use crate::pipeline::Pipeline;

/// Outcome class of one galaxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FleetStatus {
    Ok,
    MissingPrerequisites,
    FailedPhase3,
    FailedPhase4,
}

impl fmt::Display for FleetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::MissingPrerequisites => "MISSING_PREREQUISITES",
            Self::FailedPhase3 => "FAILED_PHASE3",
            Self::FailedPhase4 => "FAILED_PHASE4",
        })
    }
}

/// Fleet results of one galaxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetRecord {
    pub galaxy: String,
    pub status: FleetStatus,
    pub test1_pass: Option<bool>,
    pub test2_r: Option<f64>,
    #[serde(rename = "test2_N")]
    pub test2_n: Option<usize>,
    #[serde(rename = "test2_max_dV_kms")]
    pub test2_max_dv_kms: Option<f64>,
    pub test3_sigma_base_dex: Option<f64>,
    pub test3_sigma_adaptive_dex: Option<f64>,
    pub test3_delta_sigma_dex: Option<f64>,
    #[serde(rename = "mean_L_eff_kpc")]
    pub mean_l_eff_kpc: Option<f64>,
    #[serde(rename = "min_L_eff_kpc")]
    pub min_l_eff_kpc: Option<f64>,
    #[serde(rename = "max_L_eff_kpc")]
    pub max_l_eff_kpc: Option<f64>,
    #[serde(rename = "L_eff_at_Rmax_kpc")]
    pub l_eff_at_rmax_kpc: Option<f64>,
}

const FLEET_COLUMNS: [&str; 13] = [
    "galaxy",
    "status",
    "test1_pass",
    "test2_r",
    "test2_N",
    "test2_max_dV_kms",
    "test3_sigma_base_dex",
    "test3_sigma_adaptive_dex",
    "test3_delta_sigma_dex",
    "mean_L_eff_kpc",
    "min_L_eff_kpc",
    "max_L_eff_kpc",
    "L_eff_at_Rmax_kpc",
];

impl FleetRecord {
    /// Record with only a name and a status.
    pub fn empty(galaxy: &str, status: FleetStatus) -> Self {
        Self {
            galaxy: galaxy.to_string(),
            status,
            test1_pass: None,
            test2_r: None,
            test2_n: None,
            test2_max_dv_kms: None,
            test3_sigma_base_dex: None,
            test3_sigma_adaptive_dex: None,
            test3_delta_sigma_dex: None,
            mean_l_eff_kpc: None,
            min_l_eff_kpc: None,
            max_l_eff_kpc: None,
            l_eff_at_rmax_kpc: None,
        }
    }

    fn row(&self) -> Vec<String> {
        let num = |v: Option<f64>| v.map(fmt_f64).unwrap_or_default();
        vec![
            self.galaxy.clone(),
            self.status.to_string(),
            self.test1_pass.map(|b| b.to_string()).unwrap_or_default(),
            num(self.test2_r),
            self.test2_n.map(|n| n.to_string()).unwrap_or_default(),
            num(self.test2_max_dv_kms),
            num(self.test3_sigma_base_dex),
            num(self.test3_sigma_adaptive_dex),
            num(self.test3_delta_sigma_dex),
            num(self.mean_l_eff_kpc),
            num(self.min_l_eff_kpc),
            num(self.max_l_eff_kpc),
            num(self.l_eff_at_rmax_kpc),
        ]
    }
}

/// Which galaxies a fleet run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// These names, in this order.
    Names(Vec<String>),

    /// Every galaxy with an observed curve.
    All,
}

/// Runs the per-galaxy phases over a fleet.
#[derive(Debug)]
pub struct FleetRunner {
    pipeline: Pipeline,
}

impl FleetRunner {
    /// Runner using the fleet overrides of `config`.
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(config.for_fleet())?,
        })
    }

    /// Pipeline the runner drives.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Galaxy names for `selection`.
    pub fn galaxies(&self, selection: &Selection) -> Result<Vec<String>> {
        match selection {
            Selection::Names(names) => Ok(names.clone()),
            Selection::All => self.pipeline.layout().list_observed(),
        }
    }

    /// Input files of `name` that are absent.
    fn missing_inputs(&self, name: &str) -> Vec<String> {
        let layout = self.pipeline.layout();
        let mut missing = Vec::new();
        if layout.find_rotmod(name).is_err() {
            missing.push(layout.rotmod_file(name).display().to_string());
        }
        if layout.find_baseline(name).is_err() {
            missing.push(layout.baseline_file(name).display().to_string());
        }
        missing
    }

    /// Run every phase for one galaxy.
    pub fn run_one(&self, name: &str) -> FleetRecord {
        let missing = self.missing_inputs(name);
        if !missing.is_empty() {
            warn!(galaxy = name, ?missing, "skipped: missing prerequisites");
            return FleetRecord::empty(name, FleetStatus::MissingPrerequisites);
        }

        let phase3 = match self.pipeline.phase3(name) {
            Ok(o) => o,
            Err(e) => {
                error!(galaxy = name, error = %e, "phase 3 failed");
                return FleetRecord::empty(name, FleetStatus::FailedPhase3);
            }
        };
        let phase4 = match self.pipeline.phase4(name) {
            Ok(o) => o,
            Err(e) => {
                error!(galaxy = name, error = %e, "phase 4 failed");
                return FleetRecord::empty(name, FleetStatus::FailedPhase4);
            }
        };

        let mut record = FleetRecord::empty(&phase3.galaxy, FleetStatus::Ok);
        record.test1_pass = Some(phase4.result.stability.pass);

        if let Some(s) = LeffSummary::from_profile(&phase3.result.profile.l_eff) {
            let s = s.rounded();
            record.mean_l_eff_kpc = Some(s.mean);
            record.min_l_eff_kpc = Some(s.min);
            record.max_l_eff_kpc = Some(s.max);
            record.l_eff_at_rmax_kpc = Some(s.at_rmax);
        }

        match self.pipeline.test2(name) {
            Ok(t) => {
                record.test2_r = Some(t.r);
                record.test2_n = Some(t.n);
                record.test2_max_dv_kms = Some(t.max_abs_dv);
            }
            Err(e) => warn!(galaxy = name, error = %e, "test 2 unavailable"),
        }
        match self.pipeline.test3(name) {
            Ok(t) => {
                record.test3_sigma_base_dex = Some(t.sigma_baseline);
                record.test3_sigma_adaptive_dex = Some(t.sigma_adaptive);
                record.test3_delta_sigma_dex = Some(t.delta_sigma);
            }
            Err(e) => warn!(galaxy = name, error = %e, "test 3 unavailable"),
        }
        record
    }

    /// Run the fleet and write the CSV and JSON summaries.
    pub fn run(&self, selection: &Selection) -> Result<Vec<FleetRecord>> {
        let galaxies = self.galaxies(selection)?;
        let cfg = self.pipeline.config();
        info!(
            galaxies = galaxies.len(),
            alpha = cfg.leff.alpha,
            sigma_idx = cfg.leff.sigma_idx,
            taper = cfg.leff.taper,
            "fleet run"
        );

        let mut records = Vec::with_capacity(galaxies.len());
        for (i, name) in galaxies.iter().enumerate() {
            info!(galaxy = %name, "[{}/{}]", i + 1, galaxies.len());
            records.push(self.run_one(name));
        }

        self.write(&records)?;
        log_summary(&records);
        Ok(records)
    }

    fn write(&self, records: &[FleetRecord]) -> Result<()> {
        let layout = self.pipeline.layout();
        let mut w = TableWriter::new(&FLEET_COLUMNS);
        for r in records {
            w.push(r.row());
        }
        w.write(&layout.fleet_csv())?;

        let json_path = layout.fleet_json();
        let text = serde_json::to_string_pretty(records).at(&json_path)?;
        fs::write(&json_path, text).at(&json_path)?;
        info!(
            csv = %layout.fleet_csv().display(),
            json = %json_path.display(),
            "fleet summary written"
        );
        Ok(())
    }
}

fn log_summary(records: &[FleetRecord]) {
    let ok = records
        .iter()
        .filter(|r| r.status == FleetStatus::Ok)
        .count();
    info!(
        total = records.len(),
        successful = ok,
        failed = records.len() - ok,
        "fleet summary"
    );
    for r in records {
        let cell = |v: Option<f64>| v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "-".to_string());
        info!(
            "{:<14} {:<22} test2_r={:>8} test3_delta={:>8}",
            r.galaxy,
            r.status.to_string(),
            cell(r.test2_r),
            cell(r.test3_delta_sigma_dex)
        );
    }
}
