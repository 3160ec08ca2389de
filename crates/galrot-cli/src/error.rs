//! Error types for the rotation-curve pipeline.
//!
//! ## Purpose
//!
//! This module defines [`PipelineError`], the single error type returned by
//! file loading, the baseline model, the per-galaxy phases and the fleet
//! runner. Numerical errors from the core crate are wrapped unchanged.
//!
//! ## Design notes
//!
//! * **Path context**: I/O and JSON failures carry the offending path.
//! * **Domain variants**: Missing files, missing columns and unknown galaxies
//!   are distinct variants so that the fleet runner can classify failures.
//!
//! ## Non-goals
//!
//! * This module does not log; callers decide how failures are reported.

// External dependencies
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Export dependencies from galrot crate
use galrot::prelude::GalrotError;

/// Errors produced by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A JSON document could not be parsed or written.
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Numerical error from the core crate.
    #[error(transparent)]
    Core(#[from] GalrotError),

    /// A required input file does not exist.
    #[error("{label} not found: {path}")]
    MissingFile { label: &'static str, path: PathBuf },

    /// A table lacks required columns.
    #[error("{file}: missing columns {missing:?}; found {found:?}")]
    MissingColumns {
        file: String,
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// A galaxy is absent from a lookup table.
    #[error("galaxy '{name}' not found in {table}")]
    GalaxyNotFound { name: String, table: String },

    /// A value could not be parsed.
    #[error("{file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    /// A table has a header but no rows.
    #[error("{file}: file has zero rows")]
    EmptyTable { file: String },

    /// Two radius grids that must agree do not.
    #[error("radii mismatch: {context} (n={got} vs n={expected})")]
    RadiiMismatch {
        context: String,
        got: usize,
        expected: usize,
    },

    /// The baseline model could not produce a curve.
    #[error("model error: {0}")]
    Model(String),

    /// A configuration or command-line value is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Rendering a chart failed.
    #[error("plot error: {0}")]
    Plot(String),
}

/// Result alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Attach a path to I/O and JSON failures.
pub trait PathContext<T> {
    /// Convert the error into a [`PipelineError`] naming `path`.
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> PathContext<T> for std::result::Result<T, io::Error> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl<T> PathContext<T> for std::result::Result<T, serde_json::Error> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| PipelineError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fail with [`PipelineError::MissingFile`] unless `path` exists.
pub fn require_exists(path: &Path, label: &'static str) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(PipelineError::MissingFile {
            label,
            path: path.to_path_buf(),
        })
    }
}
