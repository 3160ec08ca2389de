//! # galrot-cli: File-driven rotation-curve pipeline
//!
//! Drives the [`galrot`] core over a directory of per-galaxy inputs:
//!
//! * **Phase 3**: χ and L_eff tables from the frozen baseline decomposition.
//! * **Basis**: baseline-model curves at fixed scales around L0, computed
//!   in-process by the FFT model in [`model`].
//! * **Phase 4**: the adaptive curve, ΔV and the outer stability gate.
//! * **Diagnostics**: the χ–ΔV correlation, the inner scatter test, the
//!   residual correlations, the RAR table and the baseline summary.
//! * **Fleet**: all of the above over many galaxies with one record each.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use galrot_cli::prelude::*;
//!
//! let config = PipelineConfig::default();
//! let pipeline = Pipeline::new(config)?;
//!
//! let phase3 = pipeline.phase3("NGC3198")?;
//! let phase4 = pipeline.phase4("NGC3198")?;
//! println!("{}", phase4.result);
//!
//! let test2 = pipeline.test2(&phase3.galaxy)?;
//! println!("r = {:.3}", test2.r);
//! # Ok::<(), PipelineError>(())
//! ```
//!
//! ## Layout
//!
//! Inputs and outputs live under one data root; see [`io::DataLayout`] for
//! the file names.

// Configuration, errors and logging.
pub mod config;
pub mod error;
pub mod logging;

// File formats and layout.
pub mod io;

// In-process baseline model.
pub mod model;

// Per-galaxy phases and the fleet runner.
pub mod basis;
pub mod fleet;
pub mod pipeline;

// Charts.
#[cfg(feature = "plot")]
pub mod plot;

/// Standard galrot-cli prelude.
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{PipelineError, Result};
    pub use crate::fleet::{FleetRecord, FleetRunner, FleetStatus, Selection};
    pub use crate::io::DataLayout;
    pub use crate::logging::{init_tracing, Verbosity};
    pub use crate::model::{GalaxyModel, KernelCache, KernelShape};
    pub use crate::pipeline::Pipeline;
}
