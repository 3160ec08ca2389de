//! File input and output.
//!
//! ## Purpose
//!
//! This module reads the per-galaxy inputs (baseline decompositions, the
//! structure table, canonical parameters, observed curves) and reads and
//! writes the tables the phases exchange.
//!
//! ## Key concepts
//!
//! * **Layout**: [`DataLayout`] maps galaxy names to paths under the data root.
//! * **Tables**: [`Table`] gives header-driven access to CSV columns.

pub mod derived;
pub mod galaxy;
pub mod layout;
pub mod table;

pub use derived::{
    write_adaptive_table, write_chi_table, write_leff_table, AdaptiveMeta, AdaptiveTable,
    BasisCurve, LeffMeta, LeffTable,
};
pub use galaxy::{
    BaselineDecomposition, CanonicalParams, GalaxyRecord, GalaxyTable, ObservedCurve, ParamsFile,
};
pub use layout::{basis_tag, DataLayout};
pub use table::{Table, TableWriter};
