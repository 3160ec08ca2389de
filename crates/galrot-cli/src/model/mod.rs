//! In-process baseline model.
//!
//! ## Purpose
//!
//! This module predicts rotation curves from a galaxy's stellar and gas
//! disks plus a scale-dependent interaction kernel. The basis stage calls it
//! once per scale.
//!
//! ## Design notes
//!
//! * **Spectral solver**: Densities are sampled on a periodic cube and all
//!   potentials are solved with FFTs ([`spectral`]).
//! * **Caching**: Baryonic fields are cached per grid inside a
//!   [`GalaxyModel`]; kernel spectra are cached per scale in a
//!   [`KernelCache`] that may be shared between galaxies.
//!
//! ## Non-goals
//!
//! * No parameter search; `(L, μ)` come from the canonical parameter file.

pub mod baseline;
pub mod density;
pub mod grid;
pub mod kernels;
pub mod profile;
pub mod spectral;

pub use baseline::{BaselineCurve, GalaxyModel};
pub use density::{DiskComponent, G_NEWTON};
pub use grid::Grid;
pub use kernels::{KernelCache, KernelShape};
