//! Baryonic mass density on the grid.
//!
//! ## Key concepts
//!
//! * **Disk component**: `ρ(R, z) = M / (4π Rd² hz) · exp(−R/Rd) · sech²(|z|/hz)`
//!   with cylindrical radius `R`. The vertical factor is cut to zero where
//!   `|z|/hz ≥ 20`.
//! * **Two components**: A stellar disk and a gas disk; the gas mass is
//!   scaled for helium.
//!
//! ## Invariants
//!
//! * A component with non-positive mass or scale length contributes zero.
//! * The scale height is floored at 1e-3 kpc.

// External dependencies
use ndarray::{Array3, Zip};
use std::f64::consts::PI;

// Internal dependencies
use crate::io::GalaxyRecord;
use crate::model::grid::Grid;

/// Gravitational constant in kpc (km/s)² / M☉.
pub const G_NEWTON: f64 = 4.30091e-6;

/// Floor on the scale height in kpc.
pub const MIN_SCALE_HEIGHT: f64 = 1e-3;

/// Beyond this many scale heights the vertical profile is zero.
pub const VERTICAL_CUTOFF: f64 = 20.0;

/// Gas scale length relative to the stellar one when not listed.
pub const GAS_TO_STAR_SCALE: f64 = 1.8;

/// One exponential disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiskComponent {
    /// Mass in M☉.
    pub mass: f64,

    /// Radial scale length in kpc.
    pub rd: f64,

    /// Vertical scale height in kpc.
    pub hz: f64,
}

impl DiskComponent {
    /// Stellar disk of a galaxy.
    pub fn stars(g: &GalaxyRecord) -> Self {
        Self {
            mass: g.mstar,
            rd: g.rd_star,
            hz: g.hz_star,
        }
    }

    /// Gas disk of a galaxy, with the mass scaled by `helium_factor`.
    ///
    /// A missing gas scale length defaults to 1.8 stellar scale lengths
    /// (1.8 kpc when the stellar one is missing too).
    pub fn gas(g: &GalaxyRecord, helium_factor: f64) -> Self {
        let rd = if g.rd_gas > 0.0 {
            g.rd_gas
        } else if g.rd_star > 0.0 {
            GAS_TO_STAR_SCALE * g.rd_star
        } else {
            GAS_TO_STAR_SCALE
        };
        Self {
            mass: g.mgas * helium_factor,
            rd,
            hz: g.hz_gas,
        }
    }

    /// True when the component contributes no mass.
    pub fn is_empty(&self) -> bool {
        !(self.mass > 0.0 && self.rd > 0.0)
    }

    /// Density at cylindrical radius `r_cyl` and height `z`.
    #[inline]
    pub fn density(&self, r_cyl: f64, z: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let hz = self.hz.max(MIN_SCALE_HEIGHT);
        let zs = (z / hz).abs();
        if zs >= VERTICAL_CUTOFF {
            return 0.0;
        }
        let sech = 1.0 / zs.cosh();
        let rho0 = self.mass / (4.0 * PI * self.rd * self.rd * hz);
        rho0 * (-r_cyl / self.rd).exp() * sech * sech
    }
}

/// Sample a disk component on the grid.
pub fn disk_density(grid: &Grid, disk: &DiskComponent) -> Array3<f64> {
    let n = grid.n;
    let mut rho = Array3::<f64>::zeros((n, n, n));
    if disk.is_empty() {
        return rho;
    }

    let fill = |(i, j, k): (usize, usize, usize), v: &mut f64| {
        let (x, y, z) = (grid.coord(i), grid.coord(j), grid.coord(k));
        *v = disk.density((x * x + y * y).sqrt(), z);
    };

    #[cfg(feature = "cpu")]
    Zip::indexed(&mut rho).par_for_each(fill);

    #[cfg(not(feature = "cpu"))]
    Zip::indexed(&mut rho).for_each(fill);

    rho
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> GalaxyRecord {
        GalaxyRecord {
            name: "G".to_string(),
            rd_star: 2.0,
            mstar: 1e10,
            hz_star: 0.3,
            rd_gas: 0.0,
            mgas: 1e9,
            hz_gas: 0.15,
        }
    }

    #[test]
    fn test_gas_defaults() {
        let gas = DiskComponent::gas(&record(), 1.33);
        assert_eq!(gas.rd, 3.6);
        assert!((gas.mass - 1.33e9).abs() < 1.0);
    }

    #[test]
    fn test_density_shape() {
        let s = DiskComponent::stars(&record());
        let centre = s.density(0.0, 0.0);
        assert!(centre > 0.0);
        assert!(s.density(2.0, 0.0) < centre);
        assert_eq!(s.density(0.0, 6.0), 0.0);
        assert_eq!(DiskComponent { mass: 0.0, rd: 1.0, hz: 1.0 }.density(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_total_mass_on_grid() {
        // Thick enough to be resolved by 1 kpc cells.
        let disk = DiskComponent {
            mass: 1e10,
            rd: 3.0,
            hz: 1.0,
        };
        let grid = Grid::new(32.0, 64);
        let rho = disk_density(&grid, &disk);
        let m = rho.sum() * grid.cell_volume();
        assert!((m / disk.mass - 1.0).abs() < 0.05, "mass ratio {}", m / disk.mass);
    }

    #[test]
    fn test_grid_fill_matches_pointwise() {
        let disk = DiskComponent::stars(&record());
        let grid = Grid::new(8.0, 16);
        let rho = disk_density(&grid, &disk);
        for &(i, j, k) in &[(0, 0, 0), (3, 9, 8), (8, 8, 8), (15, 2, 7)] {
            let (x, y, z) = (grid.coord(i), grid.coord(j), grid.coord(k));
            let expected = disk.density((x * x + y * y).sqrt(), z);
            assert_eq!(rho[[i, j, k]], expected);
        }
    }
}
