//! Azimuthal averaging of mid-plane maps.
//!
//! ## Key concepts
//!
//! * **Bins**: `nbins` equal-width annuli over `[0, 1.1 r_obs_max]`; a cell
//!   belongs to the bin with `r0 <= R < r1`, where `R` is measured from the
//!   centre of the cell (half-cell offset from the grid origin).
//! * **Gaps**: Empty bins are filled by linear interpolation over bin index
//!   from the populated ones, clamped at the ends.

// External dependencies
use ndarray::Array2;

// Export dependencies from galrot crate
use galrot::numerics::interp;

/// Outer edge of the binned range relative to the outermost observed radius.
pub const PROFILE_EXTENT: f64 = 1.1;

/// Annulus edges and centres.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialBins {
    /// `nbins + 1` increasing edges in kpc.
    pub edges: Vec<f64>,

    /// Mid-points of the bins in kpc.
    pub centres: Vec<f64>,
}

impl RadialBins {
    /// Equal-width bins over `[0, 1.1 r_obs_max]`.
    pub fn new(r_obs_max: f64, nbins: usize) -> Self {
        let nbins = nbins.max(1);
        let top = PROFILE_EXTENT * r_obs_max;
        let edges: Vec<f64> = (0..=nbins)
            .map(|i| top * i as f64 / nbins as f64)
            .collect();
        let centres = edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
        Self { edges, centres }
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.centres.len()
    }

    /// True when there are no bins.
    pub fn is_empty(&self) -> bool {
        self.centres.is_empty()
    }

    /// Bin holding `r`, if any.
    fn locate(&self, r: f64) -> Option<usize> {
        let last = *self.edges.last()?;
        if !(r >= self.edges[0] && r < last) {
            return None;
        }
        // First edge strictly above r, minus one.
        let upper = self.edges.partition_point(|&e| e <= r);
        Some(upper.saturating_sub(1).min(self.len() - 1))
    }
}

/// Mean of `map` in each annulus; `map` is indexed `[ix, iy]` with the
/// origin at cell `n / 2`.
pub fn radial_profile(map: &Array2<f64>, dx: f64, bins: &RadialBins) -> Vec<f64> {
    let nb = bins.len();
    let mut sum = vec![0.0; nb];
    let mut count = vec![0usize; nb];
    let (nx, ny) = map.dim();
    let cx = (nx / 2) as f64;
    let cy = (ny / 2) as f64;

    for ((i, j), &v) in map.indexed_iter() {
        let x = (i as f64 - cx + 0.5) * dx;
        let y = (j as f64 - cy + 0.5) * dx;
        if let Some(b) = bins.locate((x * x + y * y).sqrt()) {
            sum[b] += v;
            count[b] += 1;
        }
    }

    let profile: Vec<f64> = sum
        .iter()
        .zip(&count)
        .map(|(&s, &c)| if c > 0 { s / c as f64 } else { f64::NAN })
        .collect();
    fill_gaps(profile)
}

/// Replace non-finite entries by interpolation over index.
///
/// A profile with no finite entry is returned unchanged.
pub fn fill_gaps(mut profile: Vec<f64>) -> Vec<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = profile
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| (i as f64, v))
        .unzip();
    if xs.is_empty() || xs.len() == profile.len() {
        return profile;
    }
    for (i, v) in profile.iter_mut().enumerate() {
        if !v.is_finite() {
            *v = interp(i as f64, &xs, &ys);
        }
    }
    profile
}
