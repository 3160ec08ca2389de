//! PNG charts of the per-galaxy outputs.
//!
//! ## Purpose
//!
//! Renders the rotation curves, the velocity change, the L_eff profile and
//! the χ profile with `plotters` on a bitmap backend.
//!
//! ## Design notes
//!
//! * **One helper**: Every chart is a list of [`Series`] drawn by
//!   [`xy_chart`]; the public functions only pick the series.
//! * **Axis ranges**: Taken from the finite values of all series, padded by 5%.
//!
//! ## Non-goals
//!
//! * No interactive output.

// External dependencies
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::path::Path;

// Internal dependencies
use crate::error::{PathContext, PipelineError, Result};
use crate::io::ObservedCurve;

const SIZE: (u32, u32) = (900, 620);

const BLUE: RGBColor = RGBColor(0, 102, 204);
const ORANGE: RGBColor = RGBColor(204, 102, 0);
const GREEN: RGBColor = RGBColor(34, 139, 34);
const GREY: RGBColor = RGBColor(90, 90, 90);
const DARK: RGBColor = RGBColor(30, 30, 30);

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Line,
    Points,
}

/// One labelled data series.
#[derive(Debug, Clone, Copy)]
pub struct Series<'a> {
    pub label: &'a str,
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub color: RGBColor,
    pub mark: Mark,
}

impl<'a> Series<'a> {
    pub fn line(label: &'a str, x: &'a [f64], y: &'a [f64], color: RGBColor) -> Self {
        Self {
            label,
            x,
            y,
            color,
            mark: Mark::Line,
        }
    }

    pub fn points(label: &'a str, x: &'a [f64], y: &'a [f64], color: RGBColor) -> Self {
        Self {
            label,
            x,
            y,
            color,
            mark: Mark::Points,
        }
    }

    fn finite(&self) -> impl Iterator<Item = (f64, f64)> + 'a {
        self.x
            .iter()
            .zip(self.y)
            .map(|(&x, &y)| (x, y))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    }
}

/// Padded `[min, max]` of `values`, or `[0, 1]` when none is finite.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 { 0.05 * span } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad, hi + pad)
}

fn draw(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[Series<'_>],
) -> std::result::Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (x0, x1) = padded_range(series.iter().flat_map(|s| s.finite().map(|p| p.0)));
    let (y0, y1) = padded_range(series.iter().flat_map(|s| s.finite().map(|p| p.1)));

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(55)
        .y_label_area_size(65)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 20))
        .light_line_style(WHITE)
        .draw()?;

    for s in series {
        let color = s.color;
        match s.mark {
            Mark::Line => chart
                .draw_series(LineSeries::new(s.finite(), color.stroke_width(2)))?
                .label(s.label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color)),
            Mark::Points => chart
                .draw_series(s.finite().map(|p| Circle::new(p, 3, color.filled())))?
                .label(s.label)
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled())),
        };
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Render `series` to a PNG at `path`.
pub fn xy_chart(
    path: &Path,
    title: &str,
    x_desc: &str,
    y_desc: &str,
    series: &[Series<'_>],
) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).at(dir)?;
    }
    draw(path, title, x_desc, y_desc, series)
        .map_err(|e| PipelineError::Plot(format!("{}: {e}", path.display())))
}

// ============================================================================
// Charts
// ============================================================================

/// Curves going into a rotation-curve chart.
#[derive(Debug, Clone, Copy)]
pub struct RotationCurves<'a> {
    pub r: &'a [f64],
    pub v_baryon: &'a [f64],
    pub v_baseline: &'a [f64],
    pub v_adaptive: &'a [f64],
}

/// Baseline, adaptive and baryonic curves with the observed points.
pub fn rotation_curve(
    path: &Path,
    galaxy: &str,
    curves: &RotationCurves<'_>,
    observed: Option<&ObservedCurve>,
) -> Result<()> {
    let mut series = vec![
        Series::line("baseline", curves.r, curves.v_baseline, GREY),
        Series::line("adaptive", curves.r, curves.v_adaptive, BLUE),
        Series::line("baryons", curves.r, curves.v_baryon, GREEN),
    ];
    if let Some(obs) = observed {
        series.push(Series::points("observed", &obs.r, &obs.v, DARK));
    }
    xy_chart(
        path,
        &format!("{galaxy}: rotation curve"),
        "R [kpc]",
        "V [km/s]",
        &series,
    )
}

/// `V_adaptive − V_baseline` with a zero line.
pub fn delta_v(path: &Path, galaxy: &str, r: &[f64], dv: &[f64]) -> Result<()> {
    let zero = vec![0.0; r.len()];
    xy_chart(
        path,
        &format!("{galaxy}: adaptive minus baseline"),
        "R [kpc]",
        "ΔV [km/s]",
        &[
            Series::line("ΔV", r, dv, BLUE),
            Series::line("0", r, &zero, GREY),
        ],
    )
}

/// L_eff with the L0 reference and, when tapered, L_adapt.
pub fn leff(
    path: &Path,
    galaxy: &str,
    r: &[f64],
    l_eff: &[f64],
    l0: f64,
    l_adapt: Option<&[f64]>,
) -> Result<()> {
    let reference = vec![l0; r.len()];
    let mut series = vec![
        Series::line("L_eff", r, l_eff, BLUE),
        Series::line("L0", r, &reference, GREY),
    ];
    if let Some(la) = l_adapt {
        series.push(Series::line("L_adapt", r, la, ORANGE));
    }
    xy_chart(
        path,
        &format!("{galaxy}: effective scale"),
        "R [kpc]",
        "L [kpc]",
        &series,
    )
}

/// χ, raw and smoothed.
pub fn chi(
    path: &Path,
    galaxy: &str,
    r: &[f64],
    chi_raw: &[f64],
    chi_smooth: Option<&[f64]>,
) -> Result<()> {
    let mut series = vec![Series::line("χ raw", r, chi_raw, GREY)];
    if let Some(s) = chi_smooth {
        series.push(Series::line("χ smoothed", r, s, BLUE));
    }
    xy_chart(path, &format!("{galaxy}: stiffness"), "R [kpc]", "χ", &series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([f64::NAN]), (0.0, 1.0));
        let (lo, hi) = padded_range([0.0, 10.0, f64::INFINITY]);
        assert_eq!((lo, hi), (-0.5, 10.5));
        let (lo, hi) = padded_range([2.0, 2.0]);
        assert!(lo < 2.0 && hi > 2.0);
    }
}
