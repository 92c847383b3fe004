//! 3D surface of the recipe around the evaluation point.
use crate::Utils::config::PlotSettings;
use crate::cafe::evaluator::parse_recipe;
use crate::symbolic::symbolic_errors::ComputationError;
use crate::symbolic::utils::linspace;
use log::{info, warn};
use nalgebra::DMatrix;
use plotters::coord::Shift;
use plotters::prelude::*;
use rayon::prelude::*;
use std::collections::HashMap;
use std::error::Error;
use std::ops::Range;
use std::path::Path;

const MATCHA: RGBColor = RGBColor(168, 198, 159);
const STRAWBERRY: RGBColor = RGBColor(255, 183, 197);

/// `z[(i, j)] = f(xs[i], ys[j])`; points where f is undefined hold NaN.
#[derive(Debug, Clone)]
pub struct SurfaceGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub z: DMatrix<f64>,
}

impl SurfaceGrid {
    /// smallest and largest finite value, `None` if there is none
    pub fn z_bounds(&self) -> Option<(f64, f64)> {
        self.z
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    fn index_of(axis: &[f64], value: f64) -> usize {
        if axis.len() < 2 {
            return 0;
        }
        let step = axis[1] - axis[0];
        let i = ((value - axis[0]) / step).round();
        (i.max(0.0) as usize).min(axis.len() - 1)
    }

    /// value at the grid node nearest to `(x, y)`
    pub fn value_near(&self, x: f64, y: f64) -> f64 {
        self.z[(Self::index_of(&self.xs, x), Self::index_of(&self.ys, y))]
    }
}

/// Samples `expression` on a `samples × samples` grid centred at `center`, rows in parallel.
pub fn sample_surface(
    expression: &str,
    center: (f64, f64),
    half_range: f64,
    samples: usize,
) -> Result<SurfaceGrid, ComputationError> {
    let expr = parse_recipe(expression)?;
    let samples = samples.max(2);
    let xs = linspace(center.0 - half_range, center.0 + half_range, samples);
    let ys = linspace(center.1 - half_range, center.1 + half_range, samples);
    let rows: Vec<Vec<f64>> = xs
        .par_iter()
        .map(|&x| {
            ys.iter()
                .map(|&y| {
                    let scope =
                        HashMap::from([("x".to_string(), x), ("y".to_string(), y)]);
                    expr.eval_with_map(&scope)
                })
                .collect::<Result<Vec<f64>, ComputationError>>()
        })
        .collect::<Result<_, _>>()?;
    let z = DMatrix::from_fn(xs.len(), ys.len(), |i, j| rows[i][j]);
    Ok(SurfaceGrid { xs, ys, z })
}

fn range_around(lo: f64, hi: f64) -> Range<f64> {
    if hi - lo < 1e-9 { lo - 1.0..hi + 1.0 } else { lo..hi }
}

fn pastel(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    RGBColor(
        mix(MATCHA.0, STRAWBERRY.0),
        mix(MATCHA.1, STRAWBERRY.1),
        mix(MATCHA.2, STRAWBERRY.2),
    )
}

fn draw_surface<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    grid: &SurfaceGrid,
    title: &str,
    marker: (f64, f64, f64),
    settings: &PlotSettings,
) -> Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let (z_lo, z_hi) = grid.z_bounds().unwrap_or((-1.0, 1.0));
    let x_range = range_around(grid.xs[0], grid.xs[grid.xs.len() - 1]);
    let y_range = range_around(grid.ys[0], grid.ys[grid.ys.len() - 1]);
    let z_range = range_around(z_lo, z_hi);
    let span = z_range.end - z_range.start;

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .build_cartesian_3d(x_range, z_range.clone(), y_range)?;
    chart.with_projection(|mut pb| {
        pb.yaw = settings.yaw;
        pb.pitch = settings.pitch;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .draw()?;

    // holes are drawn at the bottom of the box
    let height = |x: f64, y: f64| {
        let v = grid.value_near(x, y);
        if v.is_finite() { v } else { z_range.start }
    };
    let colour = |v: &f64| pastel((v - z_range.start) / span).mix(0.85).filled();
    chart.draw_series(
        SurfaceSeries::xoz(grid.xs.iter().copied(), grid.ys.iter().copied(), height)
            .style_func(&colour),
    )?;

    let (mx, my, mz) = marker;
    if mz.is_finite() {
        chart.draw_series(std::iter::once(Circle::new((mx, mz, my), 6, RED.filled())))?;
    }
    root.present()?;
    Ok(())
}

/// Draws the recipe around `point` into `path`: SVG for `.svg`, PNG otherwise.
/// Returns the sampled grid.
pub fn plot_surface(
    expression: &str,
    point: (f64, f64),
    settings: &PlotSettings,
    path: &Path,
) -> Result<SurfaceGrid, Box<dyn Error>> {
    let grid = sample_surface(expression, point, settings.half_range, settings.samples)?;
    let holes = grid.z.iter().filter(|v| !v.is_finite()).count();
    if holes > 0 {
        warn!("{} of {} samples of {} are undefined", holes, grid.z.len(), expression);
    }
    let marker_z = parse_recipe(expression)?
        .eval_expression(&["x", "y"], &[point.0, point.1])?;
    let title = format!("f(x, y) = {}", expression);
    let marker = (point.0, point.1, marker_z);
    let size = (settings.width, settings.height);
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if is_svg {
        draw_surface(SVGBackend::new(path, size).into_drawing_area(), &grid, &title, marker, settings)?;
    } else {
        draw_surface(BitMapBackend::new(path, size).into_drawing_area(), &grid, &title, marker, settings)?;
    }
    info!("surface of {} written to {}", expression, path.display());
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_surface_grid() {
        let grid = sample_surface("x^2 - y^2", (1.0, 2.0), 1.0, 5).unwrap();
        assert_eq!(grid.z.shape(), (5, 5));
        assert_relative_eq!(grid.xs[0], 0.0);
        assert_relative_eq!(grid.ys[4], 3.0);
        // centre node is the evaluation point
        assert_relative_eq!(grid.z[(2, 2)], 1.0 - 4.0);
        assert_relative_eq!(grid.value_near(1.0, 2.0), -3.0);
        assert_relative_eq!(grid.z[(0, 4)], 0.0 - 9.0);
    }

    #[test]
    fn test_bounds_skip_undefined_points() {
        let grid = sample_surface("ln(x)", (0.0, 0.0), 1.0, 3).unwrap();
        // x = -1 gives NaN, x = 0 gives -inf, x = 1 gives 0
        assert!(grid.z[(0, 0)].is_nan());
        assert_eq!(grid.z_bounds(), Some((0.0, 0.0)));
    }

    #[test]
    fn test_unknown_variable_is_rejected() {
        assert!(matches!(
            sample_surface("x + t", (0.0, 0.0), 1.0, 4),
            Err(ComputationError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_pastel_ends() {
        assert_eq!(pastel(0.0), MATCHA);
        assert_eq!(pastel(1.0), STRAWBERRY);
        assert_eq!(pastel(f64::NAN), MATCHA);
    }

    #[test]
    fn test_range_around_flat_surface() {
        assert_eq!(range_around(2.0, 2.0), 1.0..3.0);
        assert_eq!(range_around(-1.0, 4.0), -1.0..4.0);
    }
}
