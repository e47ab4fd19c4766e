use crate::error::GeomagError;
use itertools::Itertools;

type Result<T> = std::result::Result<T, GeomagError>;

/// Largest mesh `world_grid` will build, about a 0.1 degree grid
pub const MAX_GRID_POINTS: usize = 10_000_000;

/// Evenly spaced values from `start` up to and including `end` when `step` divides the span.
fn axis(start: f64, end: f64, step: f64) -> Result<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        Err(GeomagError::InvalidCoordinate(format!(
            "Grid step must be positive, got {step}"
        )))?
    }
    // Small slack so that 180 / 0.1 does not drop the last row to rounding
    let steps = ((end - start) / step + 1e-9).floor();
    if steps >= MAX_GRID_POINTS as f64 {
        Err(GeomagError::InvalidCoordinate(format!("Grid step {step} is too fine")))?
    }
    let count = steps as usize;
    Ok((0..=count).map(|k| start + k as f64 * step).collect())
}

/// Builds a latitude/longitude mesh covering the globe, latitude-major.
/// Each entry is `(latitude, longitude)` in degrees.
pub fn world_grid(lat_step: f64, lon_step: f64) -> Result<Vec<(f64, f64)>> {
    let lats = axis(-90.0, 90.0, lat_step)?;
    let lons = axis(-180.0, 180.0, lon_step)?;
    if lats.len().saturating_mul(lons.len()) > MAX_GRID_POINTS {
        Err(GeomagError::InvalidCoordinate(format!(
            "A {lat_step} by {lon_step} degree grid has more than {MAX_GRID_POINTS} points"
        )))?
    }
    Ok(lats.into_iter().cartesian_product(lons).collect())
}
