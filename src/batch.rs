//! Evaluating one date at many points. The coefficients are synthesized once and shared, so the
//! parallel variants need no locking.
use crate::error::GeomagError;
use crate::evaluate::{Evaluation, EvaluationOptions, PreparedModel};
use crate::model::coefficients::CoefficientSource;
use crate::model::segment::ModelCatalog;
use crate::synthesis::field::{CoordinateSystem, GeoPoint};
use crate::utils::grid::world_grid;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

type Result<T> = std::result::Result<T, GeomagError>;

/// Evaluates a list of points at one date.
///
/// # Errors
/// Will return `Err` if the date is out of range, the model cannot be prepared, or any of the
/// points fails to evaluate.
pub fn evaluate_points<S: CoefficientSource + ?Sized>(
    catalog: &ModelCatalog,
    source: &S,
    date: f64,
    points: &[GeoPoint],
    options: &EvaluationOptions,
) -> Result<Vec<Evaluation>> {
    let model = PreparedModel::new(catalog, source, date, options)?;
    points.iter().map(|p| model.evaluate(p)).collect()
}

/// Evaluates a list of points at one date in parallel.
///
/// # Errors
/// Will return `Err` if the date is out of range, the model cannot be prepared, or any of the
/// points fails to evaluate.
pub fn par_evaluate_points<S: CoefficientSource + ?Sized>(
    catalog: &ModelCatalog,
    source: &S,
    date: f64,
    points: &[GeoPoint],
    options: &EvaluationOptions,
) -> Result<Vec<Evaluation>> {
    let model = PreparedModel::new(catalog, source, date, options)?;
    points.par_iter().map(|p| model.evaluate(p)).collect()
}

fn grid_points(
    altitude: f64,
    system: CoordinateSystem,
    lat_step: f64,
    lon_step: f64,
) -> Result<Vec<GeoPoint>> {
    Ok(world_grid(lat_step, lon_step)?
        .into_iter()
        .map(|(latitude, longitude)| GeoPoint {
            latitude,
            longitude,
            altitude,
            system,
        })
        .collect())
}

/// Evaluates a global latitude/longitude mesh at one altitude, latitude-major from (-90, -180).
/// Rows at ±90° carry the geographic pole suppression.
///
/// # Errors
/// Will return `Err` if a step is not positive, or as [`evaluate_points`].
#[allow(clippy::too_many_arguments)]
pub fn grid<S: CoefficientSource + ?Sized>(
    catalog: &ModelCatalog,
    source: &S,
    date: f64,
    altitude: f64,
    system: CoordinateSystem,
    lat_step: f64,
    lon_step: f64,
    options: &EvaluationOptions,
) -> Result<Vec<Evaluation>> {
    let points = grid_points(altitude, system, lat_step, lon_step)?;
    evaluate_points(catalog, source, date, &points, options)
}

/// Evaluates a global latitude/longitude mesh at one altitude in parallel.
///
/// # Errors
/// Will return `Err` if a step is not positive, or as [`par_evaluate_points`].
#[allow(clippy::too_many_arguments)]
pub fn par_grid<S: CoefficientSource + ?Sized>(
    catalog: &ModelCatalog,
    source: &S,
    date: f64,
    altitude: f64,
    system: CoordinateSystem,
    lat_step: f64,
    lon_step: f64,
    options: &EvaluationOptions,
) -> Result<Vec<Evaluation>> {
    let points = grid_points(altitude, system, lat_step, lon_step)?;
    par_evaluate_points(catalog, source, date, &points, options)
}

/// Evaluates a vertical profile above one geodetic location.
///
/// # Errors
/// Will return `Err` as [`evaluate_points`].
pub fn altitude_profile<S: CoefficientSource + ?Sized>(
    catalog: &ModelCatalog,
    source: &S,
    date: f64,
    latitude: f64,
    longitude: f64,
    altitudes: &[f64],
    options: &EvaluationOptions,
) -> Result<Vec<Evaluation>> {
    let points: Vec<GeoPoint> = altitudes
        .iter()
        .map(|alt| GeoPoint::geodetic(latitude, longitude, *alt))
        .collect();
    evaluate_points(catalog, source, date, &points, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::coefficients::{InMemorySource, ModelRecord};
    use crate::model::segment::{ModelLocator, ModelSegment};

    fn model() -> (ModelCatalog, InMemorySource) {
        let segment = ModelSegment {
            name: "DIPOLE".to_string(),
            epoch: 2020.0,
            n_main: 1,
            n_sv: 1,
            year_min: 2020.0,
            year_max: 2025.0,
            alt_min: -1.0,
            alt_max: 600.0,
            locator: ModelLocator(0),
        };
        let mut source = InMemorySource::new();
        source.insert(
            ModelLocator(0),
            vec![
                ModelRecord {
                    n: 1,
                    m: 0,
                    g: -30000.0,
                    h: 0.0,
                    g_sv: 12.0,
                    h_sv: 0.0,
                },
                ModelRecord {
                    n: 1,
                    m: 1,
                    g: -2000.0,
                    h: 5000.0,
                    g_sv: 8.0,
                    h_sv: -25.0,
                },
            ],
        );
        (ModelCatalog::new(vec![segment]).unwrap(), source)
    }

    #[test]
    fn parallel_matches_sequential() {
        let (catalog, source) = model();
        let opts = EvaluationOptions::default();
        let system = CoordinateSystem::Geodetic;
        let seq = grid(&catalog, &source, 2022.0, 100.0, system, 30.0, 60.0, &opts).unwrap();
        let par = par_grid(&catalog, &source, 2022.0, 100.0, system, 30.0, 60.0, &opts).unwrap();
        assert_eq!(seq.len(), 7 * 7);
        assert_eq!(seq.len(), par.len());
        for (a, b) in seq.iter().zip(par.iter()) {
            assert_eq!(a.point, b.point);
            assert_eq!(a.field.z.to_bits(), b.field.z.to_bits());
            assert_eq!(a.field.h.to_bits(), b.field.h.to_bits());
            assert_eq!(a.warnings, b.warnings);
        }
    }

    #[test]
    fn grid_pole_rows_are_suppressed() {
        let (catalog, source) = model();
        let evals = grid(
            &catalog,
            &source,
            2022.0,
            0.0,
            CoordinateSystem::Geodetic,
            45.0,
            90.0,
            &EvaluationOptions::default(),
        )
        .unwrap();
        for eval in &evals {
            let at_pole = eval.point.latitude.abs() == 90.0;
            assert_eq!(eval.field.x.is_nan(), at_pole);
            assert!(eval.field.z.is_finite());
        }
    }

    #[test]
    fn profile_weakens_with_altitude() {
        let (catalog, source) = model();
        let evals = altitude_profile(
            &catalog,
            &source,
            2021.0,
            45.0,
            -75.0,
            &[0.0, 100.0, 300.0, 600.0],
            &EvaluationOptions::default(),
        )
        .unwrap();
        assert_eq!(evals.len(), 4);
        assert!(evals.windows(2).all(|w| w[1].field.f < w[0].field.f));
    }

    #[test]
    fn one_bad_point_fails_the_batch() {
        let (catalog, source) = model();
        let points = [
            GeoPoint::geodetic(10.0, 10.0, 0.0),
            GeoPoint::geodetic(10.0, 10.0, 900.0),
        ];
        let opts = EvaluationOptions::default();
        assert!(evaluate_points(&catalog, &source, 2021.0, &points, &opts).is_err());
        assert!(par_evaluate_points(&catalog, &source, 2021.0, &points, &opts).is_err());
    }
}
