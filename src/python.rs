use crate::batch::par_grid;
use crate::error::GeomagError;
use crate::evaluate::{EvaluationOptions, PreparedModel};
use crate::model::coefficients::{InMemorySource, ModelRecord};
use crate::model::segment::{ModelCatalog, ModelLocator, ModelSegment};
use crate::synthesis::field::{CoordinateSystem, GeoPoint};
use chrono::NaiveDate;
use indexmap::IndexMap;
use pyo3::prelude::*;

/// (name, epoch, n_main, n_sv, year_min, year_max, alt_min, alt_max)
type SegmentTuple = (String, f64, usize, usize, f64, f64, f64, f64);
/// (n, m, g, h, g_sv, h_sv)
type RecordTuple = (usize, usize, f64, f64, f64, f64);

/// A geomagnetic model held in memory.
#[pyclass(name = "Model")]
struct PyModel {
    catalog: ModelCatalog,
    source: InMemorySource,
}

#[pymethods]
impl PyModel {
    /// Builds a model from one tuple per segment and, for each segment, its coefficient records
    /// in canonical (n, m) order.
    #[new]
    fn new(segments: Vec<SegmentTuple>, coefficients: Vec<Vec<RecordTuple>>) -> PyResult<Self> {
        if segments.len() != coefficients.len() {
            Err(GeomagError::MalformedModel(format!(
                "Got {} segments but {} coefficient blocks",
                segments.len(),
                coefficients.len()
            )))?
        }
        let mut source = InMemorySource::new();
        let mut catalog = vec![];
        for (i, (seg, block)) in segments.into_iter().zip(coefficients).enumerate() {
            let locator = ModelLocator(i as u64);
            let (name, epoch, n_main, n_sv, year_min, year_max, alt_min, alt_max) = seg;
            catalog.push(ModelSegment {
                name,
                epoch,
                n_main,
                n_sv,
                year_min,
                year_max,
                alt_min,
                alt_max,
                locator,
            });
            source.insert(
                locator,
                block
                    .into_iter()
                    .map(|(n, m, g, h, g_sv, h_sv)| ModelRecord {
                        n,
                        m,
                        g,
                        h,
                        g_sv,
                        h_sv,
                    })
                    .collect(),
            );
        }
        Ok(PyModel {
            catalog: ModelCatalog::new(catalog)?,
            source,
        })
    }

    /// Evaluates the field at one point, returning the values and any warnings.
    #[pyo3(signature = (date, latitude, longitude, altitude, geocentric = false))]
    fn evaluate(
        &self,
        date: f64,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        geocentric: bool,
    ) -> PyResult<(IndexMap<String, f64>, Vec<String>)> {
        let point = GeoPoint {
            latitude,
            longitude,
            altitude,
            system: if geocentric {
                CoordinateSystem::Geocentric
            } else {
                CoordinateSystem::Geodetic
            },
        };
        let model = PreparedModel::new(
            &self.catalog,
            &self.source,
            date,
            &EvaluationOptions::default(),
        )?;
        let eval = model.evaluate(&point)?;
        let warnings = eval.warnings.iter().map(|w| w.to_string()).collect();
        Ok((eval.to_record(), warnings))
    }

    /// Evaluates a global geodetic grid at one altitude, one record per point.
    #[pyo3(signature = (date, altitude, lat_step = 1.0, lon_step = 1.0))]
    fn grid(
        &self,
        date: f64,
        altitude: f64,
        lat_step: f64,
        lon_step: f64,
    ) -> PyResult<Vec<IndexMap<String, f64>>> {
        let evals = par_grid(
            &self.catalog,
            &self.source,
            date,
            altitude,
            CoordinateSystem::Geodetic,
            lat_step,
            lon_step,
            &EvaluationOptions::default(),
        )?;
        Ok(evals
            .into_iter()
            .map(|eval| {
                let mut rec = IndexMap::new();
                rec.insert("latitude".to_string(), eval.point.latitude);
                rec.insert("longitude".to_string(), eval.point.longitude);
                rec.extend(eval.to_record());
                rec
            })
            .collect())
    }
}

/// Converts a calendar time into a decimal year.
#[pyfunction]
#[pyo3(name = "decimal_year")]
#[pyo3(signature = (year, month, day, hour = 0, minute = 0, second = 0))]
fn decimal_year_py(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> PyResult<f64> {
    let time = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| {
            GeomagError::InvalidDate(format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02} is not a valid \
                 time"
            ))
        })?;
    Ok(crate::utils::time::decimal_year(time)?)
}

/// Spherical harmonic geomagnetic field models.
#[pymodule]
fn geomag(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyModel>()?;
    m.add_function(wrap_pyfunction!(decimal_year_py, m)?)?;
    Ok(())
}
