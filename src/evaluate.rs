//! Evaluation of a model at a date and point, including the pole and weak field policies.
use crate::error::GeomagError;
use crate::model::coefficients::{CoefficientSet, CoefficientSource};
use crate::model::segment::{ModelCatalog, ModelSegment};
use crate::synthesis::derived::FieldVector;
use crate::synthesis::field::{synthesize, CoordinateSystem, ExternalCoefficients, GeoPoint};
use crate::synthesis::secular::{difference, SecularVariation};
use crate::synthesis::temporal::TemporalModel;
use crate::utils::constants::{
    EARTH_RADIUS_KM, MAGNETIC_POLE_H_NT, MODERATE_WEAK_FIELD_H_NT, SEVERE_WEAK_FIELD_H_NT,
};
use crate::utils::time::decimal_year;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;
use tracing::{trace, warn};

type Result<T> = std::result::Result<T, GeomagError>;

/// Advisories attached to an evaluation. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Warning {
    /// Within 0.001° of a geographic pole; X, Y and D are undefined
    GeographicPole,
    /// Horizontal intensity below 100 nT; D is undefined
    MagneticPole,
    /// Horizontal intensity below 5000 nT
    WeakFieldModerate,
    /// Horizontal intensity below 1000 nT
    WeakFieldSevere,
    /// Date is past the end of the model but within the grace period
    ModelExpired,
}
impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Warning::GeographicPole => {
                "Location is at a geographic pole where X, Y and declination are not computed"
            }
            Warning::MagneticPole => {
                "Horizontal intensity is below 100 nT, declination is not computed"
            }
            Warning::WeakFieldModerate => {
                "Horizontal intensity is below 5000 nT, compass readings may be unreliable"
            }
            Warning::WeakFieldSevere => {
                "Horizontal intensity is below 1000 nT, compass readings are very unreliable"
            }
            Warning::ModelExpired => "Date is past the end of the model validity range",
        };
        write!(f, "{msg}")
    }
}

/// Settings that change how a query is evaluated
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOptions {
    /// External field terms added to the internal expansion
    pub external: Option<ExternalCoefficients>,
    /// Years past the end of the model that are still evaluated, with a warning
    pub expiry_grace_years: f64,
    /// Reject altitudes outside of the selected segment's range
    pub check_altitude: bool,
}
impl Default for EvaluationOptions {
    fn default() -> Self {
        EvaluationOptions {
            external: None,
            expiry_grace_years: 1.0,
            check_altitude: true,
        }
    }
}

/// Everything computed for one query
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Name of the segment the date fell in
    pub model: String,
    pub date: f64,
    pub point: GeoPoint,
    pub field: FieldVector,
    pub secular_variation: SecularVariation,
    pub warnings: BTreeSet<Warning>,
}
impl Evaluation {
    /// Flattens the results into a name → value record, angles first.
    pub fn to_record(&self) -> IndexMap<String, f64> {
        let (fv, sv) = (&self.field, &self.secular_variation);
        [
            ("d", fv.d),
            ("i", fv.i),
            ("h", fv.h),
            ("x", fv.x),
            ("y", fv.y),
            ("z", fv.z),
            ("f", fv.f),
            ("ddot", sv.dd),
            ("idot", sv.di),
            ("hdot", sv.dh),
            ("xdot", sv.dx),
            ("ydot", sv.dy),
            ("zdot", sv.dz),
            ("fdot", sv.df),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

/// A model reduced to the two effective coefficient sets for one date, ready to be evaluated at
/// any number of points.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedModel {
    segment: ModelSegment,
    date: f64,
    now: CoefficientSet,
    next: CoefficientSet,
    expired: bool,
    options: EvaluationOptions,
}
impl PreparedModel {
    /// Selects the segment for `date` and synthesizes its coefficients at `date` and `date + 1`.
    ///
    /// # Errors
    /// Will return `Err` if the date is outside of the catalog, or if any coefficient set cannot
    /// be loaded or combined.
    pub fn new<S: CoefficientSource + ?Sized>(
        catalog: &ModelCatalog,
        source: &S,
        date: f64,
        options: &EvaluationOptions,
    ) -> Result<PreparedModel> {
        let (min, max) = catalog.year_range();
        let in_grace = date < max + options.expiry_grace_years;
        if !(date >= min && (date <= max || in_grace)) {
            Err(GeomagError::DateOutOfRange { date, min, max })?
        }
        let expired = date > max;
        if expired {
            warn!(date, max, "Date is past the end of the model validity range");
        }

        let (index, segment) = catalog.select(date);
        let temporal = TemporalModel::load(catalog, index, source)?;
        let (now, next) = temporal.bracket(date)?;
        Ok(PreparedModel {
            segment: segment.clone(),
            date,
            now,
            next,
            expired,
            options: options.clone(),
        })
    }

    pub fn date(&self) -> f64 {
        self.date
    }

    pub fn segment(&self) -> &ModelSegment {
        &self.segment
    }

    /// Effective coefficients at the query date
    pub fn coefficients(&self) -> &CoefficientSet {
        &self.now
    }

    fn check_altitude(&self, point: &GeoPoint) -> Result<()> {
        if !self.options.check_altitude {
            return Ok(());
        }
        let offset = match point.system {
            CoordinateSystem::Geodetic => 0.0,
            CoordinateSystem::Geocentric => EARTH_RADIUS_KM,
        };
        let (min, max) = (self.segment.alt_min + offset, self.segment.alt_max + offset);
        if !(point.altitude >= min && point.altitude <= max) {
            Err(GeomagError::AltitudeOutOfRange {
                altitude: point.altitude,
                min,
                max,
            })?
        }
        Ok(())
    }

    /// Evaluates the field and its annual change at `point`.
    ///
    /// # Errors
    /// Will return `Err` if the point is invalid or outside of the segment's altitude range, or if
    /// the synthesis hits a numeric domain error.
    pub fn evaluate(&self, point: &GeoPoint) -> Result<Evaluation> {
        point.validate()?;
        self.check_altitude(point)?;

        let external = self.options.external.as_ref();
        let field = FieldVector::from(synthesize(&self.now, point, external)?);
        let field_next = FieldVector::from(synthesize(&self.next, point, external)?);
        let secular_variation = difference(&field, &field_next);

        let mut evaluation = Evaluation {
            model: self.segment.name.clone(),
            date: self.date,
            point: *point,
            field,
            secular_variation,
            warnings: BTreeSet::new(),
        };
        apply_policies(&mut evaluation);
        if self.expired {
            evaluation.warnings.insert(Warning::ModelExpired);
        }
        trace!(
            latitude = point.latitude,
            longitude = point.longitude,
            altitude = point.altitude,
            x = evaluation.field.x,
            y = evaluation.field.y,
            z = evaluation.field.z,
            "Evaluated field"
        );
        Ok(evaluation)
    }
}

/// Suppresses quantities that are undefined at the magnetic and geographic poles and attaches
/// the weak field advisories.
fn apply_policies(evaluation: &mut Evaluation) {
    let (field, sv, warnings) = (
        &mut evaluation.field,
        &mut evaluation.secular_variation,
        &mut evaluation.warnings,
    );
    if field.h < MAGNETIC_POLE_H_NT {
        field.d = f64::NAN;
        sv.dd = f64::NAN;
        warnings.insert(Warning::MagneticPole);
    }
    if field.h < SEVERE_WEAK_FIELD_H_NT {
        warnings.insert(Warning::WeakFieldSevere);
    } else if field.h < MODERATE_WEAK_FIELD_H_NT {
        warnings.insert(Warning::WeakFieldModerate);
    }

    if evaluation.point.is_geographic_pole() {
        field.x = f64::NAN;
        field.y = f64::NAN;
        field.d = f64::NAN;
        sv.dx = f64::NAN;
        sv.dy = f64::NAN;
        sv.dd = f64::NAN;
        // Horizontal advisories mean nothing once the horizontal directions are gone
        warnings.clear();
        warnings.insert(Warning::GeographicPole);
    }
}

/// Evaluates the field at `point` on decimal year `date` with the default options.
///
/// # Errors
/// See [`evaluate_with`].
pub fn evaluate<S: CoefficientSource + ?Sized>(
    catalog: &ModelCatalog,
    source: &S,
    date: f64,
    point: &GeoPoint,
) -> Result<Evaluation> {
    evaluate_with(catalog, source, date, point, &EvaluationOptions::default())
}

/// Evaluates the field at `point` on decimal year `date`.
///
/// # Errors
/// Will return `Err` if the date, point or altitude are out of range, if the model is malformed
/// or of unsupported degree, or if the synthesis hits a numeric domain error.
pub fn evaluate_with<S: CoefficientSource + ?Sized>(
    catalog: &ModelCatalog,
    source: &S,
    date: f64,
    point: &GeoPoint,
    options: &EvaluationOptions,
) -> Result<Evaluation> {
    PreparedModel::new(catalog, source, date, options)?.evaluate(point)
}

/// Evaluates the field at `point` at a calendar time.
///
/// # Errors
/// See [`evaluate_with`].
pub fn evaluate_at<S: CoefficientSource + ?Sized>(
    catalog: &ModelCatalog,
    source: &S,
    time: NaiveDateTime,
    point: &GeoPoint,
    options: &EvaluationOptions,
) -> Result<Evaluation> {
    evaluate_with(catalog, source, decimal_year(time)?, point, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::coefficients::{InMemorySource, ModelRecord};
    use crate::model::segment::ModelLocator;

    /// Degree-1 model with rates, valid 2020 to 2025
    fn dipole_model(g10: f64, g11: f64, h11: f64) -> (ModelCatalog, InMemorySource) {
        let segment = ModelSegment {
            name: "DIPOLE".to_string(),
            epoch: 2020.0,
            n_main: 1,
            n_sv: 1,
            year_min: 2020.0,
            year_max: 2025.0,
            alt_min: -1.0,
            alt_max: 600.0,
            locator: ModelLocator(7),
        };
        let mut source = InMemorySource::new();
        source.insert(
            ModelLocator(7),
            vec![
                ModelRecord {
                    n: 1,
                    m: 0,
                    g: g10,
                    h: 0.0,
                    g_sv: 10.0,
                    h_sv: 0.0,
                },
                ModelRecord {
                    n: 1,
                    m: 1,
                    g: g11,
                    h: h11,
                    g_sv: 5.0,
                    h_sv: -20.0,
                },
            ],
        );
        (ModelCatalog::new(vec![segment]).unwrap(), source)
    }

    #[test]
    fn date_range_and_grace() {
        let (catalog, source) = dipole_model(-30000.0, -2000.0, 5000.0);
        let point = GeoPoint::geodetic(10.0, 10.0, 0.0);
        assert!(matches!(
            evaluate(&catalog, &source, 2019.99, &point),
            Err(GeomagError::DateOutOfRange { .. })
        ));
        let on_end = evaluate(&catalog, &source, 2025.0, &point).unwrap();
        assert!(!on_end.warnings.contains(&Warning::ModelExpired));
        let expired = evaluate(&catalog, &source, 2025.5, &point).unwrap();
        assert!(expired.warnings.contains(&Warning::ModelExpired));
        assert!(matches!(
            evaluate(&catalog, &source, 2026.0, &point),
            Err(GeomagError::DateOutOfRange { .. })
        ));
        let strict = EvaluationOptions {
            expiry_grace_years: 0.0,
            ..EvaluationOptions::default()
        };
        assert!(evaluate_with(&catalog, &source, 2025.0, &point, &strict).is_ok());
        assert!(evaluate_with(&catalog, &source, 2025.5, &point, &strict).is_err());
    }

    #[test]
    fn altitude_bounds() {
        let (catalog, source) = dipole_model(-30000.0, -2000.0, 5000.0);
        assert!(matches!(
            evaluate(&catalog, &source, 2021.0, &GeoPoint::geodetic(10.0, 10.0, 601.0)),
            Err(GeomagError::AltitudeOutOfRange { .. })
        ));
        let top = GeoPoint::geocentric(10.0, 10.0, 6900.0);
        assert!(evaluate(&catalog, &source, 2021.0, &top).is_ok());
        assert!(matches!(
            evaluate(&catalog, &source, 2021.0, &GeoPoint::geocentric(10.0, 10.0, 601.0)),
            Err(GeomagError::AltitudeOutOfRange { .. })
        ));
        let unchecked = EvaluationOptions {
            check_altitude: false,
            ..EvaluationOptions::default()
        };
        assert!(evaluate_with(
            &catalog,
            &source,
            2021.0,
            &GeoPoint::geodetic(10.0, 10.0, 2000.0),
            &unchecked
        )
        .is_ok());
    }

    #[test]
    fn invalid_coordinates() {
        let (catalog, source) = dipole_model(-30000.0, -2000.0, 5000.0);
        for point in [
            GeoPoint::geodetic(90.5, 0.0, 0.0),
            GeoPoint::geodetic(0.0, -181.0, 0.0),
            GeoPoint::geodetic(f64::NAN, 0.0, 0.0),
        ] {
            assert!(matches!(
                evaluate(&catalog, &source, 2021.0, &point),
                Err(GeomagError::InvalidCoordinate(_))
            ));
        }
    }

    #[test]
    fn weak_field_advisories() {
        // A pure axial dipole of 4000 nT has H of 4000 nT at the geocentric equator
        let equator = GeoPoint::geocentric(0.0, 0.0, EARTH_RADIUS_KM);
        let (catalog, source) = dipole_model(-4000.0, 0.0, 0.0);
        let eval = evaluate(&catalog, &source, 2020.0, &equator).unwrap();
        assert!(eval.warnings.contains(&Warning::WeakFieldModerate));
        assert!(!eval.warnings.contains(&Warning::WeakFieldSevere));

        let (catalog, source) = dipole_model(-500.0, 0.0, 0.0);
        let eval = evaluate(&catalog, &source, 2020.0, &equator).unwrap();
        assert!(eval.warnings.contains(&Warning::WeakFieldSevere));
        assert!(!eval.warnings.contains(&Warning::WeakFieldModerate));
        assert!(!eval.warnings.contains(&Warning::MagneticPole));
        assert!(eval.field.d.is_finite());
    }

    #[test]
    fn record_order() {
        let (catalog, source) = dipole_model(-30000.0, -2000.0, 5000.0);
        let point = GeoPoint::geodetic(10.0, 10.0, 0.0);
        let eval = evaluate(&catalog, &source, 2021.0, &point).unwrap();
        let record = eval.to_record();
        let keys: Vec<&str> = record.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "d", "i", "h", "x", "y", "z", "f", "ddot", "idot", "hdot", "xdot", "ydot", "zdot",
                "fdot"
            ]
        );
        assert_eq!(record["z"], eval.field.z);
        assert_eq!(record["fdot"], eval.secular_variation.df);
    }

    #[test]
    fn warnings_display() {
        assert!(Warning::MagneticPole.to_string().contains("100 nT"));
        assert!(Warning::WeakFieldSevere.to_string().contains("1000 nT"));
    }
}
