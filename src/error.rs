#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

/// Enum of the possible error variants that may be encountered while evaluating a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomagError {
    /// Coefficient records out of canonical (n, m) order, or a degenerate model
    #[error("malformed model: {0}")]
    MalformedModel(String),

    /// Spherical harmonic degree above what the engine supports
    #[error("degree {degree} exceeds the maximum supported degree {max}")]
    UnsupportedDegree { degree: usize, max: usize },

    /// Negative radicand or division by zero that clamping did not catch
    #[error("numeric domain error: {0}")]
    NumericDomain(String),

    /// Query date outside of every segment in the catalog
    #[error("date {date} is outside of the model validity range {min} to {max}")]
    DateOutOfRange { date: f64, min: f64, max: f64 },

    /// Query altitude outside of the selected segment
    #[error("altitude {altitude} km is outside of the model validity range {min} to {max} km")]
    AltitudeOutOfRange { altitude: f64, min: f64, max: f64 },

    /// Latitude or longitude out of range
    #[error("{0}")]
    InvalidCoordinate(String),

    /// Calendar date that does not exist
    #[error("{0}")]
    InvalidDate(String),
}

#[cfg(feature = "python")]
impl From<GeomagError> for PyErr {
    fn from(value: GeomagError) -> Self {
        let msg = value.to_string();
        PyValueError::new_err(msg)
    }
}
