//! Evaluation of spherical harmonic geomagnetic field models such as the IGRF and WMM.
//!
//! A model is a [`ModelCatalog`] of epoch segments plus a [`CoefficientSource`] that hands out
//! their coefficients. [`evaluate`] returns the field vector at a point and date, its annual rate
//! of change, and any advisories about the poles or a weak horizontal field.
pub mod batch;
pub mod error;
pub mod evaluate;
pub mod model;
pub mod synthesis;
pub mod utils;

#[cfg(feature = "python")]
mod python;

pub use batch::{altitude_profile, evaluate_points, grid, par_evaluate_points, par_grid};
pub use error::GeomagError;
pub use evaluate::{
    evaluate, evaluate_at, evaluate_with, Evaluation, EvaluationOptions, PreparedModel, Warning,
};
pub use model::coefficients::{CoefficientSet, CoefficientSource, InMemorySource, ModelRecord};
pub use model::segment::{ModelCatalog, ModelLocator, ModelSegment};
pub use synthesis::derived::FieldVector;
pub use synthesis::field::{CoordinateSystem, ExternalCoefficients, GeoPoint};
pub use synthesis::secular::SecularVariation;
pub use utils::time::{decimal_year, decimal_year_from_calendar};
