use crate::synthesis::derived::FieldVector;
use crate::utils::constants::ARCMIN_PER_DEGREE;

/// Annual rates of change as a one-year finite difference, not an instantaneous derivative.
/// Angular rates are in arc-minutes per year, the rest in nT per year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecularVariation {
    pub dd: f64,
    pub di: f64,
    pub dh: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
    pub df: f64,
}

/// Maps a declination change in degrees into (-180, 180].
pub fn wrap_declination_change(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta <= -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Differences the field a year from now against the field now. NaN on either side carries
/// through to the matching rate.
pub fn difference(now: &FieldVector, next: &FieldVector) -> SecularVariation {
    SecularVariation {
        dd: wrap_declination_change(next.d - now.d) * ARCMIN_PER_DEGREE,
        di: (next.i - now.i) * ARCMIN_PER_DEGREE,
        dh: next.h - now.h,
        dx: next.x - now.x,
        dy: next.y - now.y,
        dz: next.z - now.z,
        df: next.f - now.f,
    }
}
