/// Geomagnetic reference radius of the Earth, km
pub const EARTH_RADIUS_KM: f64 = 6371.2;

/// Square of the WGS84 semi-major axis, km²
pub const WGS84_A2: f64 = 40680631.59;
/// Square of the WGS84 semi-minor axis, km²
pub const WGS84_B2: f64 = 40408299.98;

/// Highest spherical harmonic degree a model may carry
pub const MAX_SUPPORTED_DEGREE: usize = 13;

/// Latitudes closer to the poles than this are evaluated here instead, degrees
pub const POLE_CLAMP_LATITUDE: f64 = 89.999;
/// Distance from ±90° at which a point counts as a geographic pole, degrees
pub const GEOGRAPHIC_POLE_TOLERANCE: f64 = 0.001;

/// Below this total or horizontal intensity the angles are undefined, nT
pub(crate) const DEGENERATE_FIELD_NT: f64 = 1e-4;
/// Horizontal intensity below which declination is suppressed, nT
pub const MAGNETIC_POLE_H_NT: f64 = 100.0;
/// Horizontal intensity below which compass readings are very unreliable, nT
pub const SEVERE_WEAK_FIELD_H_NT: f64 = 1000.0;
/// Horizontal intensity below which compass readings are unreliable, nT
pub const MODERATE_WEAK_FIELD_H_NT: f64 = 5000.0;

pub(crate) const ARCMIN_PER_DEGREE: f64 = 60.0;
