//! Spherical harmonic summation of the field components at a point.
use crate::error::GeomagError;
use crate::model::coefficients::CoefficientSet;
use crate::synthesis::legendre::{LegendreTable, LongitudeTable};
use crate::utils::constants::{
    EARTH_RADIUS_KM, GEOGRAPHIC_POLE_TOLERANCE, POLE_CLAMP_LATITUDE, WGS84_A2, WGS84_B2,
};

type Result<T> = std::result::Result<T, GeomagError>;

/// How the latitude and altitude of a point are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateSystem {
    /// Latitude normal to the WGS84 ellipsoid, altitude above it in km
    Geodetic,
    /// Spherical latitude, and `altitude` is the distance from the Earth's centre in km
    Geocentric,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,
    pub altitude: f64,
    pub system: CoordinateSystem,
}
impl GeoPoint {
    pub fn geodetic(latitude: f64, longitude: f64, altitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
            altitude,
            system: CoordinateSystem::Geodetic,
        }
    }

    pub fn geocentric(latitude: f64, longitude: f64, radius: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
            altitude: radius,
            system: CoordinateSystem::Geocentric,
        }
    }

    /// Checks latitude and longitude are finite and in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.latitude.is_finite() && self.latitude.abs() <= 90.0) {
            Err(GeomagError::InvalidCoordinate(format!(
                "Latitude {} is outside of -90 to 90 degrees",
                self.latitude
            )))?
        }
        if !(self.longitude.is_finite() && self.longitude.abs() <= 180.0) {
            Err(GeomagError::InvalidCoordinate(format!(
                "Longitude {} is outside of -180 to 180 degrees",
                self.longitude
            )))?
        }
        if !self.altitude.is_finite() {
            Err(GeomagError::InvalidCoordinate(format!(
                "Altitude {} is not finite",
                self.altitude
            )))?
        }
        Ok(())
    }

    /// Whether the point is close enough to a pole for horizontal directions to be meaningless
    pub fn is_geographic_pole(&self) -> bool {
        90.0 - self.latitude.abs() <= GEOGRAPHIC_POLE_TOLERANCE
    }
}

/// Spherical position of a point plus the rotation between its local geodetic and geocentric
/// verticals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeocentricFrame {
    /// Distance from the Earth's centre, km
    pub radius: f64,
    /// Sine and cosine of geocentric latitude
    pub slat: f64,
    pub clat: f64,
    /// Sine and cosine of the angle between the two verticals
    pub sin_delta: f64,
    pub cos_delta: f64,
}
impl GeocentricFrame {
    /// Converts a point to geocentric form. Latitudes within a hair of a pole are pulled back to
    /// ±89.999° for the cosine so nothing downstream divides by zero.
    ///
    /// # Errors
    /// Will return `Err` if the resulting radius is not positive.
    pub fn new(point: &GeoPoint) -> Result<GeocentricFrame> {
        let slat = point.latitude.to_radians().sin();
        let clamped = if 90.0 - point.latitude < GEOGRAPHIC_POLE_TOLERANCE {
            POLE_CLAMP_LATITUDE
        } else if 90.0 + point.latitude < GEOGRAPHIC_POLE_TOLERANCE {
            -POLE_CLAMP_LATITUDE
        } else {
            point.latitude
        };
        let clat = clamped.to_radians().cos();

        let frame = match point.system {
            CoordinateSystem::Geocentric => GeocentricFrame {
                radius: point.altitude,
                slat,
                clat,
                sin_delta: 0.0,
                cos_delta: 1.0,
            },
            CoordinateSystem::Geodetic => {
                let alt = point.altitude;
                let aa = WGS84_A2 * clat * clat;
                let bb = WGS84_B2 * slat * slat;
                let cc = aa + bb;
                let dd = cc.sqrt();
                let radicand = alt * (alt + 2.0 * dd) + (WGS84_A2 * aa + WGS84_B2 * bb) / cc;
                // The radicand is roughly (alt + dd)², so it stays positive past the centre
                if !(alt + dd > 0.0 && radicand > 0.0) {
                    Err(GeomagError::NumericDomain(format!(
                        "Altitude {alt} km puts the point at or below the Earth's centre"
                    )))?
                }
                let radius = radicand.sqrt();
                let cos_delta = (alt + dd) / radius;
                let sin_delta = (WGS84_A2 - WGS84_B2) / dd * slat * clat / radius;
                GeocentricFrame {
                    radius,
                    slat: slat * cos_delta - clat * sin_delta,
                    clat: clat * cos_delta + slat * sin_delta,
                    sin_delta,
                    cos_delta,
                }
            }
        };
        if !(frame.radius > 0.0) {
            Err(GeomagError::NumericDomain(format!(
                "Geocentric radius must be positive, got {} km",
                frame.radius
            )))?
        }
        Ok(frame)
    }

    /// Rotates (X, Z) from the geodetic frame into the geocentric frame
    pub fn rotate(&self, x: f64, z: f64) -> (f64, f64) {
        (
            x * self.cos_delta - z * self.sin_delta,
            x * self.sin_delta + z * self.cos_delta,
        )
    }

    /// Rotates (X, Z) from the geocentric frame back into the geodetic frame
    pub fn unrotate(&self, x: f64, z: f64) -> (f64, f64) {
        (
            x * self.cos_delta + z * self.sin_delta,
            z * self.cos_delta - x * self.sin_delta,
        )
    }
}

/// Degree-1 coefficients of an external (magnetospheric) field, nT
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExternalCoefficients {
    pub q10: f64,
    pub q11: f64,
    pub s11: f64,
}

/// Northward, eastward and downward components, nT
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldComponents {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Sums the spherical harmonic expansion of `coefficients` at `point`.
///
/// # Errors
/// Will return `Err` if the point maps to a non-positive radius or the sum is not finite.
pub fn synthesize(
    coefficients: &CoefficientSet,
    point: &GeoPoint,
    external: Option<&ExternalCoefficients>,
) -> Result<FieldComponents> {
    let frame = GeocentricFrame::new(point)?;
    let (slat, clat) = (frame.slat, frame.clat);
    let nmax = coefficients.max_degree();
    let legendre = LegendreTable::new(nmax, slat, clat);
    let lon = LongitudeTable::new(nmax, point.longitude.to_radians());
    let ratio = EARTH_RADIUS_KM / frame.radius;

    let (mut x, mut y, mut z) = (0.0, 0.0, 0.0);
    for n in 1..=nmax {
        let fn_ = n as f64;
        let rr = ratio.powi(n as i32 + 2);
        for m in 0..=n {
            let (p, q) = (legendre.p(n, m), legendre.q(n, m));
            let aa = rr * coefficients.g(n, m);
            if m == 0 {
                x += aa * q;
                z -= aa * p;
                continue;
            }
            let bb = rr * coefficients.h(n, m);
            let (sl, cl) = (lon.sin(m), lon.cos(m));
            let cc = aa * cl + bb * sl;
            x += cc * q;
            z -= cc * p;
            let east = aa * sl - bb * cl;
            if clat > 0.0 {
                y += east * m as f64 * p / ((fn_ + 1.0) * clat);
            } else {
                y += east * q * slat;
            }
        }
    }

    if let Some(ext) = external {
        let (sl1, cl1) = (lon.sin(1), lon.cos(1));
        let aa = ext.q11 * cl1 + ext.s11 * sl1;
        x += -ext.q10 * clat + aa * slat;
        y += ext.q11 * sl1 - ext.s11 * cl1;
        z += ext.q10 * slat + aa * clat;
    }

    let (x, z) = frame.unrotate(x, z);
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        Err(GeomagError::NumericDomain(format!(
            "Field at ({}, {}) is not finite",
            point.latitude, point.longitude
        )))?
    }
    Ok(FieldComponents { x, y, z })
}
