use crate::synthesis::field::FieldComponents;
use crate::utils::constants::DEGENERATE_FIELD_NT;

/// Field components together with the angles and intensities derived from them.
/// Angles are in degrees, intensities in nT. An undefined angle is NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Declination, east of true north
    pub d: f64,
    /// Inclination, positive below the horizontal
    pub i: f64,
    pub h: f64,
    pub f: f64,
}
impl FieldVector {
    /// Derives declination, inclination and intensities from (X, Y, Z).
    pub fn from_components(x: f64, y: f64, z: f64) -> FieldVector {
        let h = x.hypot(y);
        let f = h.hypot(z);
        let (d, i) = if f < DEGENERATE_FIELD_NT {
            (f64::NAN, f64::NAN)
        } else {
            let i = z.atan2(h);
            let d = if h < DEGENERATE_FIELD_NT {
                f64::NAN
            } else if h + x < DEGENERATE_FIELD_NT {
                // Pointing due south, where the half angle form breaks down
                std::f64::consts::PI
            } else {
                2.0 * y.atan2(h + x)
            };
            (d, i)
        };
        FieldVector {
            x,
            y,
            z,
            d: d.to_degrees(),
            i: i.to_degrees(),
            h,
            f,
        }
    }
}
impl From<FieldComponents> for FieldVector {
    fn from(value: FieldComponents) -> Self {
        FieldVector::from_components(value.x, value.y, value.z)
    }
}
