//! Recursions for the Schmidt quasi-normalized associated Legendre functions and the longitude
//! harmonics used by the field summation.

/// Position of (n, m) in the triangular tables, n ≥ 1
#[inline]
fn pq_index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m - 1
}

/// Legendre functions up to a maximum degree for one colatitude.
///
/// `p(n, m)` holds `(n + 1)` times the Schmidt quasi-normalized function and `q(n, m)` its
/// derivative with respect to colatitude.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreTable {
    max_degree: usize,
    p: Vec<f64>,
    q: Vec<f64>,
}
impl LegendreTable {
    /// Builds the table from the sine and cosine of geocentric latitude. Degrees 1 and 2 up to
    /// order 1 are seeded in closed form; everything else follows from lower terms.
    pub fn new(max_degree: usize, slat: f64, clat: f64) -> LegendreTable {
        let size = if max_degree == 0 {
            0
        } else {
            pq_index(max_degree, max_degree) + 1
        };
        let mut p = vec![0.0; size];
        let mut q = vec![0.0; size];

        for n in 1..=max_degree {
            let fn_ = n as f64;
            for m in 0..=n {
                let k = pq_index(n, m);
                let fm = m as f64;
                match (n, m) {
                    (1, 0) => {
                        p[k] = 2.0 * slat;
                        q[k] = -clat;
                    }
                    (1, 1) => {
                        p[k] = 2.0 * clat;
                        q[k] = slat;
                    }
                    (2, 0) => {
                        p[k] = 4.5 * slat * slat - 1.5;
                        q[k] = -3.0 * slat * clat;
                    }
                    (2, 1) => {
                        p[k] = 3.0 * 3.0_f64.sqrt() * clat * slat;
                        q[k] = 3.0_f64.sqrt() * (slat * slat - clat * clat);
                    }
                    _ if m == n => {
                        // Sectoral terms step diagonally from (n-1, n-1)
                        let aa = (1.0 - 0.5 / fm).sqrt();
                        let j = pq_index(n - 1, m - 1);
                        p[k] = (1.0 + 1.0 / fm) * aa * clat * p[j];
                        q[k] = aa * (clat * q[j] + slat / fm * p[j]);
                    }
                    _ => {
                        let gn = fn_ - 1.0;
                        let aa = (fn_ * fn_ - fm * fm).sqrt();
                        let bb = (gn * gn - fm * fm).sqrt() / aa;
                        let cc = (2.0 * fn_ - 1.0) / aa;
                        let i = pq_index(n - 1, m);
                        // (n-2, m) only exists below the subdiagonal
                        let (pj, qj) = if m + 2 <= n {
                            let j = pq_index(n - 2, m);
                            (p[j], q[j])
                        } else {
                            (0.0, 0.0)
                        };
                        p[k] = (fn_ + 1.0) * (cc * slat / fn_ * p[i] - bb / gn * pj);
                        q[k] = cc * (slat * q[i] - clat / fn_ * p[i]) - bb * qj;
                    }
                }
            }
        }
        LegendreTable { max_degree, p, q }
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// `(n + 1)` times the Schmidt quasi-normalized P(n, m)
    pub fn p(&self, n: usize, m: usize) -> f64 {
        self.p[pq_index(n, m)]
    }

    /// d P(n, m) / d colatitude
    pub fn q(&self, n: usize, m: usize) -> f64 {
        self.q[pq_index(n, m)]
    }
}

/// `sin(mλ)` and `cos(mλ)` for m = 0 up to a maximum order.
#[derive(Debug, Clone, PartialEq)]
pub struct LongitudeTable {
    sin: Vec<f64>,
    cos: Vec<f64>,
}
impl LongitudeTable {
    pub fn new(max_order: usize, longitude_rad: f64) -> LongitudeTable {
        let mut sin = Vec::with_capacity(max_order + 1);
        let mut cos = Vec::with_capacity(max_order + 1);
        sin.push(0.0);
        cos.push(1.0);
        let (s1, c1) = longitude_rad.sin_cos();
        for m in 1..=max_order {
            if m == 1 {
                sin.push(s1);
                cos.push(c1);
            } else {
                let (s, c) = (sin[m - 1], cos[m - 1]);
                sin.push(s * c1 + c * s1);
                cos.push(c * c1 - s * s1);
            }
        }
        LongitudeTable { sin, cos }
    }

    pub fn sin(&self, m: usize) -> f64 {
        self.sin[m]
    }

    pub fn cos(&self, m: usize) -> f64 {
        self.cos[m]
    }
}
