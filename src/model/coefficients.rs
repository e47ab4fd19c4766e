//! Schmidt quasi-normalized coefficient sets and the canonical (n, m) layout they are stored in.
use crate::error::GeomagError;
use crate::model::segment::{ModelLocator, ModelSegment};
use crate::utils::constants::MAX_SUPPORTED_DEGREE;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, GeomagError>;

/// Selects the cosine (g) or sine (h) coefficient of a degree/order pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Harmonic {
    G,
    H,
}

/// Selects which block of a segment's records to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoefficientVariant {
    MainField,
    SecularVariation,
}

/// Number of stored coefficients for a model of the given maximum degree.
pub fn coefficient_count(max_degree: usize) -> usize {
    max_degree * (max_degree + 2)
}

/// Number of (n, m) pairs, i.e. records, for a model of the given maximum degree.
pub fn record_count(max_degree: usize) -> usize {
    max_degree * (max_degree + 3) / 2
}

/// Position of a coefficient in the flat canonical layout: nondecreasing n, then nondecreasing
/// m, with g before h at each (n, m) and no h for m = 0. `None` for pairs that do not exist.
pub fn canonical_index(n: usize, m: usize, harmonic: Harmonic) -> Option<usize> {
    if n == 0 || m > n {
        return None;
    }
    match (harmonic, m) {
        (Harmonic::G, 0) => Some(n * n - 1),
        (Harmonic::H, 0) => None,
        (Harmonic::G, _) => Some(n * n + 2 * m - 2),
        (Harmonic::H, _) => Some(n * n + 2 * m - 1),
    }
}

pub(crate) fn check_degree(degree: usize) -> Result<()> {
    if degree == 0 {
        Err(GeomagError::MalformedModel(
            "Model degree must be at least 1".to_string(),
        ))?
    }
    if degree > MAX_SUPPORTED_DEGREE {
        Err(GeomagError::UnsupportedDegree {
            degree,
            max: MAX_SUPPORTED_DEGREE,
        })?
    }
    Ok(())
}

/// An immutable set of spherical harmonic coefficients, in nT (or nT/yr for a rate model)
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientSet {
    max_degree: usize,
    values: Vec<f64>,
}
impl CoefficientSet {
    /// Wraps coefficients already laid out in canonical order.
    ///
    /// # Errors
    /// Will return `Err` if the degree is 0 or above the supported maximum, or if the number of
    /// values is not `max_degree * (max_degree + 2)`.
    pub fn new(max_degree: usize, values: Vec<f64>) -> Result<CoefficientSet> {
        check_degree(max_degree)?;
        if values.len() != coefficient_count(max_degree) {
            Err(GeomagError::MalformedModel(format!(
                "Degree {max_degree} model needs {} coefficients, got {}",
                coefficient_count(max_degree),
                values.len()
            )))?
        }
        Ok(CoefficientSet { max_degree, values })
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Coefficient at (n, m), or `None` if the pair is not part of this set.
    pub fn get(&self, n: usize, m: usize, harmonic: Harmonic) -> Option<f64> {
        canonical_index(n, m, harmonic).and_then(|i| self.values.get(i).copied())
    }

    /// g(n, m); degrees beyond this set read as zero
    pub fn g(&self, n: usize, m: usize) -> f64 {
        self.get(n, m, Harmonic::G).unwrap_or(0.0)
    }

    /// h(n, m); degrees beyond this set, and m = 0, read as zero
    pub fn h(&self, n: usize, m: usize) -> f64 {
        self.get(n, m, Harmonic::H).unwrap_or(0.0)
    }
}

/// A single (n, m) record for one variant, as handed over by a coefficient source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientRow {
    pub n: usize,
    pub m: usize,
    pub g: f64,
    pub h: f64,
}

/// Supplies coefficient records for a segment. Implementations own the storage format; the
/// records they return are validated against the canonical order by [`load`].
pub trait CoefficientSource {
    /// Returns the records for degrees 1 through `degree` of the block at `locator`.
    fn rows(
        &self,
        locator: ModelLocator,
        variant: CoefficientVariant,
        degree: usize,
    ) -> Result<Vec<CoefficientRow>>;
}

/// A full line of a model block: main field coefficients and their rates of change
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRecord {
    pub n: usize,
    pub m: usize,
    pub g: f64,
    pub h: f64,
    pub g_sv: f64,
    pub h_sv: f64,
}

/// Coefficient blocks held in memory, keyed by locator
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    blocks: HashMap<ModelLocator, Vec<ModelRecord>>,
}
impl InMemorySource {
    pub fn new() -> InMemorySource {
        InMemorySource::default()
    }

    /// Stores a block, replacing anything previously stored at `locator`.
    pub fn insert(&mut self, locator: ModelLocator, records: Vec<ModelRecord>) {
        self.blocks.insert(locator, records);
    }
}
impl CoefficientSource for InMemorySource {
    fn rows(
        &self,
        locator: ModelLocator,
        variant: CoefficientVariant,
        degree: usize,
    ) -> Result<Vec<CoefficientRow>> {
        let block = self.blocks.get(&locator).ok_or_else(|| {
            GeomagError::MalformedModel(format!("No coefficients stored at locator {}", locator.0))
        })?;
        Ok(block
            .iter()
            .take(record_count(degree))
            .map(|r| match variant {
                CoefficientVariant::MainField => CoefficientRow {
                    n: r.n,
                    m: r.m,
                    g: r.g,
                    h: r.h,
                },
                CoefficientVariant::SecularVariation => CoefficientRow {
                    n: r.n,
                    m: r.m,
                    g: r.g_sv,
                    h: r.h_sv,
                },
            })
            .collect())
    }
}

/// Reads one variant of a segment into a `CoefficientSet`, checking every record sits at its
/// canonical position.
///
/// # Errors
/// Will return `Err` if the variant's degree is 0 or unsupported, if the source fails, or if a
/// record's (n, m) does not match the expected sequence.
pub fn load<S: CoefficientSource + ?Sized>(
    segment: &ModelSegment,
    variant: CoefficientVariant,
    source: &S,
) -> Result<CoefficientSet> {
    let degree = match variant {
        CoefficientVariant::MainField => segment.n_main,
        CoefficientVariant::SecularVariation => segment.n_sv,
    };
    check_degree(degree).map_err(|e| match e {
        GeomagError::MalformedModel(msg) => {
            GeomagError::MalformedModel(format!("{}: {msg}", segment.name))
        }
        other => other,
    })?;

    let rows = source.rows(segment.locator, variant, degree)?;
    if rows.len() != record_count(degree) {
        Err(GeomagError::MalformedModel(format!(
            "{}: expected {} {variant:?} records for degree {degree}, found {}",
            segment.name,
            record_count(degree),
            rows.len()
        )))?
    }

    let expected = (1..=degree).flat_map(|n| (0..=n).map(move |m| (n, m)));
    let mut values = Vec::with_capacity(coefficient_count(degree));
    for (position, ((n, m), row)) in expected.zip(rows.iter()).enumerate() {
        if row.n != n || row.m != m {
            Err(GeomagError::MalformedModel(format!(
                "{}: record {} is ({}, {}), expected ({n}, {m})",
                segment.name,
                position + 1,
                row.n,
                row.m
            )))?
        }
        values.push(row.g);
        if m != 0 {
            values.push(row.h);
        }
    }
    CoefficientSet::new(degree, values)
}
