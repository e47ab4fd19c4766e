//! Builds the effective coefficient set for a date, either by extrapolating a main field with
//! its secular variation or by interpolating between two adjacent epochs.
use crate::error::GeomagError;
use crate::model::coefficients::{
    coefficient_count, load, CoefficientSet, CoefficientSource, CoefficientVariant,
};
use crate::model::segment::ModelCatalog;
use tracing::debug;

type Result<T> = std::result::Result<T, GeomagError>;

/// Extrapolates `main` from `epoch` to `date` using the rates in `sv`. Where one set is longer
/// than the other, the excess main field terms are kept as is and the excess rate terms are
/// scaled by the elapsed time alone.
pub fn extrapolate(
    date: f64,
    epoch: f64,
    main: &CoefficientSet,
    sv: &CoefficientSet,
) -> Result<CoefficientSet> {
    let elapsed = date - epoch;
    let degree = main.max_degree().max(sv.max_degree());
    let (base, rate) = (main.as_slice(), sv.as_slice());
    let values = (0..coefficient_count(degree))
        .map(|k| match (base.get(k), rate.get(k)) {
            (Some(b), Some(r)) => b + elapsed * r,
            (Some(b), None) => *b,
            (None, Some(r)) => elapsed * r,
            (None, None) => 0.0,
        })
        .collect();
    CoefficientSet::new(degree, values)
}

/// Linearly interpolates between the coefficients of two epochs. A degree missing from one of
/// the sets is treated as all-zero on that side, so the earlier model's excess terms fade out
/// with `1 - factor` and the later model's excess terms fade in with `factor`.
///
/// # Errors
/// Will return `Err` if the two years coincide.
pub fn interpolate(
    date: f64,
    early_year: f64,
    early: &CoefficientSet,
    late_year: f64,
    late: &CoefficientSet,
) -> Result<CoefficientSet> {
    let span = late_year - early_year;
    if span == 0.0 || !span.is_finite() {
        Err(GeomagError::NumericDomain(format!(
            "Cannot interpolate between epochs {early_year} and {late_year}"
        )))?
    }
    let factor = (date - early_year) / span;
    let degree = early.max_degree().max(late.max_degree());
    let (e, l) = (early.as_slice(), late.as_slice());
    let values = (0..coefficient_count(degree))
        .map(|k| {
            let early_term = e.get(k).copied().unwrap_or(0.0);
            let late_term = l.get(k).copied().unwrap_or(0.0);
            // Written so both endpoints are reproduced exactly
            (1.0 - factor) * early_term + factor * late_term
        })
        .collect();
    CoefficientSet::new(degree, values)
}

/// The two coefficient sets a segment needs, and how to combine them for a date
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalModel {
    Extrapolated {
        epoch: f64,
        main: CoefficientSet,
        sv: CoefficientSet,
    },
    Interpolated {
        early_year: f64,
        early: CoefficientSet,
        late_year: f64,
        late: CoefficientSet,
    },
}
impl TemporalModel {
    /// Loads the coefficient sets for the segment at `index`, pairing an interpolating segment
    /// with the segment after it.
    ///
    /// # Errors
    /// Will return `Err` if `index` is not in the catalog, an interpolating segment has no
    /// successor, or loading any of the coefficient sets fails.
    pub fn load<S: CoefficientSource + ?Sized>(
        catalog: &ModelCatalog,
        index: usize,
        source: &S,
    ) -> Result<TemporalModel> {
        let segment = catalog.segments().get(index).ok_or_else(|| {
            GeomagError::MalformedModel(format!("No segment at position {index}"))
        })?;
        let main = load(segment, CoefficientVariant::MainField, source)?;
        if !segment.is_interpolating() {
            debug!(
                model = %segment.name,
                n_main = segment.n_main,
                n_sv = segment.n_sv,
                "Extrapolating from epoch"
            );
            let sv = load(segment, CoefficientVariant::SecularVariation, source)?;
            return Ok(TemporalModel::Extrapolated {
                epoch: segment.epoch,
                main,
                sv,
            });
        }
        let next = catalog.following(index).ok_or_else(|| {
            GeomagError::MalformedModel(format!(
                "{}: no following segment to interpolate to",
                segment.name
            ))
        })?;
        debug!(early = %segment.name, late = %next.name, "Interpolating between epochs");
        let late = load(next, CoefficientVariant::MainField, source)?;
        Ok(TemporalModel::Interpolated {
            early_year: segment.year_min,
            early: main,
            late_year: next.year_min,
            late,
        })
    }

    /// Effective coefficients at `date`.
    pub fn at(&self, date: f64) -> Result<CoefficientSet> {
        match self {
            TemporalModel::Extrapolated { epoch, main, sv } => extrapolate(date, *epoch, main, sv),
            TemporalModel::Interpolated {
                early_year,
                early,
                late_year,
                late,
            } => interpolate(date, *early_year, early, *late_year, late),
        }
    }

    /// Effective coefficients at `date` and one year later, the pair the rates of change are
    /// differenced from.
    pub fn bracket(&self, date: f64) -> Result<(CoefficientSet, CoefficientSet)> {
        Ok((self.at(date)?, self.at(date + 1.0)?))
    }
}
