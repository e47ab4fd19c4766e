use crate::error::GeomagError;
use tracing::debug;

type Result<T> = std::result::Result<T, GeomagError>;

/// Opaque handle a coefficient source uses to find a segment's records, e.g. a byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelLocator(pub u64);

/// Metadata for one epoch of a geomagnetic model, as read from the model catalog
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSegment {
    pub name: String,
    /// Reference year of the main field coefficients
    pub epoch: f64,
    /// Maximum degree of the main field
    pub n_main: usize,
    /// Maximum degree of the secular variation block, 0 if the segment has none
    pub n_sv: usize,
    pub year_min: f64,
    pub year_max: f64,
    /// Altitude bounds, km
    pub alt_min: f64,
    pub alt_max: f64,
    pub locator: ModelLocator,
}
impl ModelSegment {
    /// Whether this segment is blended with the following one instead of carrying its own rates
    pub fn is_interpolating(&self) -> bool {
        self.n_sv == 0
    }
}

/// Ordered list of model segments
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    segments: Vec<ModelSegment>,
}
impl ModelCatalog {
    /// Wraps the segments of a model, in the order they appear in the model file.
    ///
    /// # Errors
    /// Will return `Err` if there are no segments, if a segment has an inverted year or altitude
    /// range, or if the last segment has no secular variation block to extrapolate with.
    pub fn new(segments: Vec<ModelSegment>) -> Result<ModelCatalog> {
        let last = segments
            .last()
            .ok_or_else(|| GeomagError::MalformedModel("Model has no segments".to_string()))?;
        if last.is_interpolating() {
            Err(GeomagError::MalformedModel(format!(
                "{}: segment has no secular variation and no following segment to interpolate to",
                last.name
            )))?
        }
        for seg in &segments {
            if !(seg.year_min <= seg.year_max) {
                Err(GeomagError::MalformedModel(format!(
                    "{}: year range {} to {} is inverted",
                    seg.name, seg.year_min, seg.year_max
                )))?
            }
            if !(seg.alt_min <= seg.alt_max) {
                Err(GeomagError::MalformedModel(format!(
                    "{}: altitude range {} to {} is inverted",
                    seg.name, seg.alt_min, seg.alt_max
                )))?
            }
        }
        Ok(ModelCatalog { segments })
    }

    pub fn segments(&self) -> &[ModelSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment following the one at `index`, used as the late end of an interpolation
    pub fn following(&self, index: usize) -> Option<&ModelSegment> {
        self.segments.get(index + 1)
    }

    /// Earliest and latest year covered by any segment.
    pub fn year_range(&self) -> (f64, f64) {
        self.segments
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), seg| {
                (lo.min(seg.year_min), hi.max(seg.year_max))
            })
    }

    /// Picks the first segment whose validity ends after `date`, falling back to the last one.
    /// Returns the segment's position in the catalog alongside it.
    pub fn select(&self, date: f64) -> (usize, &ModelSegment) {
        let index = self
            .segments
            .iter()
            .position(|seg| date < seg.year_max)
            .unwrap_or(self.segments.len() - 1);
        let segment = &self.segments[index];
        debug!(date, index, model = %segment.name, "Selected model segment");
        (index, segment)
    }
}
