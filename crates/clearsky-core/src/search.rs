use chrono::{DateTime, Utc};
use geo::Polygon;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::DerivedCache;
use crate::catalog::CatalogSource;
use crate::error::{ClearskyError, Result};
use crate::image::RasterImage;
use crate::mask::{derive_masks, MaskConfig};
use crate::portion::{portions, PortionMetrics};
use crate::sensor::SensorVariant;

/// Minimum coverage an image needs to be kept by a search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortionFilter {
    /// Minimum fill portion (%).
    #[serde(default)]
    pub fill_portion_min: f64,
    /// Minimum cloudless portion (%). Ignored in favour of the fill portion
    /// for variants without cloud masking.
    #[serde(default)]
    pub cloudless_portion_min: f64,
}

impl PortionFilter {
    pub fn accepts(&self, metrics: &PortionMetrics, variant: SensorVariant) -> bool {
        metrics.fill_portion >= self.fill_portion_min
            && metrics.effective_cloudless(variant) >= self.cloudless_portion_min
    }
}

/// Date range, region and coverage thresholds of a search.
#[derive(Clone, Debug)]
pub struct SearchParams {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    pub region: Polygon<f64>,
    pub filter: PortionFilter,
}

impl SearchParams {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, region: Polygon<f64>) -> Self {
        Self {
            start,
            end,
            region,
            filter: PortionFilter::default(),
        }
    }

    pub fn with_fill_portion_min(mut self, min: f64) -> Self {
        self.filter.fill_portion_min = min;
        self
    }

    pub fn with_cloudless_portion_min(mut self, min: f64) -> Self {
        self.filter.cloudless_portion_min = min;
        self
    }
}

/// An image kept by a search, with its coverage over the search region.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub image: RasterImage,
    pub portions: PortionMetrics,
}

/// Filter and order catalog candidates by date, region and coverage.
///
/// Candidates outside `[start, end)` or below the portion thresholds are
/// dropped, so an empty range yields no results. A start after the end is
/// an error. Portions are evaluated in parallel; images missing companion
/// data are logged and skipped rather than failing the whole search. The
/// result is sorted by acquisition time, then id.
pub fn search<S>(
    source: &S,
    params: &SearchParams,
    config: &MaskConfig,
    cache: Option<&DerivedCache>,
) -> Result<Vec<SearchResult>>
where
    S: CatalogSource + ?Sized,
{
    if params.start > params.end {
        return Err(ClearskyError::InvalidConfig(format!(
            "search start {} is after end {}",
            params.start, params.end
        )));
    }
    config.validate()?;

    let candidates: Vec<RasterImage> = source
        .candidates(params.start, params.end, &params.region)?
        .into_iter()
        .filter(|im| im.timestamp >= params.start && im.timestamp < params.end)
        .collect();
    let total = candidates.len();

    let evaluated: Vec<Option<SearchResult>> = candidates
        .into_par_iter()
        .map(|image| evaluate(image, params, config, cache))
        .collect::<Result<_>>()?;

    let mut results: Vec<SearchResult> = evaluated.into_iter().flatten().collect();
    results.sort_by(|a, b| {
        a.image
            .timestamp
            .cmp(&b.image.timestamp)
            .then_with(|| a.image.id.cmp(&b.image.id))
    });

    info!(candidates = total, kept = results.len(), "Search complete");
    Ok(results)
}

fn evaluate(
    image: RasterImage,
    params: &SearchParams,
    config: &MaskConfig,
    cache: Option<&DerivedCache>,
) -> Result<Option<SearchResult>> {
    let masks = match cache {
        Some(cache) => cache.masks(&image, config),
        None => derive_masks(&image, config).map(std::sync::Arc::new),
    };
    let masks = match masks {
        Ok(m) => m,
        Err(err @ ClearskyError::MissingAuxData { .. }) => {
            warn!(image = %image.id, error = %err, "Skipping image");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };

    let metrics = portions(&image, &masks, Some(&params.region))?;
    if !params.filter.accepts(&metrics, image.variant) {
        return Ok(None);
    }
    Ok(Some(SearchResult {
        image,
        portions: metrics,
    }))
}
