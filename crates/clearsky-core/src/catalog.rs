use std::collections::HashMap;

use chrono::{DateTime, Utc};
use geo::{Intersects, Polygon};
use tracing::debug;

use crate::error::{ClearskyError, Result};
use crate::image::{Band, RasterImage};
use crate::sensor::profile;
use crate::sensor::SensorVariant;

/// Split a catalog image id into its collection and index parts.
///
/// `"COPERNICUS/S2_SR/20220101T083331_20220101T085105_T34HCH"` becomes
/// `("COPERNICUS/S2_SR", "20220101T083331_20220101T085105_T34HCH")`.
pub fn split_id(id: &str) -> (&str, &str) {
    match id.rfind('/') {
        Some(pos) => (&id[..pos], &id[pos + 1..]),
        None => ("", id),
    }
}

/// Provider of candidate images, implemented by the catalog collaborator.
///
/// May return candidates outside the requested range or region; search
/// applies its own filters.
pub trait CatalogSource: Sync {
    fn candidates(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        region: &Polygon<f64>,
    ) -> Result<Vec<RasterImage>>;
}

/// Read-only, ordered set of images from one sensor family.
#[derive(Clone, Debug, Default)]
pub struct Collection {
    images: Vec<RasterImage>,
}

impl Collection {
    /// Build a collection, rejecting images whose variants cannot be mixed
    /// (e.g. Sentinel-2 SR with TOA; Landsat 8 with 9 is fine).
    pub fn from_images(images: Vec<RasterImage>) -> Result<Self> {
        if let Some(first) = images.first() {
            if let Some(odd) = images
                .iter()
                .find(|im| !im.variant.is_compatible_with(&first.variant))
            {
                return Err(ClearskyError::IncompatibleStack(format!(
                    "{} ({}) cannot be mixed with {} ({})",
                    odd.id, odd.variant, first.id, first.variant
                )));
            }
        }
        Ok(Self { images })
    }

    pub fn images(&self) -> &[RasterImage] {
        &self.images
    }

    pub fn into_images(self) -> Vec<RasterImage> {
        self.images
    }

    pub fn variant(&self) -> Option<SensorVariant> {
        self.images.first().map(|im| im.variant)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RasterImage> {
        self.images.iter().find(|im| im.id == id)
    }

    /// Sub-collection of the given ids, in the order given.
    pub fn select_ids<S: AsRef<str>>(&self, ids: &[S]) -> Result<Collection> {
        let images = ids
            .iter()
            .map(|id| {
                self.get(id.as_ref())
                    .cloned()
                    .ok_or_else(|| ClearskyError::UnknownImage(id.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Collection { images })
    }
}

impl CatalogSource for Collection {
    fn candidates(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        region: &Polygon<f64>,
    ) -> Result<Vec<RasterImage>> {
        Ok(self
            .images
            .iter()
            .filter(|im| im.timestamp >= start && im.timestamp < end)
            .filter(|im| match &im.footprint {
                Some(footprint) => footprint.intersects(region),
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// Attach cloud probability rasters to the Sentinel-2 images they belong to.
///
/// Probability images are matched on the index part of their id. Each
/// supplies its first band as the image's `probability` companion. Images
/// without a match are returned untouched; masking them later fails with a
/// missing-data error.
pub fn join_cloud_probability(
    images: Vec<RasterImage>,
    probabilities: &[RasterImage],
) -> Result<Vec<RasterImage>> {
    let by_index: HashMap<&str, &RasterImage> = probabilities
        .iter()
        .map(|p| (split_id(&p.id).1, p))
        .collect();

    images
        .into_iter()
        .map(|image| {
            let Some(layout) = profile(image.variant).cloud_prob else {
                return Ok(image);
            };
            let index = split_id(&image.id).1.to_string();
            match by_index.get(index.as_str()).and_then(|p| p.bands().first()) {
                Some(band) => {
                    debug!(image = %image.id, "Joined cloud probability");
                    image.with_companion(Band::new(
                        layout.probability_band,
                        band.data.clone(),
                        band.scale,
                    ))
                }
                None => Ok(image),
            }
        })
        .collect()
}
