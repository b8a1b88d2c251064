use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;
use crate::image::RasterImage;
use crate::mask::{derive_masks, MaskConfig, MaskSet};
use crate::score::{cloud_distance, QualityScore};

/// (image id, grid fingerprint, mask config fingerprint)
type CacheKey = (String, u64, u64);

/// Compute-once store of masks and scores for one pipeline run.
///
/// Owned by the caller and keyed by image id, grid and mask config, so the
/// mask and score functions themselves stay free of hidden state. An image
/// resampled onto another grid gets its own entries. Safe to share across
/// Rayon workers.
#[derive(Default)]
pub struct DerivedCache {
    masks: Mutex<HashMap<CacheKey, Arc<MaskSet>>>,
    scores: Mutex<HashMap<CacheKey, Arc<QualityScore>>>,
}

impl DerivedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Masks for `image`, derived on first request.
    pub fn masks(&self, image: &RasterImage, config: &MaskConfig) -> Result<Arc<MaskSet>> {
        let key = cache_key(image, config);
        if let Some(hit) = self.lookup(&self.masks, &key) {
            return Ok(hit);
        }
        // Derived outside the lock; a concurrent duplicate computes the same value.
        let masks = Arc::new(derive_masks(image, config)?);
        Ok(self.insert(&self.masks, key, masks))
    }

    /// Cloud distance score for `image`, derived on first request.
    pub fn score(&self, image: &RasterImage, config: &MaskConfig) -> Result<Arc<QualityScore>> {
        let key = cache_key(image, config);
        if let Some(hit) = self.lookup(&self.scores, &key) {
            return Ok(hit);
        }
        let masks = self.masks(image, config)?;
        let score = Arc::new(cloud_distance(image, &masks, config)?);
        Ok(self.insert(&self.scores, key, score))
    }

    /// Number of cached mask sets.
    pub fn len(&self) -> usize {
        self.masks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.masks.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.scores.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn lookup<T>(&self, map: &Mutex<HashMap<CacheKey, Arc<T>>>, key: &CacheKey) -> Option<Arc<T>> {
        map.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn insert<T>(&self, map: &Mutex<HashMap<CacheKey, Arc<T>>>, key: CacheKey, value: Arc<T>) -> Arc<T> {
        map.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_insert(value)
            .clone()
    }
}

fn cache_key(image: &RasterImage, config: &MaskConfig) -> CacheKey {
    (image.id.clone(), image.grid.fingerprint(), config.fingerprint())
}
