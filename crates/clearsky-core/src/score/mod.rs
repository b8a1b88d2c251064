pub mod distance;

use ndarray::{Array2, Zip};

use crate::error::{ClearskyError, Result};
use crate::image::RasterImage;
use crate::mask::morphology::opening;
use crate::mask::{MaskConfig, MaskSet};

/// Per-pixel distance (px) to the nearest cloud or shadow, zero outside fill.
///
/// Higher is better. Values are capped at the scoring neighbourhood radius.
#[derive(Clone, Debug, PartialEq)]
pub struct QualityScore {
    pub data: Array2<f32>,
}

impl QualityScore {
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }
}

/// Score an image by its distance to cloud/shadow contamination.
///
/// 1. Union of cloud and shadow
/// 2. Opening with a `opening_radius_px` disk to drop speckle
/// 3. Squared Euclidean distance transform bounded by
///    `max_cloud_distance_m / native scale` whole pixels, then square root
/// 4. Zero outside the fill mask
pub fn cloud_distance(image: &RasterImage, masks: &MaskSet, config: &MaskConfig) -> Result<QualityScore> {
    let expected = image.shape();
    if masks.dim() != expected {
        return Err(ClearskyError::InvalidDimensions {
            expected,
            found: masks.dim(),
        });
    }

    let contaminated = opening(&masks.contaminated(), config.opening_radius_px);
    let radius_px = (config.max_cloud_distance_m / image.min_scale()).floor();
    let squared = distance::bounded_squared_distance(&contaminated, radius_px);

    let data = Zip::from(&squared)
        .and(masks.fill())
        .map_collect(|&d2, &filled| if filled { d2.sqrt() as f32 } else { 0.0 });

    Ok(QualityScore { data })
}
