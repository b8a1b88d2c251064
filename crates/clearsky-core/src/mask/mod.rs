pub mod cloud_prob;
pub mod config;
pub mod morphology;
pub mod qa;
pub mod shadow;

use ndarray::{Array2, Zip};
use tracing::debug;

use crate::error::{ClearskyError, Result};
use crate::image::RasterImage;
use crate::sensor::SensorVariant;

pub use config::MaskConfig;

/// Co-registered cloud, shadow, fill and validity masks of one image.
///
/// `valid` is always `fill AND NOT (cloud OR shadow)`; it is computed on
/// construction and cannot be set independently.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskSet {
    cloud: Array2<bool>,
    shadow: Array2<bool>,
    fill: Array2<bool>,
    valid: Array2<bool>,
}

impl MaskSet {
    pub fn new(cloud: Array2<bool>, shadow: Array2<bool>, fill: Array2<bool>) -> Result<Self> {
        let expected = fill.dim();
        for found in [cloud.dim(), shadow.dim()] {
            if found != expected {
                return Err(ClearskyError::InvalidDimensions { expected, found });
            }
        }
        let valid = Zip::from(&cloud)
            .and(&shadow)
            .and(&fill)
            .map_collect(|&c, &s, &f| f && !(c || s));
        Ok(Self {
            cloud,
            shadow,
            fill,
            valid,
        })
    }

    /// Masks of a product without cloud detection: only fill is meaningful.
    pub fn fill_only(fill: Array2<bool>) -> Self {
        let none = Array2::from_elem(fill.dim(), false);
        Self {
            cloud: none.clone(),
            shadow: none,
            valid: fill.clone(),
            fill,
        }
    }

    pub fn cloud(&self) -> &Array2<bool> {
        &self.cloud
    }

    pub fn shadow(&self) -> &Array2<bool> {
        &self.shadow
    }

    pub fn fill(&self) -> &Array2<bool> {
        &self.fill
    }

    pub fn valid(&self) -> &Array2<bool> {
        &self.valid
    }

    pub fn dim(&self) -> (usize, usize) {
        self.fill.dim()
    }

    /// Union of cloud and shadow.
    pub fn contaminated(&self) -> Array2<bool> {
        Zip::from(&self.cloud)
            .and(&self.shadow)
            .map_collect(|&c, &s| c || s)
    }
}

impl AsRef<MaskSet> for MaskSet {
    fn as_ref(&self) -> &MaskSet {
        self
    }
}

type MaskFn = fn(&RasterImage, &MaskConfig) -> Result<MaskSet>;

/// Mask algorithm per sensor variant.
static MASK_ALGORITHMS: [(SensorVariant, MaskFn); 7] = [
    (SensorVariant::Generic, fill_masks),
    (SensorVariant::LandsatLegacy, qa::qa_masks),
    (SensorVariant::LandsatAerosol, qa::qa_masks),
    (SensorVariant::Sentinel2Qa, qa::qa_masks),
    (SensorVariant::Sentinel2CloudProbToa, cloud_prob::cloud_probability_masks),
    (SensorVariant::Sentinel2CloudProbSr, cloud_prob::cloud_probability_masks),
    (SensorVariant::ModisNbar, fill_masks),
];

fn algorithm_for(variant: SensorVariant) -> Option<MaskFn> {
    MASK_ALGORITHMS
        .iter()
        .find(|(v, _)| *v == variant)
        .map(|(_, f)| *f)
}

/// Masks for products without cloud support: the image's own validity.
fn fill_masks(image: &RasterImage, _config: &MaskConfig) -> Result<MaskSet> {
    Ok(MaskSet::fill_only(image.validity()))
}

/// Derive the mask set of an image with the algorithm of its sensor variant.
///
/// Pure and deterministic: the same image and config always give identical masks.
pub fn derive_masks(image: &RasterImage, config: &MaskConfig) -> Result<MaskSet> {
    let algorithm = algorithm_for(image.variant)
        .ok_or_else(|| ClearskyError::UnsupportedVariant(image.variant.to_string()))?;
    debug!(image = %image.id, variant = %image.variant, "Deriving masks");
    algorithm(image, config)
}
