use ndarray::Zip;
use tracing::debug;

use crate::error::{ClearskyError, Result};
use crate::image::RasterImage;
use crate::sensor::profile;

use super::config::MaskConfig;
use super::morphology::dilate;
use super::qa::qa_value;
use super::shadow::project_along_azimuth;
use super::MaskSet;

/// Catalog property holding the mean solar azimuth.
pub const SOLAR_AZIMUTH_PROPERTY: &str = "MEAN_SOLAR_AZIMUTH_ANGLE";

/// Shadow-cast azimuth for a given solar azimuth, in [0, 360).
pub fn shadow_azimuth(solar_azimuth: f64) -> f64 {
    (solar_azimuth - 90.0).rem_euclid(360.0)
}

/// Sentinel-2 masks from the companion cloud probability raster.
///
/// Cloud is probability above the threshold. Shadow candidates are the pixels
/// reached by projecting cloud along the shadow-cast azimuth up to
/// `cloud_proj_dist_km`. For SR, candidates are intersected with the SCL
/// dark/shadow classes dilated by `shadow_buffer_m`.
pub(super) fn cloud_probability_masks(image: &RasterImage, config: &MaskConfig) -> Result<MaskSet> {
    let layout = profile(image.variant)
        .cloud_prob
        .ok_or_else(|| ClearskyError::UnsupportedVariant(image.variant.to_string()))?;

    let probability = image.require_companion(layout.probability_band)?;
    let threshold = config.cloud_prob_threshold;
    let cloud = probability.data.mapv(|p| p > threshold);

    let solar_azimuth = image
        .properties
        .solar_azimuth
        .ok_or_else(|| ClearskyError::missing(&image.id, SOLAR_AZIMUTH_PROPERTY))?;
    let scale = image.min_scale();
    let azimuth = shadow_azimuth(solar_azimuth);
    let proj_px = config.cloud_proj_dist_km * 1000.0 / scale;
    debug!(image = %image.id, azimuth, proj_px, "Projecting cloud shadows");

    let mut shadow = project_along_azimuth(&cloud, azimuth, proj_px);

    if let Some(scl_name) = layout.scl_band {
        let scl = image.require_band(scl_name)?;
        let classes = layout.scl_shadow_classes;
        let dark = scl.data.mapv(|v| classes.contains(&qa_value(v)));
        let dark = dilate(&dark, config.shadow_buffer_m / scale);
        Zip::from(&mut shadow).and(&dark).for_each(|s, &d| *s &= d);
    }

    MaskSet::new(cloud, shadow, image.validity())
}
