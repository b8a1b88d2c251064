use ndarray::{Array2, Zip};

use crate::error::{ClearskyError, Result};
use crate::image::RasterImage;
use crate::sensor::profile::{AerosolLayout, QaLayout};
use crate::sensor::profile;

use super::config::MaskConfig;
use super::MaskSet;

/// Integer QA value stored in a float band.
pub(crate) fn qa_value(v: f32) -> u32 {
    if v.is_finite() && v > 0.0 {
        v as u32
    } else {
        0
    }
}

/// Decode cloud, shadow and fill from a bit-packed quality band.
///
/// Returns `(cloud, shadow, fill)`. Without a fill bit every pixel is filled;
/// without a shadow bit no pixel is shadow.
pub fn decode_qa(qa: &Array2<f32>, layout: &QaLayout) -> (Array2<bool>, Array2<bool>, Array2<bool>) {
    let cloud = qa.mapv(|v| qa_value(v) & layout.cloud_bits != 0);
    let shadow = match layout.shadow_bit {
        Some(bit) => qa.mapv(|v| qa_value(v) & (1 << bit) != 0),
        None => Array2::from_elem(qa.dim(), false),
    };
    let fill = match layout.fill_bit {
        Some(bit) => qa.mapv(|v| qa_value(v) & (1 << bit) == 0),
        None => Array2::from_elem(qa.dim(), true),
    };
    (cloud, shadow, fill)
}

/// Pixels whose aerosol level exceeds the layout's maximum.
pub fn high_aerosol(band: &Array2<f32>, layout: &AerosolLayout) -> Array2<bool> {
    band.mapv(|v| layout.level.decode(qa_value(v)) > layout.max_level)
}

/// Masks for sensors with a pixel quality band (Landsat, Sentinel-2 QA60).
pub(super) fn qa_masks(image: &RasterImage, _config: &MaskConfig) -> Result<MaskSet> {
    let profile = profile(image.variant);
    let layout = profile
        .qa
        .ok_or_else(|| ClearskyError::UnsupportedVariant(image.variant.to_string()))?;

    let qa = image.require_band(layout.band)?;
    let (mut cloud, shadow, mut fill) = decode_qa(&qa.data, &layout);

    if let Some(aerosol) = profile.aerosol {
        let band = image.require_band(aerosol.band)?;
        let hazy = high_aerosol(&band.data, &aerosol);
        Zip::from(&mut cloud).and(&hazy).for_each(|c, &a| *c |= a);
    }

    if let Some(own) = image.mask() {
        Zip::from(&mut fill).and(own).for_each(|f, &m| *f &= m);
    }

    MaskSet::new(cloud, shadow, fill)
}
