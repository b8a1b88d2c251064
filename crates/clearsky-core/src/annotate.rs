use ndarray::{Array2, Zip};

use crate::consts::{
    CLOUD_DIST_BAND, CLOUD_MASK_BAND, FILL_MASK_BAND, SHADOW_MASK_BAND, VALID_MASK_BAND,
};
use crate::error::Result;
use crate::image::{Band, RasterImage};
use crate::mask::MaskSet;
use crate::score::QualityScore;

fn as_band(mask: &Array2<bool>) -> Array2<f32> {
    mask.mapv(|m| if m { 1.0 } else { 0.0 })
}

/// New image with the mask and score bands appended.
///
/// With `apply_mask`, pixels outside `VALID_MASK` are also masked out of the
/// returned image.
pub fn annotate(
    image: &RasterImage,
    masks: &MaskSet,
    score: &QualityScore,
    apply_mask: bool,
) -> Result<RasterImage> {
    let scale = image.min_scale();
    let mut out = image
        .clone()
        .with_band(Band::new(CLOUD_MASK_BAND, as_band(masks.cloud()), scale))?
        .with_band(Band::new(SHADOW_MASK_BAND, as_band(masks.shadow()), scale))?
        .with_band(Band::new(FILL_MASK_BAND, as_band(masks.fill()), scale))?
        .with_band(Band::new(VALID_MASK_BAND, as_band(masks.valid()), scale))?
        .with_band(Band::new(CLOUD_DIST_BAND, score.data.clone(), scale))?;

    if apply_mask {
        let mut validity = out.validity();
        Zip::from(&mut validity)
            .and(masks.valid())
            .for_each(|v, &m| *v &= m);
        out = out.with_mask(validity)?;
    }
    Ok(out)
}
