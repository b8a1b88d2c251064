use crate::consts::REFLECTANCE_RANGE;
use crate::image::RasterImage;
use crate::sensor::profile;

/// Rescale surface reflectance bands to the 0-10000 range.
///
/// Products stored as `dn * gain + offset` reflectance (Landsat collection 2)
/// have their matching bands converted; products already stored as 0-10000
/// integers are returned unchanged. No-data pixels keep their mask.
pub fn scale_reflectance(image: &RasterImage) -> RasterImage {
    let Some(scale) = profile(image.variant).reflectance else {
        return image.clone();
    };
    image.map_bands(|band| {
        if band.name.starts_with(scale.band_prefix) {
            band.data
                .mapv(|dn| (dn * scale.gain + scale.offset) * REFLECTANCE_RANGE)
        } else {
            band.data.clone()
        }
    })
}
