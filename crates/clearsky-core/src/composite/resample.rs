use crate::error::Result;
use crate::geo_grid::GeoGrid;
use crate::image::RasterImage;

use super::config::ResamplingMethod;

/// Reprojects an image onto another grid.
///
/// Implemented by the transport/warping collaborator; the composite builder
/// only calls it for stack members whose grid differs from the first one.
pub trait Resampler: Sync {
    fn resample(&self, image: &RasterImage, grid: &GeoGrid, method: ResamplingMethod) -> Result<RasterImage>;
}

impl<F> Resampler for F
where
    F: Fn(&RasterImage, &GeoGrid, ResamplingMethod) -> Result<RasterImage> + Sync,
{
    fn resample(&self, image: &RasterImage, grid: &GeoGrid, method: ResamplingMethod) -> Result<RasterImage> {
        self(image, grid, method)
    }
}
