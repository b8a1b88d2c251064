pub mod config;
pub mod order;
pub mod resample;

use std::borrow::Cow;
use std::sync::Arc;

use ndarray::{Array3, ArrayView2, Axis};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::annotate::annotate;
use crate::cache::DerivedCache;
use crate::consts::{DERIVED_BANDS, PARALLEL_IMAGE_THRESHOLD};
use crate::error::{ClearskyError, Result};
use crate::image::{Band, RasterImage};
use crate::mask::{derive_masks, MaskConfig, MaskSet};
use crate::score::{cloud_distance, QualityScore};
use crate::stack::mean::mean_stack;
use crate::stack::median::median_stack;
use crate::stack::medoid::medoid_stack;
use crate::stack::mode::mode_stack;
use crate::stack::mosaic::{mosaic, quality_mosaic};
use crate::stack::{Reduced, StackLayer};

pub use config::{CompositeMethod, CompositeSpec, ResamplingMethod, StackOrdering};
pub use order::stack_order;
pub use resample::Resampler;

/// Builds one composite image from a stack of compatible images.
///
/// The first image defines the output grid; others are handed to the
/// resampler when their grid differs.
pub struct CompositeBuilder<'a> {
    spec: CompositeSpec,
    mask_config: MaskConfig,
    resampler: Option<&'a dyn Resampler>,
    cache: Option<&'a DerivedCache>,
}

impl<'a> CompositeBuilder<'a> {
    pub fn new(spec: CompositeSpec) -> Self {
        Self {
            spec,
            mask_config: MaskConfig::default(),
            resampler: None,
            cache: None,
        }
    }

    pub fn with_mask_config(mut self, mask_config: MaskConfig) -> Self {
        self.mask_config = mask_config;
        self
    }

    pub fn with_resampler(mut self, resampler: &'a dyn Resampler) -> Self {
        self.resampler = Some(resampler);
        self
    }

    pub fn with_cache(mut self, cache: &'a DerivedCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn spec(&self) -> &CompositeSpec {
        &self.spec
    }

    /// Reduce `images` into a single image.
    ///
    /// The output carries the reduced spectral bands followed by the reduced
    /// mask and score bands. Its validity is true where at least one stack
    /// member contributed, its footprint is the grid bounds and its
    /// timestamp is the earliest acquisition.
    pub fn build(&self, images: &[RasterImage]) -> Result<RasterImage> {
        let first = images.first().ok_or(ClearskyError::EmptyStack)?;
        self.mask_config.validate()?;

        let spectral = first.spectral_band_names();
        if spectral.is_empty() {
            return Err(ClearskyError::IncompatibleStack(format!(
                "image {} has no spectral bands",
                first.id
            )));
        }
        for image in images {
            check_member(first, image, &spectral)?;
        }

        let images = self.reconcile_grids(images)?;

        let derived: Vec<(Arc<MaskSet>, Arc<QualityScore>)> = if images.len() >= PARALLEL_IMAGE_THRESHOLD {
            images
                .par_iter()
                .map(|image| self.derive(image))
                .collect::<Result<_>>()?
        } else {
            images
                .iter()
                .map(|image| self.derive(image))
                .collect::<Result<_>>()?
        };

        let annotated: Vec<RasterImage> = images
            .iter()
            .zip(&derived)
            .map(|(image, (masks, score))| annotate(image, masks, score, self.spec.apply_mask))
            .collect::<Result<_>>()?;

        let masks: Vec<&MaskSet> = derived.iter().map(|(m, _)| &**m).collect();
        let order = stack_order(&annotated, &masks, &self.spec.ordering)?;
        debug!(order = ?order, "Stack order");

        let band_names: Vec<&str> = spectral
            .iter()
            .map(String::as_str)
            .chain(DERIVED_BANDS)
            .collect();
        let layers = order
            .iter()
            .map(|&i| to_layer(&annotated[i], &derived[i].1, &band_names))
            .collect::<Result<Vec<_>>>()?;

        let reduced = self.reduce(first, &layers, spectral.len())?;
        let out = assemble(first, &annotated, &band_names, reduced, self.spec.method)?;

        info!(
            method = %self.spec.method,
            images = layers.len(),
            bands = band_names.len(),
            "Composite built"
        );
        Ok(out)
    }

    fn reconcile_grids<'i>(&self, images: &'i [RasterImage]) -> Result<Vec<Cow<'i, RasterImage>>> {
        let grid = &images[0].grid;
        images
            .iter()
            .map(|image| {
                if image.grid == *grid {
                    return Ok(Cow::Borrowed(image));
                }
                let resampler = self.resampler.ok_or_else(|| {
                    ClearskyError::IncompatibleStack(format!(
                        "image {} is not on the stack grid and no resampler was given",
                        image.id
                    ))
                })?;
                debug!(image = %image.id, method = %self.spec.resampling, "Resampling onto stack grid");
                let resampled = resampler.resample(image, grid, self.spec.resampling)?;
                if resampled.shape() != grid.shape() {
                    return Err(ClearskyError::IncompatibleStack(format!(
                        "resampled image {} has shape {:?}, expected {:?}",
                        image.id,
                        resampled.shape(),
                        grid.shape()
                    )));
                }
                Ok(Cow::Owned(resampled))
            })
            .collect()
    }

    fn derive(&self, image: &RasterImage) -> Result<(Arc<MaskSet>, Arc<QualityScore>)> {
        match self.cache {
            Some(cache) => Ok((
                cache.masks(image, &self.mask_config)?,
                cache.score(image, &self.mask_config)?,
            )),
            None => {
                let masks = derive_masks(image, &self.mask_config)?;
                let score = cloud_distance(image, &masks, &self.mask_config)?;
                Ok((Arc::new(masks), Arc::new(score)))
            }
        }
    }

    fn reduce(&self, first: &RasterImage, layers: &[StackLayer], n_spectral: usize) -> Result<Reduced> {
        match self.spec.method {
            CompositeMethod::Mosaic => mosaic(layers),
            CompositeMethod::QMosaic if !first.variant.supports_cloud_mask() => {
                warn!(
                    variant = %first.variant,
                    "No cloud masking for this sensor, using mosaic instead of q-mosaic"
                );
                mosaic(layers)
            }
            CompositeMethod::QMosaic => quality_mosaic(layers),
            CompositeMethod::Mean => mean_stack(layers),
            CompositeMethod::Median => median_stack(layers),
            CompositeMethod::Mode => mode_stack(layers),
            CompositeMethod::Medoid => {
                let spectral: Vec<usize> = (0..n_spectral).collect();
                medoid_stack(layers, &spectral)
            }
        }
    }
}

/// Composite `images` with default mask settings and no resampler.
pub fn composite(images: &[RasterImage], spec: &CompositeSpec) -> Result<RasterImage> {
    CompositeBuilder::new(spec.clone()).build(images)
}

fn check_member(first: &RasterImage, image: &RasterImage, spectral: &[String]) -> Result<()> {
    if !image.variant.is_compatible_with(&first.variant) {
        return Err(ClearskyError::IncompatibleStack(format!(
            "cannot composite {} ({}) with {} ({})",
            image.id, image.variant, first.id, first.variant
        )));
    }
    if let Some(name) = spectral.iter().find(|name| image.band(name).is_none()) {
        return Err(ClearskyError::IncompatibleStack(format!(
            "image {} has no band {name}",
            image.id
        )));
    }
    Ok(())
}

fn to_layer(image: &RasterImage, score: &QualityScore, band_names: &[&str]) -> Result<StackLayer> {
    let views = band_names
        .iter()
        .map(|name| image.require_band(name).map(|b| b.data.view()))
        .collect::<Result<Vec<ArrayView2<f32>>>>()?;
    let data: Array3<f32> = ndarray::stack(Axis(0), &views)
        .map_err(|e| ClearskyError::IncompatibleStack(format!("image {}: {e}", image.id)))?;
    Ok(StackLayer::new(data, image.validity()).with_score(score.data.clone()))
}

fn assemble(
    first: &RasterImage,
    annotated: &[RasterImage],
    band_names: &[&str],
    reduced: Reduced,
    method: CompositeMethod,
) -> Result<RasterImage> {
    let timestamp = annotated
        .iter()
        .map(|im| im.timestamp)
        .min()
        .unwrap_or(first.timestamp);

    let mut out = RasterImage::new(
        format!("{method}-composite"),
        timestamp,
        first.grid.clone(),
        first.variant,
    )
    .with_footprint(first.grid.bounds_polygon());

    let template = &annotated[0];
    for (i, name) in band_names.iter().enumerate() {
        let scale = template
            .band(name)
            .map_or_else(|| template.min_scale(), |b| b.scale);
        let data = reduced.data.index_axis(Axis(0), i).to_owned();
        out = out.with_band(Band::new(*name, data, scale))?;
    }
    out.with_mask(reduced.valid)
}
