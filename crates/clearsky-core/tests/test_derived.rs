mod common;

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use ndarray::Array2;

use clearsky_core::annotate::annotate;
use clearsky_core::cache::DerivedCache;
use clearsky_core::consts::{CLOUD_DIST_BAND, CLOUD_MASK_BAND, DERIVED_BANDS, FILL_MASK_BAND, VALID_MASK_BAND};
use clearsky_core::geo_grid::GeoTransform;
use clearsky_core::image::Band;
use clearsky_core::mask::{derive_masks, MaskConfig};
use clearsky_core::reflectance::scale_reflectance;
use clearsky_core::score::cloud_distance;

use common::*;

fn qa_with_cloud_and_gap() -> Array2<f32> {
    let mut qa = Array2::zeros((6, 6));
    qa[[0, 0]] = 8.0;
    qa[[5, 5]] = 1.0;
    qa
}

#[test]
fn test_annotate_appends_bands() {
    let image = landsat_image("LE07_1", date(2022, 1, 3), qa_with_cloud_and_gap());
    let config = MaskConfig::default();
    let masks = derive_masks(&image, &config).unwrap();
    let score = cloud_distance(&image, &masks, &config).unwrap();

    let out = annotate(&image, &masks, &score, false).unwrap();
    for name in DERIVED_BANDS {
        assert!(out.band(name).is_some(), "{name}");
    }
    assert_eq!(out.band(CLOUD_MASK_BAND).unwrap().data[[0, 0]], 1.0);
    assert_eq!(out.band(FILL_MASK_BAND).unwrap().data[[5, 5]], 0.0);
    assert_eq!(out.band(VALID_MASK_BAND).unwrap().data[[1, 1]], 1.0);
    assert_eq!(out.band(CLOUD_DIST_BAND).unwrap().data, score.data);
    assert!(out.mask().is_none());
    // The source image is untouched.
    assert!(image.band(CLOUD_MASK_BAND).is_none());
}

#[test]
fn test_annotate_apply_mask() {
    let image = landsat_image("LE07_1", date(2022, 1, 3), qa_with_cloud_and_gap());
    let config = MaskConfig::default();
    let masks = derive_masks(&image, &config).unwrap();
    let score = cloud_distance(&image, &masks, &config).unwrap();

    let out = annotate(&image, &masks, &score, true).unwrap();
    assert_eq!(out.mask().unwrap(), masks.valid());
}

#[test]
fn test_annotate_twice_replaces_bands() {
    let image = generic_image("g", date(2022, 1, 1), 3, 1.0, 2.0);
    let config = MaskConfig::default();
    let masks = derive_masks(&image, &config).unwrap();
    let score = cloud_distance(&image, &masks, &config).unwrap();
    let once = annotate(&image, &masks, &score, false).unwrap();
    let twice = annotate(&once, &masks, &score, false).unwrap();
    assert_eq!(twice.bands().len(), 2 + DERIVED_BANDS.len());
    assert_eq!(twice.spectral_band_names(), vec!["B1", "B2"]);
}

#[test]
fn test_scale_landsat_reflectance() {
    let image = landsat_image("LE07_1", date(2022, 1, 3), Array2::zeros((2, 2)))
        .with_band(Band::new("SR_B1", Array2::from_elem((2, 2), 10_000.0), 30.0))
        .unwrap();
    let scaled = scale_reflectance(&image);
    // (10000 * 2.75e-5 - 0.2) * 10000 = 750
    assert_abs_diff_eq!(scaled.band("SR_B1").unwrap().data[[0, 0]], 750.0, epsilon = 1e-2);
    assert_eq!(scaled.band("QA_PIXEL").unwrap().data, image.band("QA_PIXEL").unwrap().data);
}

#[test]
fn test_scale_leaves_sentinel2_alone() {
    let image = s2_qa_image("S2_1", Array2::zeros((2, 2)));
    let scaled = scale_reflectance(&image);
    assert_eq!(scaled.band("B2").unwrap().data, image.band("B2").unwrap().data);
}

#[test]
fn test_cache_computes_once() {
    let image = landsat_image("LE07_1", date(2022, 1, 3), qa_with_cloud_and_gap());
    let config = MaskConfig::default();
    let cache = DerivedCache::new();
    assert!(cache.is_empty());

    let first = cache.masks(&image, &config).unwrap();
    let second = cache.masks(&image, &config).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, derive_masks(&image, &config).unwrap());

    let score = cache.score(&image, &config).unwrap();
    assert!(Arc::ptr_eq(&score, &cache.score(&image, &config).unwrap()));
    assert_eq!(cache.len(), 1);

    let other = MaskConfig {
        max_cloud_distance_m: 60.0,
        ..MaskConfig::default()
    };
    cache.masks(&image, &other).unwrap();
    assert_eq!(cache.len(), 2);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_cache_propagates_errors() {
    let image = image_with_bands(
        "S2",
        clearsky_core::sensor::SensorVariant::Sentinel2CloudProbToa,
        date(2022, 1, 1),
        grid(2, 2, 10.0),
        &["B2"],
        1.0,
    );
    let cache = DerivedCache::new();
    assert!(cache.masks(&image, &MaskConfig::default()).is_err());
    assert!(cache.is_empty());
}

#[test]
fn test_geo_transform_round_trip() {
    let t = GeoTransform::new(500_000.0, 4_000_000.0, 30.0, -30.0);
    let (x, y) = t.to_geo(10.0, 20.0);
    assert_abs_diff_eq!(x, 500_300.0);
    assert_abs_diff_eq!(y, 3_999_400.0);
    let (col, row) = t.to_pixel(x, y);
    assert_abs_diff_eq!(col, 10.0);
    assert_abs_diff_eq!(row, 20.0);
}

#[test]
fn test_grid_bounds() {
    let g = grid(10, 20, 30.0);
    let bounds = g.bounds();
    assert_abs_diff_eq!(bounds.min().x, 0.0);
    assert_abs_diff_eq!(bounds.min().y, 0.0);
    assert_abs_diff_eq!(bounds.max().x, 600.0);
    assert_abs_diff_eq!(bounds.max().y, 300.0);
    assert_eq!(g.shape(), (10, 20));
}

#[test]
fn test_image_scales() {
    let image = s2_qa_image("S2_1", Array2::zeros((3, 3)));
    assert_eq!(image.min_scale(), 10.0);
    assert_eq!(image.max_scale(), 60.0);
    let bare = clearsky_core::image::RasterImage::new(
        "bare",
        date(2022, 1, 1),
        grid(3, 3, 20.0),
        clearsky_core::sensor::SensorVariant::Generic,
    );
    assert_eq!(bare.min_scale(), 20.0);
}
