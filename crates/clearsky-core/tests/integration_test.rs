mod common;

use ndarray::Array2;

use clearsky_core::cache::DerivedCache;
use clearsky_core::catalog::{join_cloud_probability, Collection};
use clearsky_core::composite::{CompositeBuilder, CompositeMethod, CompositeSpec, StackOrdering};
use clearsky_core::config::ProcessingConfig;
use clearsky_core::image::{Band, ImageProperties, RasterImage};
use clearsky_core::search::{search, SearchParams};
use clearsky_core::sensor::SensorVariant;

use common::*;

const SIZE: usize = 12;

/// Sentinel-2 SR scene and its cloud probability image. `cloud` is the
/// top-left corner of a 4x4 cloud square; spectral bands hold `value`.
fn scene(day: u32, value: f32, cloud: Option<(usize, usize)>) -> (RasterImage, RasterImage) {
    let index = format!("202203{day:02}T083331_202203{day:02}T085105_T34HCH");
    let g = grid(SIZE, SIZE, 10.0);
    let image = image_with_bands(
        &format!("COPERNICUS/S2_SR/{index}"),
        SensorVariant::Sentinel2CloudProbSr,
        date(2022, 3, day),
        g.clone(),
        &["B2", "B3", "B4"],
        value,
    )
    .with_band(Band::new("SCL", Array2::from_elem((SIZE, SIZE), 4.0), 20.0))
    .unwrap()
    .with_properties(ImageProperties {
        solar_azimuth: Some(160.0),
        cloud_cover: None,
    });

    let mut probability = Array2::from_elem((SIZE, SIZE), 5.0f32);
    if let Some((r0, c0)) = cloud {
        for r in r0..r0 + 4 {
            for c in c0..c0 + 4 {
                probability[[r, c]] = 95.0;
            }
        }
    }
    let prob_image = image_with_bands(
        &format!("COPERNICUS/S2_CLOUD_PROBABILITY/{index}"),
        SensorVariant::Generic,
        date(2022, 3, day),
        g,
        &[],
        0.0,
    )
    .with_band(Band::new("probability", probability, 10.0))
    .unwrap();
    (image, prob_image)
}

#[test]
fn test_search_then_composite() {
    let config = ProcessingConfig::from_toml_str(
        r#"
[mask]
cloud_prob_threshold = 50.0

[composite]
method = "q-mosaic"

[composite.ordering]
kind = "date_proximity"
target = "2022-03-10T00:00:00Z"
"#,
    )
    .unwrap();

    let scenes = [
        scene(2, 100.0, Some((0, 0))),
        scene(9, 200.0, Some((6, 6))),
        scene(20, 300.0, None),
        scene(15, 400.0, None),
    ];
    let (images, mut probabilities): (Vec<_>, Vec<_>) = scenes.into_iter().unzip();
    // Cloud over all of the 15th: dropped by the cloudless threshold.
    probabilities[3] = probabilities[3]
        .clone()
        .with_band(Band::new("probability", Array2::from_elem((SIZE, SIZE), 99.0), 10.0))
        .unwrap();

    let images = join_cloud_probability(images, &probabilities).unwrap();
    let collection = Collection::from_images(images).unwrap();

    let cache = DerivedCache::new();
    let params = SearchParams::new(date(2022, 3, 1), date(2022, 4, 1), grid(SIZE, SIZE, 10.0).bounds_polygon())
        .with_fill_portion_min(90.0)
        .with_cloudless_portion_min(50.0);
    let results = search(&collection, &params, &config.mask, Some(&cache)).unwrap();

    let days: Vec<u32> = results
        .iter()
        .map(|r| chrono::Datelike::day(&r.image.timestamp))
        .collect();
    assert_eq!(days, vec![2, 9, 20]);
    for r in &results {
        assert!(r.portions.cloudless_portion <= r.portions.fill_portion);
    }

    let stack: Vec<RasterImage> = results.into_iter().map(|r| r.image).collect();
    assert!(matches!(config.composite.ordering, StackOrdering::DateProximity { .. }));
    let out = CompositeBuilder::new(config.composite.clone())
        .with_mask_config(config.mask.clone())
        .with_cache(&cache)
        .build(&stack)
        .unwrap();

    assert_eq!(out.id, "q-mosaic-composite");
    assert_eq!(out.timestamp, date(2022, 3, 2));
    assert!(out.mask().unwrap().iter().all(|&v| v));
    // Only the clear scene reaches the distance cap, so it wins everywhere.
    assert!(out.band("B2").unwrap().data.iter().all(|&v| v == 300.0));

    // Plain mosaic follows date proximity: the 9th, then the 2nd under its cloud.
    let mosaic_spec = CompositeSpec {
        method: CompositeMethod::Mosaic,
        ..config.composite.clone()
    };
    let out = CompositeBuilder::new(mosaic_spec)
        .with_mask_config(config.mask.clone())
        .with_cache(&cache)
        .build(&stack)
        .unwrap();
    let b2 = &out.band("B2").unwrap().data;
    assert_eq!(b2[[0, 0]], 200.0);
    assert_eq!(b2[[7, 7]], 100.0);
    assert_eq!(b2[[11, 0]], 200.0);
}
