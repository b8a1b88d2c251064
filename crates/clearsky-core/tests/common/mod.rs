#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use geo::{polygon, Polygon};
use ndarray::Array2;

use clearsky_core::geo_grid::{GeoGrid, GeoTransform};
use clearsky_core::image::{Band, ImageProperties, RasterImage};
use clearsky_core::sensor::SensorVariant;

/// Midnight UTC on the given date.
pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

/// North-up grid of `height` x `width` pixels of `scale` metres, origin at
/// the top-left corner (0, height * scale).
pub fn grid(height: usize, width: usize, scale: f64) -> GeoGrid {
    GeoGrid::new(
        GeoTransform::new(0.0, height as f64 * scale, scale, -scale),
        width,
        height,
        "EPSG:32634",
    )
}

/// Axis-aligned rectangle polygon.
pub fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
    polygon![
        (x: x0, y: y0),
        (x: x1, y: y0),
        (x: x1, y: y1),
        (x: x0, y: y1),
        (x: x0, y: y0),
    ]
}

/// Image with constant spectral bands `names` and a footprint equal to the grid.
pub fn image_with_bands(
    id: &str,
    variant: SensorVariant,
    timestamp: DateTime<Utc>,
    grid: GeoGrid,
    names: &[&str],
    value: f32,
) -> RasterImage {
    let scale = grid.pixel_size();
    let shape = grid.shape();
    let footprint = grid.bounds_polygon();
    let mut image = RasterImage::new(id, timestamp, grid, variant).with_footprint(footprint);
    for name in names {
        image = image
            .with_band(Band::new(*name, Array2::from_elem(shape, value), scale))
            .unwrap();
    }
    image
}

/// Two-band generic image whose bands hold `b1` and `b2` everywhere.
pub fn generic_image(id: &str, timestamp: DateTime<Utc>, size: usize, b1: f32, b2: f32) -> RasterImage {
    let g = grid(size, size, 10.0);
    let shape = g.shape();
    RasterImage::new(id, timestamp, g.clone(), SensorVariant::Generic)
        .with_footprint(g.bounds_polygon())
        .with_band(Band::new("B1", Array2::from_elem(shape, b1), 10.0))
        .unwrap()
        .with_band(Band::new("B2", Array2::from_elem(shape, b2), 10.0))
        .unwrap()
}

/// Landsat 7 image with three reflectance bands and the given QA_PIXEL band.
pub fn landsat_image(id: &str, timestamp: DateTime<Utc>, qa: Array2<f32>) -> RasterImage {
    let (h, w) = qa.dim();
    let image = image_with_bands(
        id,
        SensorVariant::LandsatLegacy,
        timestamp,
        grid(h, w, 30.0),
        &["SR_B1", "SR_B2", "SR_B3"],
        10_000.0,
    );
    image.with_band(Band::new("QA_PIXEL", qa, 30.0)).unwrap()
}

/// Landsat 8 image with QA_PIXEL and SR_QA_AEROSOL bands.
pub fn landsat8_image(id: &str, qa: Array2<f32>, aerosol: Array2<f32>) -> RasterImage {
    let (h, w) = qa.dim();
    image_with_bands(
        id,
        SensorVariant::LandsatAerosol,
        date(2022, 1, 1),
        grid(h, w, 30.0),
        &["SR_B2", "SR_B3", "SR_B4"],
        10_000.0,
    )
    .with_band(Band::new("QA_PIXEL", qa, 30.0))
    .unwrap()
    .with_band(Band::new("SR_QA_AEROSOL", aerosol, 30.0))
    .unwrap()
}

/// Sentinel-2 QA60 image.
pub fn s2_qa_image(id: &str, qa60: Array2<f32>) -> RasterImage {
    let (h, w) = qa60.dim();
    image_with_bands(
        id,
        SensorVariant::Sentinel2Qa,
        date(2022, 1, 1),
        grid(h, w, 10.0),
        &["B2", "B3", "B4"],
        1_000.0,
    )
    .with_band(Band::new("QA60", qa60, 60.0))
    .unwrap()
}

/// Sentinel-2 cloud-probability image (TOA or SR) with the probability
/// companion attached and a solar azimuth of `solar_azimuth` degrees.
pub fn s2_prob_image(
    id: &str,
    variant: SensorVariant,
    probability: Array2<f32>,
    solar_azimuth: f64,
) -> RasterImage {
    let (h, w) = probability.dim();
    image_with_bands(id, variant, date(2022, 1, 1), grid(h, w, 10.0), &["B2", "B3", "B4"], 1_000.0)
        .with_properties(ImageProperties {
            solar_azimuth: Some(solar_azimuth),
            cloud_cover: None,
        })
        .with_companion(Band::new("probability", probability, 10.0))
        .unwrap()
}

/// Single-pixel cloud at `(row, col)` in an otherwise clear `h` x `w` raster.
pub fn single_pixel(h: usize, w: usize, row: usize, col: usize, value: f32) -> Array2<f32> {
    let mut a = Array2::zeros((h, w));
    a[[row, col]] = value;
    a
}
