//! North-up pixel grids in a projected coordinate system.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use geo::{coord, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Affine coefficients for a north-up raster.
///
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height
/// ```
///
/// `pixel_height` is negative for rasters whose first row is the northern edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner.
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner.
    pub origin_y: f64,
    /// Cell size in X (metres).
    pub pixel_width: f64,
    /// Cell size in Y (metres, usually negative).
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Geographic coordinates of a fractional pixel position.
    pub fn to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.origin_x + col * self.pixel_width,
            self.origin_y + row * self.pixel_height,
        )
    }

    /// Fractional pixel position of a geographic coordinate.
    pub fn to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_width,
            (y - self.origin_y) / self.pixel_height,
        )
    }

    /// Nominal (square) cell size in metres.
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

/// The pixel grid shared by every band of an image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoGrid {
    pub transform: GeoTransform,
    pub width: usize,
    pub height: usize,
    /// Coordinate reference system identifier, e.g. `EPSG:32634`.
    pub crs: String,
}

impl GeoGrid {
    pub fn new(transform: GeoTransform, width: usize, height: usize, crs: impl Into<String>) -> Self {
        Self {
            transform,
            width,
            height,
            crs: crs.into(),
        }
    }

    /// Array shape `(rows, cols)` of bands on this grid.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn pixel_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Outer bounds of the grid as a rectangle.
    pub fn bounds(&self) -> Rect<f64> {
        let (x0, y0) = self.transform.to_geo(0.0, 0.0);
        let (x1, y1) = self
            .transform
            .to_geo(self.width as f64, self.height as f64);
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
    }

    pub fn bounds_polygon(&self) -> Polygon<f64> {
        self.bounds().to_polygon()
    }

    /// Stable hash of shape, transform and CRS.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.width.hash(&mut hasher);
        self.height.hash(&mut hasher);
        self.transform.origin_x.to_bits().hash(&mut hasher);
        self.transform.origin_y.to_bits().hash(&mut hasher);
        self.transform.pixel_width.to_bits().hash(&mut hasher);
        self.transform.pixel_height.to_bits().hash(&mut hasher);
        self.crs.hash(&mut hasher);
        hasher.finish()
    }
}
