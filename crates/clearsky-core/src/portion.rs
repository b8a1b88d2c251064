use geo::{coord, Area, BooleanOps, BoundingRect, Contains, Intersects, Point, Polygon, Rect};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::consts::{PARALLEL_PIXEL_THRESHOLD, PORTION_SCALE};
use crate::error::{ClearskyError, Result};
use crate::geo_grid::GeoTransform;
use crate::image::RasterImage;
use crate::mask::MaskSet;
use crate::sensor::SensorVariant;

/// Region-clipped coverage percentages of an image.
///
/// `cloudless_portion <= fill_portion`, both in [0, 100].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortionMetrics {
    pub fill_portion: f64,
    pub cloudless_portion: f64,
}

impl PortionMetrics {
    /// Cloudless portion used for filtering and ordering: variants without
    /// cloud masking report their fill portion instead.
    pub fn effective_cloudless(&self, variant: SensorVariant) -> f64 {
        if variant.supports_cloud_mask() {
            self.cloudless_portion
        } else {
            self.fill_portion
        }
    }
}

impl std::fmt::Display for PortionMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fill {:.2}%, cloudless {:.2}%",
            self.fill_portion, self.cloudless_portion
        )
    }
}

/// Percentage of `region` covered by filled and by valid pixels.
///
/// Falls back to the image footprint when `region` is `None`. Masks are
/// averaged over blocks at the coarsest native band resolution; a block
/// counts when its centre lies in the region. Only blocks on the grid are
/// read; the part of the region beyond the grid counts as unfilled blocks
/// by area. A region that misses the grid entirely has empty metrics.
pub fn portions(image: &RasterImage, masks: &MaskSet, region: Option<&Polygon<f64>>) -> Result<PortionMetrics> {
    let region = region
        .or(image.footprint.as_ref())
        .ok_or_else(|| ClearskyError::MissingRegion(image.id.clone()))?;

    let expected = image.shape();
    if masks.dim() != expected {
        return Err(ClearskyError::InvalidDimensions {
            expected,
            found: masks.dim(),
        });
    }

    let Some(rect) = region.bounding_rect() else {
        return Ok(PortionMetrics::default());
    };

    let transform = &image.grid.transform;
    let block = (image.max_scale() / image.grid.pixel_size()).round().max(1.0) as usize;
    let b = block as f64;
    let (h, w) = expected;
    let grid_cols = w.div_ceil(block);
    let grid_rows = h.div_ceil(block);

    // Blocks of the region's bounding box that lie on the grid.
    let (ca, ra) = transform.to_pixel(rect.min().x, rect.min().y);
    let (cb, rb) = transform.to_pixel(rect.max().x, rect.max().y);
    let col_range = (
        ((ca.min(cb) / b).floor() as isize).max(0),
        ((ca.max(cb) / b).ceil() as isize).min(grid_cols as isize),
    );
    let row_range = (
        ((ra.min(rb) / b).floor() as isize).max(0),
        ((ra.max(rb) / b).ceil() as isize).min(grid_rows as isize),
    );

    let block_area = (block * block) as f64;
    let fill = masks.fill();
    let valid = masks.valid();

    // (cells, fill fraction sum, valid fraction sum) for one row of blocks
    let row_sums = |block_row: isize| -> (usize, f64, f64) {
        let mut cells = 0usize;
        let mut fill_sum = 0.0f64;
        let mut valid_sum = 0.0f64;
        for block_col in col_range.0..col_range.1 {
            let (x, y) = transform.to_geo(
                (block_col as f64 + 0.5) * b,
                (block_row as f64 + 0.5) * b,
            );
            if !region.intersects(&Point::new(x, y)) {
                continue;
            }
            cells += 1;

            let mut filled = 0usize;
            let mut cloudless = 0usize;
            for row in pixel_span(block_row, block, h) {
                for col in pixel_span(block_col, block, w) {
                    if fill[[row, col]] {
                        filled += 1;
                    }
                    if valid[[row, col]] {
                        cloudless += 1;
                    }
                }
            }
            fill_sum += filled as f64 / block_area;
            valid_sum += cloudless as f64 / block_area;
        }
        (cells, fill_sum, valid_sum)
    };

    let block_rows = row_range.0..row_range.1;
    let total_blocks = (row_range.1 - row_range.0).max(0) as usize * (col_range.1 - col_range.0).max(0) as usize;
    let sums: Vec<(usize, f64, f64)> = if total_blocks * block * block >= PARALLEL_PIXEL_THRESHOLD {
        block_rows.into_par_iter().map(row_sums).collect()
    } else {
        block_rows.map(row_sums).collect()
    };

    let (cells, fill_sum, valid_sum) = sums
        .into_iter()
        .fold((0usize, 0.0f64, 0.0f64), |acc, s| (acc.0 + s.0, acc.1 + s.1, acc.2 + s.2));
    if cells == 0 {
        return Ok(PortionMetrics::default());
    }

    let cells = cells as f64 + outside_cells(region, &rect, transform, grid_cols, grid_rows, b);
    let fill_portion = (fill_sum / cells * PORTION_SCALE).clamp(0.0, PORTION_SCALE);
    let cloudless_portion = (valid_sum / cells * PORTION_SCALE).clamp(0.0, fill_portion);
    Ok(PortionMetrics {
        fill_portion,
        cloudless_portion,
    })
}

/// Number of unfilled blocks the region covers beyond the grid, from area.
fn outside_cells(
    region: &Polygon<f64>,
    bbox: &Rect<f64>,
    transform: &GeoTransform,
    grid_cols: usize,
    grid_rows: usize,
    b: f64,
) -> f64 {
    let (x0, y0) = transform.to_geo(0.0, 0.0);
    let (x1, y1) = transform.to_geo(grid_cols as f64 * b, grid_rows as f64 * b);
    let covered = Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 });
    if covered.contains(bbox) {
        return 0.0;
    }
    let inside = region.intersection(&covered.to_polygon()).unsigned_area();
    let cell_area = (b * transform.pixel_width * b * transform.pixel_height).abs();
    ((region.unsigned_area() - inside) / cell_area).round().max(0.0)
}

/// Grid pixel indices covered by block `index`, clipped to `[0, len)`.
fn pixel_span(index: isize, block: usize, len: usize) -> std::ops::Range<usize> {
    let start = index * block as isize;
    let end = start + block as isize;
    let start = start.clamp(0, len as isize) as usize;
    let end = end.clamp(0, len as isize) as usize;
    start..end
}
