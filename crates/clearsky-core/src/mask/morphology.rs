use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Offsets `(dr, dc)` of a disk structuring element of the given radius (px).
///
/// A radius of 1.5 yields the full 3x3 square. Radii below 1 yield only the
/// centre pixel.
pub fn disk_offsets(radius: f64) -> Vec<(isize, isize)> {
    let r = radius.max(0.0);
    let reach = r.floor() as isize;
    let r2 = r * r;
    let mut offsets = Vec::new();
    for dr in -reach..=reach {
        for dc in -reach..=reach {
            if (dr * dr + dc * dc) as f64 <= r2 {
                offsets.push((dr, dc));
            }
        }
    }
    if offsets.is_empty() {
        offsets.push((0, 0));
    }
    offsets
}

/// Morphological opening (erosion followed by dilation) with a disk kernel.
///
/// Removes foreground specks smaller than the kernel while preserving larger regions.
pub fn opening(mask: &Array2<bool>, radius: f64) -> Array2<bool> {
    let eroded = erode(mask, radius);
    dilate(&eroded, radius)
}

/// Binary erosion: a pixel stays true only if every in-bounds pixel under the
/// kernel is true. Out-of-bounds neighbours are ignored so regions touching
/// the image edge are not eaten away.
pub fn erode(mask: &Array2<bool>, radius: f64) -> Array2<bool> {
    let offsets = disk_offsets(radius);
    apply_kernel(mask, |row, col| {
        mask[[row, col]]
            && offsets.iter().all(|&(dr, dc)| {
                neighbour(mask, row, col, dr, dc).unwrap_or(true)
            })
    })
}

/// Binary dilation: a pixel becomes true if any pixel under the kernel is true.
pub fn dilate(mask: &Array2<bool>, radius: f64) -> Array2<bool> {
    let offsets = disk_offsets(radius);
    apply_kernel(mask, |row, col| {
        offsets
            .iter()
            .any(|&(dr, dc)| neighbour(mask, row, col, dr, dc).unwrap_or(false))
    })
}

fn neighbour(mask: &Array2<bool>, row: usize, col: usize, dr: isize, dc: isize) -> Option<bool> {
    let (h, w) = mask.dim();
    let nr = row as isize + dr;
    let nc = col as isize + dc;
    if nr < 0 || nr >= h as isize || nc < 0 || nc >= w as isize {
        return None;
    }
    Some(mask[[nr as usize, nc as usize]])
}

/// Evaluate `f` at every pixel, row-parallel for large masks.
pub(crate) fn apply_kernel<F>(mask: &Array2<bool>, f: F) -> Array2<bool>
where
    F: Fn(usize, usize) -> bool + Sync,
{
    let (h, w) = mask.dim();
    if h * w >= PARALLEL_PIXEL_THRESHOLD {
        let rows: Vec<Vec<bool>> = (0..h)
            .into_par_iter()
            .map(|row| (0..w).map(|col| f(row, col)).collect())
            .collect();
        Array2::from_shape_fn((h, w), |(row, col)| rows[row][col])
    } else {
        Array2::from_shape_fn((h, w), |(row, col)| f(row, col))
    }
}
