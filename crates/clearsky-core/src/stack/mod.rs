//! Per-pixel reductions of an ordered image stack.
//!
//! Every reducer sees, for each output pixel, the indices of the layers
//! whose pixel is valid, in stack order. Pixels valid in no layer stay
//! invalid in the output.

pub mod mean;
pub mod median;
pub mod medoid;
pub mod mode;
pub mod mosaic;

use ndarray::{Array2, Array3};
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{ClearskyError, Result};

/// One image of a stack.
#[derive(Clone, Debug)]
pub struct StackLayer {
    /// Band values, shape = (bands, height, width).
    pub data: Array3<f32>,
    /// Pixels that take part in the reduction.
    pub valid: Array2<bool>,
    /// Per-pixel quality (higher preferred), required by q-mosaic.
    pub score: Option<Array2<f32>>,
}

impl StackLayer {
    pub fn new(data: Array3<f32>, valid: Array2<bool>) -> Self {
        Self {
            data,
            valid,
            score: None,
        }
    }

    pub fn with_score(mut self, score: Array2<f32>) -> Self {
        self.score = Some(score);
        self
    }

    pub fn n_bands(&self) -> usize {
        self.data.dim().0
    }
}

/// Output of a reduction.
#[derive(Clone, Debug)]
pub struct Reduced {
    /// Band values, shape = (bands, height, width). Zero where invalid.
    pub data: Array3<f32>,
    /// True where at least one layer contributed.
    pub valid: Array2<bool>,
}

/// Check that the stack is non-empty and every layer has the same shape.
///
/// Returns `(bands, height, width)`.
pub(crate) fn check_stack(layers: &[StackLayer]) -> Result<(usize, usize, usize)> {
    let first = layers.first().ok_or(ClearskyError::EmptyStack)?;
    let shape = first.data.dim();
    for (i, layer) in layers.iter().enumerate() {
        let (_, h, w) = layer.data.dim();
        if layer.data.dim() != shape || layer.valid.dim() != (h, w) {
            return Err(ClearskyError::IncompatibleStack(format!(
                "layer {i} has shape {:?}, expected {:?}",
                layer.data.dim(),
                shape
            )));
        }
        if let Some(score) = &layer.score {
            if score.dim() != (h, w) {
                return Err(ClearskyError::IncompatibleStack(format!(
                    "layer {i} score has shape {:?}, expected {:?}",
                    score.dim(),
                    (h, w)
                )));
            }
        }
    }
    Ok(shape)
}

/// Run `reducer` on every pixel that is valid in at least one layer.
///
/// `reducer(layers, row, col, members, out)` writes one value per band into
/// `out`; `members` lists the valid layers in stack order. Parallelizes at
/// the row level for large images.
pub(crate) fn reduce_pixels<F>(layers: &[StackLayer], reducer: F) -> Result<Reduced>
where
    F: Fn(&[StackLayer], usize, usize, &[usize], &mut [f32]) + Sync,
{
    let (nb, h, w) = check_stack(layers)?;

    let process_row = |row: usize| -> (Vec<f32>, Vec<bool>) {
        let mut values = vec![0.0f32; w * nb];
        let mut valid = vec![false; w];
        let mut members = Vec::with_capacity(layers.len());
        for col in 0..w {
            members.clear();
            members.extend((0..layers.len()).filter(|&i| layers[i].valid[[row, col]]));
            if members.is_empty() {
                continue;
            }
            valid[col] = true;
            reducer(layers, row, col, &members, &mut values[col * nb..(col + 1) * nb]);
        }
        (values, valid)
    };

    let rows: Vec<(Vec<f32>, Vec<bool>)> = if h * w >= PARALLEL_PIXEL_THRESHOLD && layers.len() > 1 {
        (0..h).into_par_iter().map(process_row).collect()
    } else {
        (0..h).map(process_row).collect()
    };

    let mut data = Array3::<f32>::zeros((nb, h, w));
    let mut valid = Array2::from_elem((h, w), false);
    for (row, (values, row_valid)) in rows.into_iter().enumerate() {
        for col in 0..w {
            valid[[row, col]] = row_valid[col];
            for band in 0..nb {
                data[[band, row, col]] = values[col * nb + band];
            }
        }
    }
    Ok(Reduced { data, valid })
}

/// Values of `band` at `(row, col)` across `members`.
pub(crate) fn gather(layers: &[StackLayer], members: &[usize], band: usize, row: usize, col: usize, out: &mut Vec<f32>) {
    out.clear();
    out.extend(members.iter().map(|&i| layers[i].data[[band, row, col]]));
}
