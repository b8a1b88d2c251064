use crate::error::Result;

use super::{reduce_pixels, Reduced, StackLayer};

/// Stack layers by computing the per-band mean of the valid pixels.
pub fn mean_stack(layers: &[StackLayer]) -> Result<Reduced> {
    reduce_pixels(layers, |layers, row, col, members, out| {
        let n = members.len() as f64;
        for (band, v) in out.iter_mut().enumerate() {
            let sum: f64 = members
                .iter()
                .map(|&i| layers[i].data[[band, row, col]] as f64)
                .sum();
            *v = (sum / n) as f32;
        }
    })
}
