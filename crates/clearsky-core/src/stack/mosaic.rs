use crate::error::{ClearskyError, Result};

use super::{reduce_pixels, Reduced, StackLayer};

/// First valid pixel in stack order.
pub fn mosaic(layers: &[StackLayer]) -> Result<Reduced> {
    reduce_pixels(layers, |layers, row, col, members, out| {
        let first = &layers[members[0]];
        for (band, v) in out.iter_mut().enumerate() {
            *v = first.data[[band, row, col]];
        }
    })
}

/// Valid pixel with the highest quality score; ties go to the earlier layer.
///
/// Every layer must carry a score.
pub fn quality_mosaic(layers: &[StackLayer]) -> Result<Reduced> {
    if let Some(i) = layers.iter().position(|l| l.score.is_none()) {
        return Err(ClearskyError::IncompatibleStack(format!(
            "layer {i} has no quality score for q-mosaic"
        )));
    }

    reduce_pixels(layers, |layers, row, col, members, out| {
        let score_at = |i: usize| {
            layers[i]
                .score
                .as_ref()
                .map_or(f32::NEG_INFINITY, |s| s[[row, col]])
        };
        let mut best = members[0];
        let mut best_score = score_at(best);
        for &i in &members[1..] {
            let s = score_at(i);
            if s > best_score {
                best = i;
                best_score = s;
            }
        }
        let chosen = &layers[best];
        for (band, v) in out.iter_mut().enumerate() {
            *v = chosen.data[[band, row, col]];
        }
    })
}
