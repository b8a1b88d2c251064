use crate::error::{ClearskyError, Result};

use super::median::compute_median;
use super::{gather, reduce_pixels, Reduced, StackLayer};

/// Stack layers by picking, per pixel, the whole layer pixel closest to the
/// per-band median.
///
/// Distance is the summed absolute difference over `spectral_bands` (all
/// bands when empty). Every band of the output pixel comes from the chosen
/// layer, preserving inter-band relationships. Ties go to the earlier layer.
pub fn medoid_stack(layers: &[StackLayer], spectral_bands: &[usize]) -> Result<Reduced> {
    let n_bands = layers.first().map_or(0, StackLayer::n_bands);
    if let Some(&b) = spectral_bands.iter().find(|&&b| b >= n_bands) {
        return Err(ClearskyError::IncompatibleStack(format!(
            "spectral band index {b} out of range for {n_bands} bands"
        )));
    }
    let bands: Vec<usize> = if spectral_bands.is_empty() {
        (0..n_bands).collect()
    } else {
        spectral_bands.to_vec()
    };

    reduce_pixels(layers, |layers, row, col, members, out| {
        let mut values = Vec::with_capacity(members.len());
        let median: Vec<f32> = bands
            .iter()
            .map(|&band| {
                gather(layers, members, band, row, col, &mut values);
                compute_median(&mut values)
            })
            .collect();

        let distance = |i: usize| -> f64 {
            bands
                .iter()
                .zip(&median)
                .map(|(&band, &m)| (layers[i].data[[band, row, col]] as f64 - m as f64).abs())
                .sum()
        };

        let mut best = members[0];
        let mut best_distance = distance(best);
        for &i in &members[1..] {
            let d = distance(i);
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        let chosen = &layers[best];
        for (band, v) in out.iter_mut().enumerate() {
            *v = chosen.data[[band, row, col]];
        }
    })
}
