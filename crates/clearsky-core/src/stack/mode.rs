use crate::error::Result;

use super::{gather, reduce_pixels, Reduced, StackLayer};

/// Stack layers by taking the most frequent valid value of each band.
///
/// Ties go to the smallest value.
pub fn mode_stack(layers: &[StackLayer]) -> Result<Reduced> {
    reduce_pixels(layers, |layers, row, col, members, out| {
        let mut values = Vec::with_capacity(members.len());
        for (band, v) in out.iter_mut().enumerate() {
            gather(layers, members, band, row, col, &mut values);
            *v = compute_mode(&mut values);
        }
    })
}

/// Most frequent value of a non-empty slice, smallest on ties. Sorts the slice.
pub fn compute_mode(values: &mut [f32]) -> f32 {
    values.sort_unstable_by(|a, b| a.total_cmp(b));
    let mut best = values[0];
    let mut best_count = 0usize;
    let mut start = 0usize;
    while start < values.len() {
        let value = values[start];
        let end = start
            + values[start..]
                .iter()
                .take_while(|v| v.total_cmp(&value).is_eq())
                .count();
        // Ascending runs: strict > keeps the smaller value on a tie.
        if end - start > best_count {
            best = value;
            best_count = end - start;
        }
        start = end;
    }
    best
}
