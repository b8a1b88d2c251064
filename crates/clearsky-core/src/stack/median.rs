use crate::error::Result;

use super::{gather, reduce_pixels, Reduced, StackLayer};

/// Stack layers by computing the median of the valid pixels, band by band.
///
/// Bands are reduced independently, so an output pixel may mix bands from
/// different layers. Uses `select_nth_unstable` for O(n) median without full sort.
pub fn median_stack(layers: &[StackLayer]) -> Result<Reduced> {
    reduce_pixels(layers, |layers, row, col, members, out| {
        let mut values = Vec::with_capacity(members.len());
        for (band, v) in out.iter_mut().enumerate() {
            gather(layers, members, band, row, col, &mut values);
            *v = compute_median(&mut values);
        }
    })
}

/// Median of a non-empty slice; the mean of the two middle values for even
/// counts. Reorders the slice.
pub fn compute_median(values: &mut [f32]) -> f32 {
    let n = values.len();
    if n == 1 {
        values[0]
    } else if n % 2 == 1 {
        let mid = n / 2;
        *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
    } else {
        let mid = n / 2;
        values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
        values[..mid].select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b));
        (values[mid - 1] + values[mid]) / 2.0
    }
}
