use ndarray::Array2;

use super::morphology::apply_kernel;

/// Mark every pixel lying within `max_distance_px` of a source pixel along
/// `azimuth_deg` (degrees clockwise from north, rows increase southward).
///
/// Source pixels themselves are only marked if another source pixel reaches
/// them. Distances below one pixel mark nothing.
pub fn project_along_azimuth(
    source: &Array2<bool>,
    azimuth_deg: f64,
    max_distance_px: f64,
) -> Array2<bool> {
    let (h, w) = source.dim();
    let steps = if max_distance_px.is_finite() {
        max_distance_px.max(0.0).floor() as usize
    } else {
        h.max(w)
    };
    let theta = azimuth_deg.to_radians();
    // Unit step in (row, col) along the azimuth.
    let (step_r, step_c) = (-theta.cos(), theta.sin());

    let offsets: Vec<(isize, isize)> = (1..=steps)
        .map(|t| {
            (
                (step_r * t as f64).round() as isize,
                (step_c * t as f64).round() as isize,
            )
        })
        .collect();

    // Gather form: a pixel is reached if the pixel `t` steps behind it is a source.
    apply_kernel(source, |row, col| {
        offsets.iter().any(|&(dr, dc)| {
            let sr = row as isize - dr;
            let sc = col as isize - dc;
            sr >= 0 && sr < h as isize && sc >= 0 && sc < w as isize && source[[sr as usize, sc as usize]]
        })
    })
}
