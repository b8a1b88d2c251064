use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

/// Stand-in for "no feature yet" that keeps the envelope arithmetic finite.
const FAR: f64 = 1e20;

/// Exact squared Euclidean distance (px²) from every pixel to the nearest
/// `true` pixel of `feature`, capped at `max_distance_px²`.
///
/// Separable lower-envelope transform (Felzenszwalb & Huttenlocher): one 1D
/// pass down each column, then one along each row.
pub fn bounded_squared_distance(feature: &Array2<bool>, max_distance_px: f64) -> Array2<f64> {
    let (h, w) = feature.dim();
    let cap = max_distance_px.max(0.0).powi(2);
    if h == 0 || w == 0 {
        return Array2::zeros((h, w));
    }
    let parallel = h * w >= PARALLEL_PIXEL_THRESHOLD;

    let column_pass = |col: usize| -> Vec<f64> {
        let f: Vec<f64> = (0..h)
            .map(|row| if feature[[row, col]] { 0.0 } else { FAR })
            .collect();
        lower_envelope(&f)
    };
    let columns: Vec<Vec<f64>> = if parallel {
        (0..w).into_par_iter().map(column_pass).collect()
    } else {
        (0..w).map(column_pass).collect()
    };

    let row_pass = |row: usize| -> Vec<f64> {
        let f: Vec<f64> = (0..w).map(|col| columns[col][row]).collect();
        lower_envelope(&f)
    };
    let rows: Vec<Vec<f64>> = if parallel {
        (0..h).into_par_iter().map(row_pass).collect()
    } else {
        (0..h).map(row_pass).collect()
    };

    Array2::from_shape_fn((h, w), |(row, col)| rows[row][col].min(cap))
}

/// 1D squared distance transform of a sampled function `f`.
fn lower_envelope(f: &[f64]) -> Vec<f64> {
    let n = f.len();
    let mut d = vec![0.0; n];
    if n == 0 {
        return d;
    }
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];
    let mut k = 0usize;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf))
    };

    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
    d
}
