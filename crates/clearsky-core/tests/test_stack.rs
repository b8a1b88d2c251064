use ndarray::{Array2, Array3};

use clearsky_core::error::ClearskyError;
use clearsky_core::stack::mean::mean_stack;
use clearsky_core::stack::median::{compute_median, median_stack};
use clearsky_core::stack::medoid::medoid_stack;
use clearsky_core::stack::mode::{compute_mode, mode_stack};
use clearsky_core::stack::mosaic::{mosaic, quality_mosaic};
use clearsky_core::stack::StackLayer;

/// Single-pixel layer with one value per band.
fn pixel(values: &[f32], valid: bool) -> StackLayer {
    let data = Array3::from_shape_vec((values.len(), 1, 1), values.to_vec()).unwrap();
    StackLayer::new(data, Array2::from_elem((1, 1), valid))
}

#[test]
fn test_compute_median() {
    assert_eq!(compute_median(&mut [5.0]), 5.0);
    assert_eq!(compute_median(&mut [3.0, 1.0, 2.0]), 2.0);
    assert_eq!(compute_median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    assert_eq!(compute_median(&mut [7.0, 7.0]), 7.0);
}

#[test]
fn test_compute_mode() {
    assert_eq!(compute_mode(&mut [2.0, 2.0, 1.0]), 2.0);
    assert_eq!(compute_mode(&mut [3.0, 1.0]), 1.0);
    assert_eq!(compute_mode(&mut [5.0, 4.0, 5.0, 4.0, 9.0]), 4.0);
}

#[test]
fn test_single_layer() {
    let layers = [pixel(&[0.5, 0.7], true)];
    for reduced in [
        mosaic(&layers).unwrap(),
        mean_stack(&layers).unwrap(),
        median_stack(&layers).unwrap(),
        mode_stack(&layers).unwrap(),
        medoid_stack(&layers, &[]).unwrap(),
    ] {
        assert!(reduced.valid[[0, 0]]);
        assert!((reduced.data[[0, 0, 0]] - 0.5).abs() < 1e-6);
        assert!((reduced.data[[1, 0, 0]] - 0.7).abs() < 1e-6);
    }
}

#[test]
fn test_invalid_layers_ignored() {
    let layers = [pixel(&[100.0], false), pixel(&[1.0], true), pixel(&[3.0], true)];
    assert_eq!(mosaic(&layers).unwrap().data[[0, 0, 0]], 1.0);
    assert_eq!(mean_stack(&layers).unwrap().data[[0, 0, 0]], 2.0);
    assert_eq!(median_stack(&layers).unwrap().data[[0, 0, 0]], 2.0);
}

#[test]
fn test_no_valid_layer() {
    let layers = [pixel(&[4.0], false), pixel(&[5.0], false)];
    let reduced = mean_stack(&layers).unwrap();
    assert!(!reduced.valid[[0, 0]]);
    assert_eq!(reduced.data[[0, 0, 0]], 0.0);
}

#[test]
fn test_empty_error() {
    let layers: Vec<StackLayer> = vec![];
    assert!(matches!(mean_stack(&layers), Err(ClearskyError::EmptyStack)));
    assert!(matches!(mosaic(&layers), Err(ClearskyError::EmptyStack)));
}

#[test]
fn test_shape_mismatch() {
    let layers = [pixel(&[1.0], true), pixel(&[1.0, 2.0], true)];
    assert!(matches!(median_stack(&layers), Err(ClearskyError::IncompatibleStack(_))));
}

#[test]
fn test_quality_mosaic_needs_scores() {
    let layers = [pixel(&[1.0], true)];
    assert!(matches!(quality_mosaic(&layers), Err(ClearskyError::IncompatibleStack(_))));
}

#[test]
fn test_quality_mosaic_highest_score() {
    let score = |s: f32| Array2::from_elem((1, 1), s);
    let layers = [
        pixel(&[1.0], true).with_score(score(2.0)),
        pixel(&[2.0], true).with_score(score(9.0)),
        pixel(&[3.0], true).with_score(score(9.0)),
        pixel(&[4.0], false).with_score(score(50.0)),
    ];
    assert_eq!(quality_mosaic(&layers).unwrap().data[[0, 0, 0]], 2.0);
}

#[test]
fn test_medoid_band_subset() {
    // Band 1 is excluded from the distance, so only band 0 decides.
    let layers = [
        pixel(&[0.0, 500.0], true),
        pixel(&[5.0, 0.0], true),
        pixel(&[6.0, 0.0], true),
    ];
    let reduced = medoid_stack(&layers, &[0]).unwrap();
    assert_eq!(reduced.data[[0, 0, 0]], 5.0);
    assert_eq!(reduced.data[[1, 0, 0]], 0.0);

    assert!(matches!(
        medoid_stack(&layers, &[2]),
        Err(ClearskyError::IncompatibleStack(_))
    ));
}

#[test]
fn test_large_stack_parallel_path() {
    // 256x256 crosses the row-parallel threshold.
    let n = 256;
    let layers: Vec<StackLayer> = (0..3)
        .map(|i| {
            let data = Array3::from_elem((1, n, n), i as f32);
            StackLayer::new(data, Array2::from_elem((n, n), true))
        })
        .collect();
    let reduced = mean_stack(&layers).unwrap();
    assert!(reduced.data.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    assert!(reduced.valid.iter().all(|&v| v));
}
