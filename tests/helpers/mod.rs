//! Shared helpers for integration tests
//!
//! Synthetic frames and float comparisons used across test files.

#![allow(dead_code)]

use particle_tracker_rs::{GrayImage, Rect};

/// Background intensity of synthetic frames
pub const BACKGROUND: u8 = 20;
/// Object intensity of synthetic frames
pub const FOREGROUND: u8 = 200;

/// Frame of `width × height` with `object` painted bright on a dark background
pub fn frame_with_object(width: usize, height: usize, object: &Rect) -> GrayImage {
    let mut frame = GrayImage::filled(width, height, BACKGROUND);
    frame.fill_rect(object, FOREGROUND);
    frame
}

/// Assert two scalars are within `tol`
pub fn assert_close(actual: f64, expected: f64, tol: f64, context: &str) {
    assert!(
        (actual - expected).abs() <= tol,
        "{}: expected {}, got {} (tol {})",
        context,
        expected,
        actual,
        tol
    );
}

/// Random probability vector of length `n` from a deterministic seed
pub fn probability_vector(n: usize, seed: u64) -> Vec<f64> {
    use particle_tracker_rs::common::rng::Rng;
    let mut rng = particle_tracker_rs::SimpleRng::new(seed);
    let raw: Vec<f64> = (0..n).map(|_| rng.rand() + 1e-3).collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| v / sum).collect()
}
