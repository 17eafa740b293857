//! Weight utilities for particle sets
//!
//! Normalisation and ranking helpers shared by resampling and by the
//! ranked output of the position tracker.

use std::cmp::Ordering;

/// How a weight vector was normalised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// Divided by a positive sum
    Proportional,
    /// Sum was zero; replaced by uniform weights
    UniformFallback,
}

/// Normalise `weights` in place so they sum to one.
///
/// A zero sum (every weight underflowed to zero) is replaced by uniform
/// weights. Returns `None` without touching the input if any weight is
/// negative or not finite.
pub fn normalize_weights(weights: &mut [f64]) -> Option<Normalization> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return None;
    }
    let n = weights.len();
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        weights.iter_mut().for_each(|w| *w /= sum);
        Some(Normalization::Proportional)
    } else {
        let uniform = 1.0 / n as f64;
        weights.iter_mut().for_each(|w| *w = uniform);
        Some(Normalization::UniformFallback)
    }
}

/// Indices of `weights` ordered by descending weight.
///
/// The sort is stable: equal weights keep their original relative order.
pub fn rank_descending(weights: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        weights[b]
            .partial_cmp(&weights[a])
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Effective sample size `1 / Σ w²` of normalised weights.
#[inline]
pub fn effective_sample_size(weights: &[f64]) -> f64 {
    let sum_sq: f64 = weights.iter().map(|w| w * w).sum();
    if sum_sq > 0.0 {
        1.0 / sum_sq
    } else {
        0.0
    }
}
