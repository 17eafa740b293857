//! Crutchfield information distance between pixel sensors
//!
//! `d(X, Y) = H(X|Y) + H(Y|X)`, estimated from the joint histogram of two
//! pixel positions over a batch of frames. Zero for pixels that determine
//! each other, growing as they become independent.

use nalgebra::DMatrix;

use super::Histogram;
use crate::filter::errors::HistogramError;
use crate::image::IntensityMatrix;

/// Anything that can report a pairwise distance between sensors
pub trait DistanceSource {
    /// Number of sensors
    fn sensor_count(&self) -> usize;

    /// Distance between sensors `p0` and `p1`
    fn distance(&self, p0: usize, p1: usize) -> f64;
}

/// Histogram with joint frequencies plus a cached distance matrix.
#[derive(Debug, Clone)]
pub struct Crutchfield {
    histogram: Histogram,
    distances: Option<DMatrix<f64>>,
}

impl Crutchfield {
    /// Distance engine for frames of `width × height` pixels.
    pub fn new(bins: usize, width: usize, height: usize) -> Result<Self, HistogramError> {
        Ok(Self {
            histogram: Histogram::new(bins, width, height)?.with_joint_frequencies(true),
            distances: None,
        })
    }

    /// Underlying histogram
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Recompute all frequency tables. Cached distances are discarded.
    pub fn calc_probabilities(&mut self, frames: &[IntensityMatrix]) -> Result<(), HistogramError> {
        self.distances = None;
        self.histogram.calc_probabilities(frames)
    }

    /// `H(p0|p1) + H(p1|p0)` from the current tables.
    ///
    /// # Panics
    /// If probabilities have not been computed.
    pub fn calc_distance(&self, p0: usize, p1: usize) -> f64 {
        if p0 == p1 {
            return 0.0;
        }
        let d = self.histogram.conditional_entropy(p0, p1) + self.histogram.conditional_entropy(p1, p0);
        debug_assert!(d >= -1e-9, "negative information distance {}", d);
        d.max(0.0)
    }

    /// Fill the symmetric distance matrix for every pair of sensors.
    ///
    /// # Panics
    /// If probabilities have not been computed.
    pub fn calc_distances(&mut self) {
        let n = self.histogram.sensor_count();
        let mut distances = DMatrix::zeros(n, n);
        for p0 in 0..n {
            for p1 in 0..p0 {
                let d = self.calc_distance(p0, p1);
                distances[(p0, p1)] = d;
                distances[(p1, p0)] = d;
            }
        }
        log::debug!("Computed {}x{} Crutchfield distance matrix", n, n);
        self.distances = Some(distances);
    }

    /// Cached distance matrix, if computed
    pub fn distances(&self) -> Option<&DMatrix<f64>> {
        self.distances.as_ref()
    }
}

impl DistanceSource for Crutchfield {
    fn sensor_count(&self) -> usize {
        self.histogram.sensor_count()
    }

    /// # Panics
    /// If [`Crutchfield::calc_distances`] has not been called since the
    /// last probability computation.
    fn distance(&self, p0: usize, p1: usize) -> f64 {
        match &self.distances {
            Some(distances) => distances[(p0, p1)],
            None => panic!("distance queried before calc_distances"),
        }
    }
}
