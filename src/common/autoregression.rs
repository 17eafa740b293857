//! Autoregressive prediction over short value histories
//!
//! An AR(k) process predicts the next value as
//! `x[t] = c + Σ_{i=1..k} φ_i · x[t-i] + ε` with `ε ~ N(0, σ²)`.
//! No constraints are enforced on the coefficients, so the model is not
//! guaranteed to be stationary. The tracker uses `φ = [2, -1]`, i.e. a
//! constant-velocity extrapolation `x[t] = 2·x[t-1] - x[t-2]`.
//!
//! Histories are kept most-recent-first. [`HistoryRing`] stores a fixed
//! window and replaces its oldest entry in O(1); [`pushpop`] and [`rotate`]
//! do the same on a plain slice by shifting.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use smallvec::SmallVec;

/// Predict the next value of an autoregressive process.
///
/// # Arguments
/// * `history` - Past values `x[t-1], x[t-2], ...` (most recent first)
/// * `coefficients` - AR parameters `φ_1, φ_2, ...`
/// * `constant` - Constant term `c`
/// * `variance` - Variance of the white noise term; `0` gives a deterministic
///   prediction and draws nothing from `rng`
/// * `rng` - Source of the noise term
///
/// # Panics
/// If the history and coefficient lengths differ, or the variance is
/// negative or not finite.
pub fn predict<I, R>(
    history: I,
    coefficients: &[f64],
    constant: f64,
    variance: f64,
    rng: &mut R,
) -> f64
where
    I: IntoIterator<Item = f64>,
    R: Rng + ?Sized,
{
    assert!(
        variance.is_finite() && variance >= 0.0,
        "AR noise variance must be finite and non-negative, got {}",
        variance
    );
    let mut len = 0;
    let mut sum = 0.0;
    for (x, phi) in history.into_iter().zip(coefficients) {
        sum += phi * x;
        len += 1;
    }
    assert_eq!(
        len,
        coefficients.len(),
        "AR history shorter than the number of coefficients"
    );

    let noise = if variance > 0.0 {
        // std_dev is finite and positive here, so construction cannot fail
        match Normal::new(0.0, variance.sqrt()) {
            Ok(normal) => normal.sample(rng),
            Err(_) => 0.0,
        }
    } else {
        0.0
    };
    constant + sum + noise
}

/// Fixed-length window of past values, most recent first.
///
/// Backed by a small inline buffer and a head index: [`HistoryRing::push_pop`]
/// overwrites the oldest slot and moves the head, so the window length never
/// changes and nothing is shifted.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRing {
    buf: SmallVec<[f64; 4]>,
    /// Slot holding the most recent value
    head: usize,
}

impl HistoryRing {
    /// A window of `len` copies of `value`.
    ///
    /// # Panics
    /// If `len` is zero.
    pub fn filled(len: usize, value: f64) -> Self {
        assert!(len > 0, "history window must not be empty");
        Self {
            buf: SmallVec::from_elem(value, len),
            head: 0,
        }
    }

    /// A window holding `values`, given most recent first.
    ///
    /// # Panics
    /// If `values` is empty.
    pub fn from_recent_first(values: &[f64]) -> Self {
        assert!(!values.is_empty(), "history window must not be empty");
        Self {
            buf: SmallVec::from_slice(values),
            head: 0,
        }
    }

    /// Window length
    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Always false; a ring is never empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The most recent value
    #[inline]
    pub fn front(&self) -> f64 {
        self.buf[self.head]
    }

    /// The `age`-th most recent value (`0` is the front).
    ///
    /// # Panics
    /// If `age >= len()`.
    pub fn get(&self, age: usize) -> f64 {
        assert!(age < self.len(), "history index {} out of range", age);
        self.buf[(self.head + age) % self.len()]
    }

    /// Values from most recent to oldest
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |age| self.get(age))
    }

    /// Insert `value` as the most recent entry and drop the oldest one.
    ///
    /// Returns the dropped value.
    pub fn push_pop(&mut self, value: f64) -> f64 {
        let n = self.len();
        // The oldest slot sits just before the head
        let oldest = (self.head + n - 1) % n;
        let dropped = std::mem::replace(&mut self.buf[oldest], value);
        self.head = oldest;
        dropped
    }

    /// Values most recent first, as a vector
    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }
}

/// Direction for [`rotate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateDirection {
    /// Front element moves to the back
    Left,
    /// Back element moves to the front
    Right,
}

/// Rotate a slice by one position.
pub fn rotate<T>(values: &mut [T], direction: RotateDirection) {
    if values.is_empty() {
        return;
    }
    match direction {
        RotateDirection::Left => values.rotate_left(1),
        RotateDirection::Right => values.rotate_right(1),
    }
}

/// Shift `value` in at the front of a most-recent-first slice, dropping the
/// last (oldest) element.
///
/// # Panics
/// If `values` is empty.
pub fn pushpop<T>(values: &mut [T], value: T) -> T {
    assert!(!values.is_empty(), "cannot push into an empty window");
    values.rotate_right(1);
    std::mem::replace(&mut values[0], value)
}
