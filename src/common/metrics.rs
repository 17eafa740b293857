//! Distance metrics between numeric sequences and between sets of points
//!
//! Pure functions over `f64` slices. The tracker's observation model uses
//! [`DistanceMetric::SquaredHellinger`] between two normalised histograms; the
//! remaining metrics, norms, means and set distances are general purpose.
//!
//! Comparing sequences of different length is a programming error, not an
//! input error: every function here asserts equal lengths and panics otherwise.

use serde::{Deserialize, Serialize};

// ============================================================================
// Point metrics
// ============================================================================

/// Dissimilarity between two equal-length sequences.
///
/// Only metrics that need no additional information are provided (a
/// Mahalanobis distance, for example, would need a covariance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// `sqrt(Σ (x_i - y_i)²)`
    Euclidean,
    /// `Σ x_i·y_i`
    DotProduct,
    /// `-ln(Σ sqrt(x_i·y_i))`, inputs must be non-negative
    Bhattacharyya,
    /// `sqrt(Σ (sqrt(x_i) - sqrt(y_i))²) / sqrt(2)`
    Hellinger,
    /// `Σ |x_i - y_i|`
    Manhattan,
    /// `max_i |x_i - y_i|`
    Chebyshev,
    /// `Σ sqrt(x_i·y_i)`, inputs must be non-negative
    BhattacharyyaCoefficient,
    /// `sqrt(1 - Σ sqrt(x_i·y_i))`, in [0, 1] for probability distributions
    SquaredHellinger,
}

#[inline]
fn assert_same_len(x: &[f64], y: &[f64]) {
    assert_eq!(
        x.len(),
        y.len(),
        "Container size unequal: {} vs {}",
        x.len(),
        y.len()
    );
}

/// Bhattacharyya coefficient `Σ sqrt(x_i·y_i)`.
///
/// # Panics
/// If `x` and `y` differ in length.
pub fn bhattacharyya_coefficient(x: &[f64], y: &[f64]) -> f64 {
    assert_same_len(x, y);
    x.iter().zip(y).map(|(a, b)| (a * b).sqrt()).sum()
}

/// Distance between `x` and `y` under `metric`.
///
/// # Panics
/// If `x` and `y` differ in length.
pub fn distance(x: &[f64], y: &[f64], metric: DistanceMetric) -> f64 {
    assert_same_len(x, y);
    let pairs = x.iter().zip(y);
    match metric {
        DistanceMetric::DotProduct => pairs.map(|(a, b)| a * b).sum(),
        DistanceMetric::Euclidean => pairs.map(|(a, b)| (a - b) * (a - b)).sum::<f64>().sqrt(),
        DistanceMetric::Bhattacharyya => -bhattacharyya_coefficient(x, y).ln(),
        DistanceMetric::Hellinger => {
            let sum: f64 = pairs
                .map(|(a, b)| {
                    let d = a.sqrt() - b.sqrt();
                    d * d
                })
                .sum();
            sum.sqrt() / std::f64::consts::SQRT_2
        }
        DistanceMetric::Chebyshev => pairs.map(|(a, b)| (a - b).abs()).fold(0.0, f64::max),
        DistanceMetric::Manhattan => pairs.map(|(a, b)| (a - b).abs()).sum(),
        DistanceMetric::BhattacharyyaCoefficient => bhattacharyya_coefficient(x, y),
        DistanceMetric::SquaredHellinger => {
            // Rounding can push the coefficient a hair above 1 for identical inputs
            (1.0 - bhattacharyya_coefficient(x, y)).max(0.0).sqrt()
        }
    }
}

// ============================================================================
// Norms and means
// ============================================================================

/// Vector norms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Norm {
    /// L2 norm
    Euclidean,
    /// L1 norm
    Taxicab,
    /// L∞ norm
    Maximum,
}

/// Norm of `x`. The norm of an empty sequence is 0.
pub fn norm(x: &[f64], norm: Norm) -> f64 {
    match norm {
        Norm::Euclidean => x.iter().map(|v| v * v).sum::<f64>().sqrt(),
        Norm::Taxicab => x.iter().map(|v| v.abs()).sum(),
        Norm::Maximum => x.iter().map(|v| v.abs()).fold(0.0, f64::max),
    }
}

/// Kinds of mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mean {
    /// `Σ x / n`
    Arithmetic,
    /// `exp(Σ ln x / n)`
    Geometric,
    /// `n / Σ (1/x)`
    Harmonic,
    /// `sqrt(Σ x² / n)`
    Quadratic,
}

/// Mean of `x`. The mean of an empty sequence is 0.
pub fn mean(x: &[f64], mean: Mean) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let n = x.len() as f64;
    match mean {
        Mean::Arithmetic => x.iter().sum::<f64>() / n,
        Mean::Geometric => (x.iter().map(|v| v.ln()).sum::<f64>() / n).exp(),
        Mean::Harmonic => n / x.iter().map(|v| 1.0 / v).sum::<f64>(),
        Mean::Quadratic => (x.iter().map(|v| v * v).sum::<f64>() / n).sqrt(),
    }
}

// ============================================================================
// Nudging
// ============================================================================

fn adjust(tomove: &mut [f64], reference: &[f64], mu: f64) {
    assert_same_len(tomove, reference);
    for (x, r) in tomove.iter_mut().zip(reference) {
        *x += (*x - r) * mu;
    }
}

/// Move `tomove` away from `reference`: `x_i ← x_i + (x_i - r_i)·mu`.
///
/// # Panics
/// If the lengths differ or `mu` is outside `(0, 1]`.
pub fn increase_distance(tomove: &mut [f64], reference: &[f64], mu: f64) {
    assert!(mu > 0.0 && mu <= 1.0, "mu must lie in (0, 1], got {}", mu);
    adjust(tomove, reference, mu);
}

/// Move `tomove` towards `reference`: `x_i ← x_i - (x_i - r_i)·mu`.
///
/// With `mu = 1` the result equals the reference.
///
/// # Panics
/// If the lengths differ or `mu` is outside `(0, 1]`.
pub fn decrease_distance(tomove: &mut [f64], reference: &[f64], mu: f64) {
    assert!(mu > 0.0 && mu <= 1.0, "mu must lie in (0, 1], got {}", mu);
    adjust(tomove, reference, -mu);
}

// ============================================================================
// Set distances
// ============================================================================

/// How point distances are combined into a distance involving a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetDistanceMetric {
    /// Smallest point distance
    Infimum,
    /// Largest point distance
    Supremum,
    /// `max(supinf(A, B), supinf(B, A))`
    Hausdorff,
    /// `max_{a ∈ A} inf_{b ∈ B} d(a, b)` (directed, not symmetric)
    SupInf,
}

/// Distance between a set of points and a single point.
///
/// `SupInf` and `Hausdorff` treat `point` as a singleton set.
///
/// # Panics
/// If `set` is empty or any member differs in length from `point`.
pub fn distance_to_point<P: AsRef<[f64]>>(
    set: &[P],
    point: &[f64],
    set_metric: SetDistanceMetric,
    point_metric: DistanceMetric,
) -> f64 {
    assert!(!set.is_empty(), "distance to an empty set is undefined");
    let distances = || set.iter().map(|s| distance(s.as_ref(), point, point_metric));
    match set_metric {
        SetDistanceMetric::Infimum => distances().fold(f64::INFINITY, f64::min),
        SetDistanceMetric::Supremum => distances().fold(f64::NEG_INFINITY, f64::max),
        SetDistanceMetric::SupInf | SetDistanceMetric::Hausdorff => {
            distance_to_set(&[point], set, set_metric, point_metric)
        }
    }
}

/// Distance between two sets of points.
///
/// # Panics
/// If either set is empty or point lengths differ.
pub fn distance_to_set<P: AsRef<[f64]>, Q: AsRef<[f64]>>(
    first: &[P],
    second: &[Q],
    set_metric: SetDistanceMetric,
    point_metric: DistanceMetric,
) -> f64 {
    assert!(
        !first.is_empty() && !second.is_empty(),
        "distance between empty sets is undefined"
    );
    match set_metric {
        SetDistanceMetric::Hausdorff => {
            let xy = distance_to_set(first, second, SetDistanceMetric::SupInf, point_metric);
            let yx = distance_to_set(second, first, SetDistanceMetric::SupInf, point_metric);
            xy.max(yx)
        }
        SetDistanceMetric::SupInf => first
            .iter()
            .map(|a| {
                distance_to_point(second, a.as_ref(), SetDistanceMetric::Infimum, point_metric)
            })
            .fold(f64::NEG_INFINITY, f64::max),
        SetDistanceMetric::Infimum => first
            .iter()
            .map(|a| {
                distance_to_point(second, a.as_ref(), SetDistanceMetric::Infimum, point_metric)
            })
            .fold(f64::INFINITY, f64::min),
        SetDistanceMetric::Supremum => first
            .iter()
            .map(|a| {
                distance_to_point(second, a.as_ref(), SetDistanceMetric::Supremum, point_metric)
            })
            .fold(f64::NEG_INFINITY, f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_basic_metrics() {
        let x = [1.0, 2.0, 3.0];
        let y = [4.0, 0.0, 3.0];
        assert!((distance(&x, &y, DistanceMetric::DotProduct) - 13.0).abs() < EPS);
        assert!((distance(&x, &y, DistanceMetric::Euclidean) - 13.0_f64.sqrt()).abs() < EPS);
        assert!((distance(&x, &y, DistanceMetric::Manhattan) - 5.0).abs() < EPS);
        assert!((distance(&x, &y, DistanceMetric::Chebyshev) - 3.0).abs() < EPS);
    }

    #[test]
    fn test_hellinger_family_on_distributions() {
        let p = [0.5, 0.5, 0.0, 0.0];
        let q = [0.0, 0.0, 0.5, 0.5];
        assert!(distance(&p, &q, DistanceMetric::BhattacharyyaCoefficient).abs() < EPS);
        assert!((distance(&p, &q, DistanceMetric::SquaredHellinger) - 1.0).abs() < EPS);
        assert!((distance(&p, &q, DistanceMetric::Hellinger) - 1.0).abs() < EPS);
        assert!(distance(&p, &q, DistanceMetric::Bhattacharyya).is_infinite());

        assert!(distance(&p, &p, DistanceMetric::SquaredHellinger).abs() < 1e-7);
        assert!(distance(&p, &p, DistanceMetric::Bhattacharyya).abs() < EPS);
    }

    #[test]
    fn test_squared_hellinger_never_nan_for_identical_inputs() {
        let p = [0.1, 0.2, 0.3, 0.4];
        let d = distance(&p, &p, DistanceMetric::SquaredHellinger);
        assert!(d.is_finite());
        assert!(d >= 0.0);
    }

    #[test]
    #[should_panic(expected = "Container size unequal")]
    fn test_length_mismatch_panics() {
        distance(&[1.0, 2.0], &[1.0], DistanceMetric::Euclidean);
    }

    #[test]
    fn test_norms_and_means() {
        let x = [3.0, -4.0];
        assert!((norm(&x, Norm::Euclidean) - 5.0).abs() < EPS);
        assert!((norm(&x, Norm::Taxicab) - 7.0).abs() < EPS);
        assert!((norm(&x, Norm::Maximum) - 4.0).abs() < EPS);
        assert_eq!(norm(&[], Norm::Maximum), 0.0);

        let y = [1.0, 4.0];
        assert!((mean(&y, Mean::Arithmetic) - 2.5).abs() < EPS);
        assert!((mean(&y, Mean::Geometric) - 2.0).abs() < 1e-10);
        assert!((mean(&y, Mean::Harmonic) - 1.6).abs() < EPS);
        assert!((mean(&y, Mean::Quadratic) - 8.5_f64.sqrt()).abs() < EPS);
        assert_eq!(mean(&[], Mean::Harmonic), 0.0);
    }

    #[test]
    fn test_nudging() {
        let reference = [0.0, 0.0];
        let mut x = [1.0, -2.0];
        increase_distance(&mut x, &reference, 0.5);
        assert_eq!(x, [1.5, -3.0]);

        decrease_distance(&mut x, &reference, 1.0);
        assert_eq!(x, [0.0, 0.0]);
    }

    #[test]
    #[should_panic]
    fn test_nudging_rejects_zero_mu() {
        let mut x = [1.0];
        increase_distance(&mut x, &[0.0], 0.0);
    }

    #[test]
    fn test_distance_to_point_infimum() {
        let set = vec![vec![3.0], vec![6.0]];
        let d = distance_to_point(
            &set,
            &[1.0],
            SetDistanceMetric::Infimum,
            DistanceMetric::Euclidean,
        );
        assert_eq!(d, 2.0);

        let d = distance_to_point(
            &set,
            &[1.0],
            SetDistanceMetric::Supremum,
            DistanceMetric::Euclidean,
        );
        assert_eq!(d, 5.0);
    }

    #[test]
    fn test_supinf_and_hausdorff() {
        let a = vec![vec![1.0], vec![3.0], vec![6.0], vec![7.0]];
        let b = vec![vec![3.0], vec![6.0]];
        let euclid = DistanceMetric::Euclidean;

        assert_eq!(distance_to_set(&a, &b, SetDistanceMetric::SupInf, euclid), 2.0);
        assert_eq!(distance_to_set(&b, &a, SetDistanceMetric::SupInf, euclid), 0.0);
        assert_eq!(distance_to_set(&b, &a, SetDistanceMetric::Hausdorff, euclid), 2.0);
        assert_eq!(distance_to_set(&a, &b, SetDistanceMetric::Hausdorff, euclid), 2.0);
        assert_eq!(distance_to_set(&a, &b, SetDistanceMetric::Infimum, euclid), 0.0);
        assert_eq!(distance_to_set(&a, &b, SetDistanceMetric::Supremum, euclid), 5.0);
    }

    #[test]
    fn test_point_as_singleton_set() {
        let set = vec![vec![3.0], vec![6.0]];
        let euclid = DistanceMetric::Euclidean;
        // singleton {1}: supinf({1}, S) = 2, supinf(S, {1}) = 5
        assert_eq!(
            distance_to_point(&set, &[1.0], SetDistanceMetric::SupInf, euclid),
            2.0
        );
        assert_eq!(
            distance_to_point(&set, &[1.0], SetDistanceMetric::Hausdorff, euclid),
            5.0
        );
    }
}
