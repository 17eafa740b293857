//! Property tests for distance metrics, set distances and autoregression
//!
//! Deterministic pseudo-random inputs from `SimpleRng`; no external
//! property-testing framework.

mod helpers;

use helpers::{assert_close, probability_vector};
use particle_tracker_rs::common::autoregression::{predict, pushpop, HistoryRing};
use particle_tracker_rs::common::metrics::{
    distance, distance_to_point, distance_to_set, DistanceMetric, SetDistanceMetric,
};
use particle_tracker_rs::common::rng::Rng;
use particle_tracker_rs::SimpleRng;

const SYMMETRIC: [DistanceMetric; 3] = [
    DistanceMetric::Euclidean,
    DistanceMetric::Manhattan,
    DistanceMetric::Chebyshev,
];

fn random_vector(rng: &mut SimpleRng, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.rand() * 20.0 - 10.0).collect()
}

#[test]
fn test_point_metrics_symmetric_and_zero_on_identity() {
    let mut rng = SimpleRng::new(11);
    for trial in 0..50 {
        let n = 1 + trial % 7;
        let x = random_vector(&mut rng, n);
        let y = random_vector(&mut rng, n);
        for metric in SYMMETRIC {
            let dxy = distance(&x, &y, metric);
            let dyx = distance(&y, &x, metric);
            assert_close(dxy, dyx, 1e-12, "symmetry");
            assert!(dxy > 0.0, "{:?} zero for distinct inputs", metric);
            assert_eq!(distance(&x, &x, metric), 0.0);
        }
    }
}

#[test]
fn test_squared_hellinger_bounded_for_distributions() {
    for seed in 1..40 {
        let p = probability_vector(16, seed);
        let q = probability_vector(16, seed + 1000);
        let d = distance(&p, &q, DistanceMetric::SquaredHellinger);
        assert!((0.0..=1.0).contains(&d), "squared Hellinger {} out of range", d);
        assert!(distance(&p, &p, DistanceMetric::SquaredHellinger) < 1e-6);
    }
    // Disjoint supports are maximally distant
    let d = distance(&[1.0, 0.0], &[0.0, 1.0], DistanceMetric::SquaredHellinger);
    assert_close(d, 1.0, 1e-12, "disjoint");
}

#[test]
#[should_panic(expected = "Container size unequal")]
fn test_mismatched_lengths_panic() {
    distance(&[1.0, 2.0], &[1.0], DistanceMetric::Euclidean);
}

#[test]
fn test_distance_to_point_infimum() {
    let set = [[3.0], [6.0]];
    let d = distance_to_point(
        &set,
        &[1.0],
        SetDistanceMetric::Infimum,
        DistanceMetric::Euclidean,
    );
    assert_close(d, 2.0, 1e-12, "infimum");

    let d = distance_to_point(
        &set,
        &[1.0],
        SetDistanceMetric::Supremum,
        DistanceMetric::Euclidean,
    );
    assert_close(d, 5.0, 1e-12, "supremum");
}

#[test]
fn test_hausdorff_between_sets() {
    let a = vec![vec![3.0], vec![6.0]];
    let b = vec![vec![1.0], vec![3.0], vec![6.0], vec![7.0]];

    let ab = distance_to_set(&a, &b, SetDistanceMetric::SupInf, DistanceMetric::Euclidean);
    let ba = distance_to_set(&b, &a, SetDistanceMetric::SupInf, DistanceMetric::Euclidean);
    assert_close(ab, 0.0, 1e-12, "supinf(a, b)");
    assert_close(ba, 2.0, 1e-12, "supinf(b, a)");

    let h = distance_to_set(&a, &b, SetDistanceMetric::Hausdorff, DistanceMetric::Euclidean);
    assert_close(h, 2.0, 1e-12, "hausdorff");
    let h_rev = distance_to_set(&b, &a, SetDistanceMetric::Hausdorff, DistanceMetric::Euclidean);
    assert_close(h_rev, h, 1e-12, "hausdorff symmetry");
}

#[test]
fn test_pushpop_ring_discipline() {
    let mut rng = SimpleRng::new(5);
    let mut window = vec![1.0, 2.0, 3.0];
    let mut ring = HistoryRing::from_recent_first(&window);
    for _ in 0..20 {
        let value = rng.rand();
        let oldest = *window.last().unwrap();
        let dropped = pushpop(&mut window, value);
        assert_eq!(dropped, oldest);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0], value);

        let ring_dropped = ring.push_pop(value);
        assert_eq!(ring_dropped, dropped);
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.front(), value);
        assert_eq!(ring.to_vec(), window);
    }
}

#[test]
fn test_constant_velocity_prediction() {
    let mut rng = SimpleRng::new(1);
    for (x1, x0) in [(10.0, 8.0), (3.5, 4.0), (0.0, 0.0)] {
        let predicted = predict([x1, x0], &[2.0, -1.0], 0.0, 0.0, &mut rng);
        assert_close(predicted, 2.0 * x1 - x0, 1e-12, "AR(2) extrapolation");
    }
}
