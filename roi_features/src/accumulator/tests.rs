use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::*;
use crate::testing::{accumulate, random_pixels};
use common::float_ext::FloatExt;

const REL: f64 = 1e-9;

/// Straight two-pass textbook moments, independent of the accumulator.
fn batch_moments(values: &[f64]) -> (f64, f64, f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let m2: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let m3: f64 = values.iter().map(|v| (v - mean).powi(3)).sum();
    let m4: f64 = values.iter().map(|v| (v - mean).powi(4)).sum();
    let variance = m2 / (n - 1.0);
    let skewness = n.sqrt() * m3 / m2.powf(1.5);
    let kurtosis = n * m4 / (m2 * m2) - 3.0;
    (mean, variance, skewness, kurtosis)
}

#[test]
fn test_three_pixel_roi() {
    let acc = accumulate(
        7,
        &[
            Pixel::new(0, 0, 5),
            Pixel::new(1, 0, 15),
            Pixel::new(0, 1, 25),
        ],
    );

    assert_eq!(acc.label(), 7);
    assert_eq!(acc.count(), 3);
    assert_eq!(acc.min(), 5);
    assert_eq!(acc.max(), 25);
    assert!((acc.mean() - 15.0).abs() < 1e-12);
    assert_eq!(acc.aabb(), Aabb::new(0, 1, 0, 1));
    assert_eq!(acc.energy(), 25.0 + 225.0 + 625.0);

    let m = acc.online_moments();
    assert!((m.variance - 100.0).abs() < 1e-12);
    assert!((m.stddev() - 10.0).abs() < 1e-12);
    assert!(m.skewness.abs() < 1e-12);
}

#[test]
fn test_single_pixel_roi() {
    let acc = RoiAccumulator::initialize(3, 10, 20, 40);
    let m = acc.online_moments();
    assert_eq!(acc.count(), 1);
    assert_eq!(m.mean, 40.0);
    assert_eq!(m.variance, 0.0);
    assert_eq!(m.skewness, 0.0);
    assert_eq!(m.kurtosis, 0.0);
    assert_eq!(m.rms, 40.0);
    assert_eq!(acc.aabb(), Aabb::from_point(10, 20));
}

#[test]
fn test_online_matches_batch_moments() {
    for seed in 0..8 {
        let pixels = random_pixels(seed, 500, 64, 64, 4095);
        let acc = accumulate(1, &pixels);
        let values: Vec<f64> = pixels.iter().map(|p| p.intensity as f64).collect();
        let (mean, variance, skewness, kurtosis) = batch_moments(&values);

        let m = acc.online_moments();
        assert!(m.mean.relatively_eq(mean, REL), "mean {} vs {}", m.mean, mean);
        assert!(m.variance.relatively_eq(variance, REL), "variance {} vs {}", m.variance, variance);
        assert!(m.skewness.relatively_eq(skewness, REL), "skewness {} vs {}", m.skewness, skewness);
        assert!(m.kurtosis.relatively_eq(kurtosis, REL), "kurtosis {} vs {}", m.kurtosis, kurtosis);
    }
}

#[test]
fn test_direct_moments_agree_with_online() {
    let pixels = random_pixels(42, 300, 40, 40, 255);
    let acc = accumulate(1, &pixels);
    let online = acc.online_moments();
    let direct = acc.direct_moments();

    assert!(direct.variance.relatively_eq(online.variance, REL));
    assert!(direct.skewness.relatively_eq(online.skewness, REL));
    assert!(direct.kurtosis.relatively_eq(online.kurtosis, REL));
    assert!(direct.rms.relatively_eq(online.rms, REL));
}

#[test]
fn test_moments_switch_on_threshold() {
    let pixels = random_pixels(5, 50, 20, 20, 1000);
    let acc = accumulate(1, &pixels);
    assert_eq!(acc.moments(50), acc.online_moments());
    assert_eq!(acc.moments(49), acc.direct_moments());
}

#[test]
fn test_permutation_invariance() {
    let pixels = random_pixels(11, 400, 50, 50, 60000);
    let reference = accumulate(9, &pixels);

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..5 {
        let mut shuffled = pixels.clone();
        shuffled.shuffle(&mut rng);
        let acc = accumulate(9, &shuffled);

        assert_eq!(acc.count(), reference.count());
        assert_eq!(acc.min(), reference.min());
        assert_eq!(acc.max(), reference.max());
        assert_eq!(acc.aabb(), reference.aabb());
        assert!(acc.mean().relatively_eq(reference.mean(), 1e-12));
    }
}

#[test]
fn test_buffer_and_aabb_invariants() {
    let pixels = random_pixels(3, 200, 30, 17, 100);
    let acc = accumulate(2, &pixels);

    assert_eq!(acc.count(), acc.pixels().len());
    assert_eq!(acc.histogram().len(), acc.count() as u64);
    let aabb = acc.aabb();
    assert!(acc.pixels().iter().all(|p| aabb.contains(p.x, p.y)));
}

#[test]
fn test_weighted_centroid_keeps_one_based_seed() {
    // Only the first observation is shifted by (+1, +1).
    let acc = accumulate(
        7,
        &[
            Pixel::new(0, 0, 5),
            Pixel::new(1, 0, 15),
            Pixel::new(0, 1, 25),
        ],
    );
    let weighted = acc.weighted_centroid();
    assert!((weighted.x - 2.0 / 3.0).abs() < 1e-12);
    assert!((weighted.y - 2.0 / 3.0).abs() < 1e-12);

    let plain = acc.centroid();
    assert!((plain.x - 1.0 / 3.0).abs() < 1e-12);
    assert!((plain.y - 1.0 / 3.0).abs() < 1e-12);

    let single = RoiAccumulator::initialize(1, 4, 9, 1).weighted_centroid();
    assert_eq!(single, DVec2::new(5.0, 10.0));
}

#[test]
fn test_mad_uses_running_mean() {
    // mean goes 10 -> 20; |30 - 20| = 10; MAD = 10 / 2
    let acc = accumulate(1, &[Pixel::new(0, 0, 10), Pixel::new(1, 0, 30)]);
    assert_eq!(acc.online_moments().mad, 5.0);
    // direct: |10 - 20| + |30 - 20| = 20, / 2
    assert_eq!(acc.direct_moments().mad, 10.0);
}
