use rayon::prelude::*;

use super::*;
use crate::testing::random_pixels;

#[test]
fn test_background_is_skipped() {
    let registry = RoiRegistry::with_shards(4);
    assert!(!registry.observe(0, 0, BACKGROUND, 100));
    assert!(registry.is_empty());
    assert!(registry.observe(1, 1, 5, 100));
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(5));
    assert!(!registry.contains(0));
}

#[test]
fn test_discovery_order_sequential() {
    let registry = RoiRegistry::with_shards(8);
    for (x, label) in [(0, 30), (1, 4), (2, 30), (3, 17), (4, 4), (5, 1)] {
        registry.observe(x, 0, label, 1);
    }
    assert_eq!(registry.labels(), vec![30, 4, 17, 1]);

    let rois = registry.into_rois();
    let labels: Vec<_> = rois.iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec![30, 4, 17, 1]);
    assert_eq!(rois[0].count(), 2);
    assert_eq!(rois[1].count(), 2);
}

#[test]
fn test_concrete_scenario() {
    let registry = RoiRegistry::new();
    registry.observe(0, 0, 7, 5);
    registry.observe(1, 0, 7, 15);
    registry.observe(0, 1, 7, 25);

    let roi = registry.snapshot(7).unwrap();
    assert_eq!(roi.count(), 3);
    assert_eq!(roi.min(), 5);
    assert_eq!(roi.max(), 25);
    assert!((roi.mean() - 15.0).abs() < 1e-12);
    assert_eq!(roi.aabb(), crate::types::Aabb::new(0, 1, 0, 1));
}

#[test]
fn test_concurrent_observe_conserves_pixels() {
    let pixels = random_pixels(17, 20_000, 400, 400, 1000);
    // Label each pixel by a coarse cell so many threads hit the same labels.
    let observations: Vec<(u32, u32, Label, u32)> = pixels
        .iter()
        .map(|p| (p.x, p.y, (p.x / 50) * 8 + p.y / 50 + 1, p.intensity))
        .collect();
    let background = observations.len() / 10;
    let registry = RoiRegistry::with_shards(2);

    let fed: usize = observations
        .par_iter()
        .enumerate()
        .map(|(i, &(x, y, label, intensity))| {
            let label = if i < background { BACKGROUND } else { label };
            registry.observe(x, y, label, intensity) as usize
        })
        .sum();

    assert_eq!(fed, observations.len() - background);
    let rois = registry.into_rois();
    let total: usize = rois.iter().map(|r| r.count()).sum();
    assert_eq!(total, fed);

    let mut labels: Vec<_> = rois.iter().map(|r| r.label()).collect();
    let unique = labels.len();
    labels.sort_unstable();
    labels.dedup();
    assert_eq!(labels.len(), unique, "a label was initialized twice");

    for roi in &rois {
        let aabb = roi.aabb();
        assert_eq!(roi.histogram().len(), roi.count() as u64);
        assert!(roi.pixels().iter().all(|p| aabb.contains(p.x, p.y)));
    }
}

#[test]
fn test_concurrent_single_label_matches_sequential() {
    let pixels = random_pixels(23, 5_000, 100, 100, 255);
    let registry = RoiRegistry::new();
    pixels.par_iter().for_each(|p| {
        registry.observe(p.x, p.y, 42, p.intensity);
    });

    let roi = registry.snapshot(42).unwrap();
    let sum: f64 = pixels.iter().map(|p| p.intensity as f64).sum();
    assert_eq!(roi.count(), pixels.len());
    assert!((roi.mean() - sum / pixels.len() as f64).abs() < 1e-9);
    assert_eq!(roi.min(), pixels.iter().map(|p| p.intensity).min().unwrap());
    assert_eq!(roi.max(), pixels.iter().map(|p| p.intensity).max().unwrap());
}

#[test]
fn test_shard_count_is_power_of_two() {
    assert_eq!(RoiRegistry::with_shards(5).shards.len(), 8);
    assert_eq!(RoiRegistry::with_shards(0).shards.len(), 1);
}
