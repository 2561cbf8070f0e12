use std::hint::black_box;

use common::Buffer2;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roi_features::{
    scan_image, standard_stages, Config, FeatureGate, InMemoryImage, ReduceContext, ReductionPlan,
    Roi, RoiRegistry,
};

/// Square plate tiled with `cells x cells` blobs, each its own label.
fn blob_plate(size: usize, cells: usize) -> InMemoryImage {
    let mut rng = StdRng::seed_from_u64(42);
    let pitch = size / cells;
    let radius = (pitch as i64 / 2 - 1).max(1);
    let mut labels = Buffer2::new_default(size, size);
    let mut intensities = Buffer2::new_default(size, size);
    for y in 0..size {
        for x in 0..size {
            intensities[(x, y)] = rng.random_range(0..4096u32);
            let (cx, cy) = (x / pitch, y / pitch);
            if cx >= cells || cy >= cells {
                continue;
            }
            let dx = (x % pitch) as i64 - pitch as i64 / 2;
            let dy = (y % pitch) as i64 - pitch as i64 / 2;
            if dx * dx + dy * dy <= radius * radius {
                labels[(x, y)] = (cy * cells + cx + 1) as u32;
            }
        }
    }
    InMemoryImage::new(labels, intensities, 256, 256)
}

fn scan_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_image");
    for &(size, cells) in &[(1024usize, 32usize), (2048, 64)] {
        let image = blob_plate(size, cells);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &image, |b, image| {
            b.iter(|| {
                let registry = RoiRegistry::new();
                scan_image(image, &registry, 8).unwrap();
                black_box(registry.len())
            })
        });
    }
    group.finish();
}

fn reduce_benchmarks(c: &mut Criterion) {
    let image = blob_plate(1024, 32);
    let registry = RoiRegistry::new();
    scan_image(&image, &registry, 8).unwrap();
    let rois: Vec<Roi> = registry.into_rois().into_iter().map(Roi::new).collect();

    let plan = ReductionPlan::new(standard_stages()).unwrap();
    let config = Config::default();
    let mut group = c.benchmark_group("reduce");
    for (name, gate) in [
        ("all", FeatureGate::all()),
        ("no_texture", FeatureGate::from_names(&["*ALL_INTENSITY*", "*ALL_MORPHOLOGY*"]).unwrap()),
    ] {
        group.bench_function(name, |b| {
            b.iter_batched(
                || rois.clone(),
                |mut rois| {
                    let ctx = ReduceContext {
                        gate: &gate,
                        config: &config,
                    };
                    black_box(plan.run(&mut rois, &ctx))
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, scan_benchmarks, reduce_benchmarks);
criterion_main!(benches);
