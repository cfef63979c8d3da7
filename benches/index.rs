//! Benchmarks for [`LeveledIndex`].

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use leveled_index::LeveledIndex;
use rand::prelude::*;

/// Benchmarking sizes
const SIZES: [usize; 6] = [1, 10, 100, 1000, 10_000, 100_000];

/// An index holding `size` random keys, together with those keys.
fn filled(rng: &mut StdRng, size: usize) -> (LeveledIndex, Vec<i64>) {
    let mut index = LeveledIndex::with_capacity(size);
    let mut keys = Vec::with_capacity(size);
    while keys.len() < size {
        let key = rng.random();
        if index.insert(key).is_ok() {
            keys.push(key);
        }
    }
    (index, keys)
}

/// Benchmarking insertion
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("LeveledIndex Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let (mut index, _) = filled(&mut rng, size);

            b.iter(|| {
                // Collisions are rejected, which is part of the cost.
                let _ = black_box(index.insert(rng.random()));
            });
        });
    }
}

/// Benchmarking lookups of present keys
pub fn find(c: &mut Criterion) {
    let mut group = c.benchmark_group("LeveledIndex Find");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let (index, keys) = filled(&mut rng, size);
            let queries: Vec<i64> = keys.choose_multiple(&mut rng, 10).copied().collect();

            b.iter(|| {
                for &key in &queries {
                    black_box(index.find(key));
                }
            });
        });
    }
}

/// Benchmarking a deletion followed by re-insertion of the same key
pub fn delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("LeveledIndex Delete");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let (mut index, keys) = filled(&mut rng, size);

            b.iter(|| {
                if let Some(&key) = keys.choose(&mut rng) {
                    black_box(index.delete(key));
                    let _ = index.insert(key);
                }
            });
        });
    }
}

/// Benchmarking iteration
pub fn iter(c: &mut Criterion) {
    c.bench_function("LeveledIndex Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let (index, _) = filled(&mut rng, 100_000);

        b.iter(|| {
            for node in &index {
                black_box(node.key());
            }
        });
    });
}
