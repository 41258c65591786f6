//! Benchmarks for nearest-point search.
//!
//! Run with: cargo bench --package geogrid

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{Array1, Array2};

use geogrid::Grid;

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_nearest");

    // Global 0.25-degree rectilinear grid (1440 x 721).
    let rectilinear = Grid::RectilinearCentroids {
        lon: Array1::from_iter((0..1440).map(|i| i as f64 * 0.25)),
        lat: Array1::from_iter((0..721).map(|j| j as f64 * 0.25 - 90.0)),
    };
    group.bench_function("rectilinear_global_0p25", |b| {
        b.iter(|| rectilinear.find_nearest(black_box(-74.0), black_box(45.5), None))
    });

    // Regional curvilinear grid (200 x 200), brute-force path.
    let irregular = Grid::IrregularCentroids {
        lon: Array2::from_shape_fn((200, 200), |(r, c)| {
            -80.0 + c as f64 * 0.1 + r as f64 * 0.01
        }),
        lat: Array2::from_shape_fn((200, 200), |(r, c)| 40.0 + r as f64 * 0.1 + c as f64 * 0.005),
    };
    group.bench_function("irregular_200x200", |b| {
        b.iter(|| irregular.find_nearest(black_box(-70.0), black_box(50.0), None))
    });

    group.finish();
}

criterion_group!(benches, bench_nearest);
criterion_main!(benches);
