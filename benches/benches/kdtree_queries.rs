// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_kdtree::{KdTree, distance_squared, in_range};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_grid_points(n: usize, cell: f64) -> Vec<[f64; 2]> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push([x as f64 * cell, y as f64 * cell]);
        }
    }
    out
}

fn gen_random_points<const K: usize>(count: usize, extent: f64, seed: u64) -> Vec<[f64; K]> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| core::array::from_fn(|_| rng.next_f64() * extent))
        .collect()
}

fn gen_clustered_points(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<[f64; 2]> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push([cx + dx, cy + dy]);
        }
    }
    out
}

fn linear_nearest<'a>(points: &'a [[f64; 2]], q: &[f64; 2]) -> Option<&'a [f64; 2]> {
    points.iter().min_by(|a, b| {
        let da = distance_squared(*a, q).unwrap_or(f64::INFINITY);
        let db = distance_squared(*b, q).unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
    })
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[32usize, 64, 128] {
        let points = gen_grid_points(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter(|| {
                let tree = KdTree::build(&points).unwrap();
                black_box(tree.len());
            })
        });
    }
    let points = gen_clustered_points(32, 128, 200.0);
    group.bench_function("clustered", |b| {
        b.iter(|| {
            let tree = KdTree::build(&points).unwrap();
            black_box(tree.len());
        })
    });
    let points = gen_random_points::<3>(16_384, 1000.0, 0xCAFE_F00D_DEAD_BEEF);
    group.bench_function("random_3d_16k", |b| {
        b.iter(|| {
            let tree = KdTree::build(&points).unwrap();
            black_box(tree.len());
        })
    });
    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let points = gen_random_points::<2>(4096, 2000.0, 0xFACE_FEED_CAFE_BABE);
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("random_4096_into_empty", |b| {
        b.iter_batched(
            || KdTree::<f64>::new(2).unwrap(),
            |mut tree| {
                for p in &points {
                    tree.insert(p).unwrap();
                }
                black_box(tree.height());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");
    let points = gen_random_points::<2>(16_384, 2000.0, 0xBADC_F00D_1234_5678);
    let queries = gen_random_points::<2>(256, 2000.0, 0x5EED_0000_1111_2222);
    let tree = KdTree::build(&points).unwrap();
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("kdtree_16k", |b| {
        b.iter(|| {
            for q in &queries {
                black_box(tree.nearest(q).unwrap());
            }
        })
    });
    group.bench_function("linear_scan_16k", |b| {
        b.iter(|| {
            for q in &queries {
                black_box(linear_nearest(&points, q));
            }
        })
    });
    group.finish();
}

fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    for &n in &[64usize, 128] {
        let points = gen_grid_points(n, 10.0);
        let tree = KdTree::build(&points).unwrap();
        let low = [100.0, 100.0];
        let high = [500.0, 500.0];
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("kdtree_grid_n{}", n), |b| {
            b.iter(|| {
                let hits = tree.range(&low, &high).unwrap().len();
                black_box(hits);
            })
        });
        group.bench_function(format!("linear_scan_grid_n{}", n), |b| {
            b.iter(|| {
                let hits = points
                    .iter()
                    .filter(|p| in_range(&p[..], &low, &high).unwrap_or(false))
                    .count();
                black_box(hits);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_insert, bench_nearest, bench_range);
criterion_main!(benches);
