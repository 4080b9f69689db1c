// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_kdtree::KdTree;

use rstar::{AABB, RTree};

fn gen_grid_points(n: usize, cell: f64) -> Vec<[f64; 2]> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push([x as f64 * cell, y as f64 * cell]);
        }
    }
    out
}

fn bench_kdtree_external_compare_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_external_compare_f64");
    for &n in &[64usize, 128] {
        let points = gen_grid_points(n, 10.0);
        let (low, high) = ([100.0, 100.0], [500.0, 500.0]);
        let query = [333.3, 777.7];
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("understory_build_query_n{}", n), |b| {
            b.iter(|| {
                let tree = KdTree::build(&points).unwrap();
                let hits = tree.range(&low, &high).unwrap().len();
                black_box(hits);
                black_box(tree.nearest(&query).unwrap());
            })
        });

        group.bench_function(format!("understory_insert_query_n{}", n), |b| {
            b.iter_batched(
                || KdTree::<f64>::new(2).unwrap(),
                |mut tree| {
                    for p in &points {
                        tree.insert(p).unwrap();
                    }
                    let hits = tree.range(&low, &high).unwrap().len();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || points.clone(),
                |pts| {
                    let tree = RTree::bulk_load(pts);
                    let aabb = AABB::from_corners(low, high);
                    let hits: usize = tree.locate_in_envelope(&aabb).count();
                    black_box(hits);
                    black_box(tree.nearest_neighbor(&query));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_kdtree_external_compare_f64);
criterion_main!(benches);
