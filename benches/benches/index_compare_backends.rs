// Copyright 2025 the Corral Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use corral_index::{Aabb2D, GridIndex, Index, StrIndex};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<(Aabb2D, u32)> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push((Aabb2D::from_xywh(x0, y0, cell, cell), (y * n + x) as u32));
        }
    }
    out
}

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

// Overlapping boxes around a few hot spots, like parcels clustered in towns.
fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<(Aabb2D, u32)> {
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
            let w = 4.0 + rng.next_f64() * 24.0;
            out.push((Aabb2D::from_xywh(cx + dx, cy + dy, w, w), out.len() as u32));
        }
    }
    out
}

fn gen_points(count: usize, extent: f64, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| (rng.next_f64() * extent, rng.next_f64() * extent))
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[32usize, 64, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("flatvec_n{n}"), |b| {
            b.iter_batched(
                || rects.clone(),
                |r| black_box(Index::build(r)),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("grid_n{n}"), |b| {
            b.iter_batched(
                || rects.clone(),
                |r| black_box(GridIndex::build(r)),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("str_tree_n{n}"), |b| {
            b.iter_batched(
                || rects.clone(),
                |r| black_box(StrIndex::build(r)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_point_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_point");
    let points = gen_points(4096, 2000.0, 0xFACE_FEED_CAFE_BABE);
    group.throughput(Throughput::Elements(points.len() as u64));
    for (label, rects) in [
        ("grid_layout", gen_grid_rects(128, 2000.0 / 128.0)),
        ("clustered", gen_clustered_rects(16, 256, 128.0)),
    ] {
        let flat = Index::build(rects.clone());
        let grid = GridIndex::build(rects.clone());
        let tree = StrIndex::build(rects);
        group.bench_function(format!("flatvec_{label}"), |b| {
            b.iter(|| {
                let hits: usize = points.iter().map(|&(x, y)| flat.query_point(x, y).count()).sum();
                black_box(hits);
            })
        });
        group.bench_function(format!("grid_{label}"), |b| {
            b.iter(|| {
                let hits: usize = points.iter().map(|&(x, y)| grid.query_point(x, y).count()).sum();
                black_box(hits);
            })
        });
        group.bench_function(format!("str_tree_{label}"), |b| {
            b.iter(|| {
                let hits: usize = points.iter().map(|&(x, y)| tree.query_point(x, y).count()).sum();
                black_box(hits);
            })
        });
    }
    group.finish();
}

fn bench_rect_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_rect");
    let rects = gen_grid_rects(128, 8.0);
    let tree = StrIndex::build(rects.clone());
    let grid = GridIndex::build(rects);
    group.bench_function("str_tree_many_windows", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in 0..256 {
                let x = (q % 64) as f64 * 8.0;
                let y = (q / 64) as f64 * 8.0;
                total += tree.query_rect(Aabb2D::from_xywh(x, y, 64.0, 64.0)).count();
            }
            black_box(total);
        })
    });
    group.bench_function("grid_many_windows", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in 0..256 {
                let x = (q % 64) as f64 * 8.0;
                let y = (q / 64) as f64 * 8.0;
                total += grid.query_rect(Aabb2D::from_xywh(x, y, 64.0, 64.0)).count();
            }
            black_box(total);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_point_queries, bench_rect_queries);
criterion_main!(benches);
