// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Rect;
use understory_raycast::{Backend, Cid, Label, Space, SpaceIndex, SpaceKey};

fn gen_grid_spaces(n: usize, cell: f64) -> Vec<Space> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            let cid = Cid((y * n + x) as u64);
            out.push(Space::from_xywh(x0, y0, cell, cell, cid, Label(0)).unwrap());
        }
    }
    out
}

fn fill<B: Backend>(mut idx: SpaceIndex<B>, spaces: &[Space]) -> (SpaceIndex<B>, Vec<SpaceKey>) {
    let keys = spaces.iter().map(|&s| idx.insert(s).unwrap()).collect();
    let _ = idx.commit();
    (idx, keys)
}

fn bench_insert_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_commit");
    for &n in &[32usize, 64, 128] {
        let spaces = gen_grid_spaces(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("flatvec_n{}", n), |b| {
            b.iter_batched(
                SpaceIndex::new,
                |idx| black_box(fill(idx, &spaces).0.len()),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                || SpaceIndex::with_uniform_grid(32.0, 32.0).unwrap(),
                |idx| black_box(fill(idx, &spaces).0.len()),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_move_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_commit");
    let spaces = gen_grid_spaces(64, 10.0);
    group.throughput(Throughput::Elements(spaces.len() as u64));
    group.bench_function("grid_n64", |b| {
        b.iter_batched(
            || fill(SpaceIndex::with_uniform_grid(32.0, 32.0).unwrap(), &spaces),
            |(mut idx, keys)| {
                for k in keys {
                    idx.shift(k, 3.0, 1.0).unwrap();
                }
                black_box(idx.commit().moved.len());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_probe_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("probe_query");
    let spaces = gen_grid_spaces(128, 10.0);
    let (flat, _) = fill(SpaceIndex::new(), &spaces);
    let (grid, _) = fill(SpaceIndex::with_uniform_grid(32.0, 32.0).unwrap(), &spaces);
    let probe = Rect::new(640.0, 640.0, 640.1, 640.1);
    group.bench_function("flatvec", |b| b.iter(|| black_box(flat.hits(probe).len())));
    group.bench_function("grid", |b| b.iter(|| black_box(grid.hits(probe).len())));
    group.finish();
}

criterion_group!(benches, bench_insert_commit, bench_move_commit, bench_probe_query);
criterion_main!(benches);
