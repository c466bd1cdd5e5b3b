// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_raycast::{
    Backend, Cid, Label, Ray, RayCaster, SharedSpaceIndex, Space, SpaceIndex, SpatialIndex,
};

const TERRAIN: Label = Label(1);
const ACTOR: Label = Label(2);

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

/// A tile map: a solid `n × n` grid of terrain tiles with every other tile missing,
/// plus `actors` unit boxes scattered over it.
fn gen_level<B: Backend>(mut idx: SpaceIndex<B>, n: usize, actors: usize) -> SpaceIndex<B> {
    let mut cid = 0;
    for y in 0..n {
        for x in 0..n {
            if (x + y) % 2 == 0 {
                continue;
            }
            let (x0, y0) = (x as f64 * 16.0, y as f64 * 16.0);
            let s = Space::from_xywh(x0, y0, 16.0, 16.0, Cid(cid), TERRAIN).unwrap();
            idx.insert(s).unwrap();
            cid += 1;
        }
    }
    let side = n as f64 * 16.0;
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..actors {
        let s = Space::from_xywh(
            rng.next_f64() * side,
            rng.next_f64() * side,
            1.0,
            1.0,
            Cid(cid),
            ACTOR,
        )
        .unwrap();
        idx.insert(s).unwrap();
        cid += 1;
    }
    let _ = idx.commit();
    idx
}

fn gen_rays(count: usize, side: f64, length: f64) -> Vec<Ray> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|_| {
            Ray::new(
                rng.next_f64() * side,
                rng.next_f64() * side,
                rng.next_f64() * 360.0,
                length,
            )
        })
        .collect()
}

fn run_policies<I: SpatialIndex + ?Sized>(c: &mut Criterion, group: &str, idx: &I, rays: &[Ray]) {
    let caster = RayCaster::new(idx);
    let mut group = c.benchmark_group(group);
    group.throughput(Throughput::Elements(rays.len() as u64));
    group.bench_function("cast_all", |b| {
        b.iter(|| {
            let hits: usize = rays.iter().map(|&r| caster.cast_all(r).len()).sum();
            black_box(hits);
        });
    });
    group.bench_function("cast_first_excluding", |b| {
        b.iter(|| {
            for &r in rays {
                black_box(caster.cast_first_excluding(r, &[Cid(0), Cid(1)]));
            }
        });
    });
    group.bench_function("cast_first_by_label", |b| {
        b.iter(|| {
            for &r in rays {
                black_box(caster.cast_first_by_label(r, ACTOR));
            }
        });
    });
    group.finish();
}

fn bench_flatvec(c: &mut Criterion) {
    let idx = gen_level(SpaceIndex::new(), 32, 256);
    let rays = gen_rays(256, 32.0 * 16.0, 200.0);
    run_policies(c, "raycast_flatvec", &idx, &rays);
}

fn bench_grid(c: &mut Criterion) {
    for &n in &[32usize, 128] {
        let idx = gen_level(SpaceIndex::with_uniform_grid(32.0, 32.0).unwrap(), n, n * 8);
        let rays = gen_rays(256, n as f64 * 16.0, 200.0);
        run_policies(c, &format!("raycast_grid_n{}", n), &idx, &rays);
    }
}

fn bench_shared(c: &mut Criterion) {
    let level = gen_level(SpaceIndex::with_uniform_grid(32.0, 32.0).unwrap(), 64, 512);
    let shared = SharedSpaceIndex::new(level);
    let rays = gen_rays(256, 64.0 * 16.0, 200.0);
    run_policies(c, "raycast_shared_grid", &shared, &rays);
}

criterion_group!(benches, bench_flatvec, bench_grid, bench_shared);
criterion_main!(benches);
