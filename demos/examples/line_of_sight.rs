// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line of sight on a tile map.
//!
//! A guard looks towards several targets; only terrain blocks the view. A target is visible
//! when no terrain lies between the guard and the target.
//!
//! Run:
//! - `cargo run -p understory_raycast_demos --example line_of_sight`

use kurbo::Point;
use understory_raycast::{Cid, Label, Ray, RayCaster, Space, SpaceIndex};

const TERRAIN: Label = Label(1);

const MAP: [&str; 6] = [
    "################",
    "#..............#",
    "#....###.......#",
    "#....#.........#",
    "#..............#",
    "################",
];
const TILE: f64 = 16.0;

fn main() -> understory_raycast::Result<()> {
    env_logger::init();

    let mut idx = SpaceIndex::with_uniform_grid(TILE * 2.0, TILE * 2.0)?;
    let mut next = 0;
    for (row, line) in MAP.iter().enumerate() {
        for (col, ch) in line.chars().enumerate() {
            if ch == '#' {
                let (x, y) = (col as f64 * TILE, row as f64 * TILE);
                idx.insert(Space::from_xywh(x, y, TILE, TILE, Cid(next), TERRAIN)?)?;
                next += 1;
            }
        }
    }
    let _ = idx.commit();
    log::info!("built {} terrain tiles", idx.len());

    let caster = RayCaster::new(&idx);
    let guard = Point::new(40.0, 56.0);
    let targets = [
        Point::new(200.0, 56.0),
        Point::new(120.0, 24.0),
        Point::new(24.0, 24.0),
        Point::new(72.0, 72.0),
    ];
    for target in targets {
        let delta = target - guard;
        let ray = Ray::new(guard.x, guard.y, delta.atan2().to_degrees(), delta.hypot());
        let visible = caster.cast_first_by_label(ray, TERRAIN).is_none();
        println!(
            "target at ({}, {}): {}",
            target.x,
            target.y,
            if visible { "visible" } else { "blocked" }
        );
    }

    Ok(())
}
