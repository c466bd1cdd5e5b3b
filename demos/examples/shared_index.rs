// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One simulation thread, several sensor threads.
//!
//! The simulation moves a patrol back and forth and commits once per tick. Sensor threads
//! cast rays through the same index at the same time and report what they see.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_raycast_demos --example shared_index`

use std::thread;

use understory_raycast::{Cid, Label, Ray, RayCaster, SharedSpaceIndex, Space, SpaceIndex};

const TERRAIN: Label = Label(1);
const ACTOR: Label = Label(2);

fn main() -> understory_raycast::Result<()> {
    env_logger::init();

    let shared = SharedSpaceIndex::new(SpaceIndex::with_uniform_grid(8.0, 8.0)?);
    shared.insert(Space::from_xywh(60.0, -20.0, 4.0, 40.0, Cid(100), TERRAIN)?)?;
    let patrol = shared.insert(Space::from_xywh(10.0, -2.0, 2.0, 4.0, Cid(1), ACTOR)?)?;
    let _ = shared.commit();

    thread::scope(|s| {
        let sim = shared.clone();
        let ticker = s.spawn(move || -> understory_raycast::Result<()> {
            for tick in 0..40 {
                let dx = if (tick / 10) % 2 == 0 { 1.0 } else { -1.0 };
                sim.shift(patrol, dx, 0.0)?;
                let damage = sim.commit();
                log::debug!("tick {tick}: moved {}", damage.moved.len());
            }
            Ok(())
        });

        for sensor in 0..3 {
            let view = shared.clone();
            s.spawn(move || {
                let caster = RayCaster::new(&view);
                let ray = Ray::new(0.0, f64::from(sensor) - 1.0, 0.0, 80.0);
                for _ in 0..20 {
                    let seen: Vec<Cid> =
                        caster.cast_all(ray).iter().map(|h| h.space.cid()).collect();
                    log::info!("sensor {sensor} sees {seen:?}");
                }
            });
        }

        ticker.join().unwrap_or_else(|e| std::panic::resume_unwind(e))
    })?;

    println!("final patrol position: {:?}", shared.get(patrol).map(|s| s.rect()));
    Ok(())
}
