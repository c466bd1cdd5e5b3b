// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit-scan weapon.
//!
//! A player fires through a room with two enemies behind each other. The shot ignores the
//! player's own hitboxes and stops at the first enemy; a piercing shot collects everything
//! else, hitbox by hitbox.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_raycast_demos --example hitscan`

use understory_raycast::{Cid, Label, Ray, RayCaster, Space, SpaceIndex};

const ACTOR: Label = Label(2);
const SHIELD: Label = Label(3);

fn main() -> understory_raycast::Result<()> {
    env_logger::init();

    // Every hitbox has its own id; the player owns a body and a head.
    let player = [Cid(1), Cid(2)];
    let grunt = Cid(3);
    let brute_body = Cid(4);
    let brute_shield = Cid(5);

    let mut idx = SpaceIndex::new();
    idx.insert(Space::from_xywh(0.0, 0.0, 2.0, 4.0, player[0], ACTOR)?)?;
    idx.insert(Space::from_xywh(0.25, -1.5, 1.5, 1.5, player[1], ACTOR)?)?;
    idx.insert(Space::from_xywh(12.0, -1.0, 2.0, 4.0, grunt, ACTOR)?)?;
    idx.insert(Space::from_xywh(20.0, -2.0, 3.0, 6.0, brute_body, ACTOR)?)?;
    idx.insert(Space::from_xywh(18.5, 0.0, 1.0, 2.0, brute_shield, SHIELD)?)?;
    let damage = idx.commit();
    println!("spawned {} hitboxes", damage.added.len());

    let caster = RayCaster::new(&idx);
    let shot = Ray::new(1.0, 1.0, 0.0, 40.0);

    match caster.cast_first_excluding(shot, &player) {
        Some(hit) => println!(
            "shot hits {:?} at ({:.1}, {:.1})",
            hit.space.cid(),
            hit.x(),
            hit.y()
        ),
        None => println!("shot misses"),
    }

    let pierced: Vec<Cid> = caster
        .hits_along(shot)
        .map(|h| h.space.cid())
        .filter(|c| !player.contains(c))
        .collect();
    println!("piercing shot passes through {pierced:?}");
    assert_eq!(pierced, [grunt, brute_shield, brute_body]);

    Ok(())
}
