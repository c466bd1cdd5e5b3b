// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory Raycast: insert spaces, commit, cast with each policy.

use understory_raycast::{
    Cid, Label, Space, SpaceIndex, cast_all, cast_first_by_label, cast_first_excluding,
};

fn main() -> understory_raycast::Result<()> {
    let mut idx = SpaceIndex::new();
    let crate_key = idx.insert(Space::from_xywh(5.0, -0.5, 1.0, 1.0, Cid(1), Label(2))?)?;
    idx.insert(Space::from_xywh(12.0, -4.0, 1.0, 8.0, Cid(2), Label(1))?)?;
    let _ = idx.commit();

    let hits = cast_all(&idx, 0.0, 0.0, 0.0, 20.0);
    for h in &hits {
        println!("{:?} at ({}, {})", h.space.cid(), h.x(), h.y());
    }

    let first = cast_first_excluding(&idx, 0.0, 0.0, 0.0, 20.0, &[Cid(1)]);
    println!("first hit ignoring Cid(1): {:?}", first.map(|h| h.space.cid()));

    // Move the crate out of the way; queries see it after the next commit.
    idx.shift(crate_key, 0.0, 10.0)?;
    let dmg = idx.commit();
    println!("damage: moved={:?}", dmg.moved);

    let wall = cast_first_by_label(&idx, 0.0, 0.0, 0.0, 20.0, Label(1));
    println!("wall: {:?}", wall.map(|h| h.point));
    Ok(())
}
