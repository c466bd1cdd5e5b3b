// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets.

use core::fmt::Debug;

use crate::aabb::Aabb2D;
use crate::backend::Backend;

/// Flat vector backend with linear scans.
#[derive(Default)]
pub struct FlatVec {
    entries: Vec<Option<Aabb2D>>,
}

impl Debug for FlatVec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl Backend for FlatVec {
    fn insert(&mut self, slot: usize, aabb: Aabb2D) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.entries[slot] = Some(aabb);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = Some(aabb);
        }
    }

    fn remove(&mut self, slot: usize) {
        if let Some(e) = self.entries.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn query_point(&self, x: f64, y: f64, out: &mut Vec<usize>) {
        out.extend(
            self.entries
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_some_and(|a| a.contains_point(x, y)))
                .map(|(i, _)| i),
        );
    }

    fn query_rect(&self, rect: Aabb2D, out: &mut Vec<usize>) {
        out.extend(
            self.entries
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.is_some_and(|a| a.intersects(&rect)))
                .map(|(i, _)| i),
        );
    }
}
