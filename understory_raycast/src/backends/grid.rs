// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend. Buckets slots by the cells their boxes cover.

use core::fmt::Debug;

use rustc_hash::FxHashMap;

use crate::aabb::Aabb2D;
use crate::backend::Backend;
use crate::error::{CollisionError, Result};

/// Boxes covering more cells than this live in a side list that every query scans.
const MAX_CELLS_PER_BOX: u128 = 256;

/// Uniform grid backend.
///
/// Uses a fixed-size cell grid to accelerate queries. Coordinates are taken relative to
/// `origin`, so negative world coordinates are fine. A box is registered in every cell it
/// covers, up to [`MAX_CELLS_PER_BOX`] cells; larger boxes are kept in an overflow list that
/// queries scan linearly, as are queries that would visit more cells than there are slots.
/// Choose a cell size so most spaces fall within a handful of cells.
pub struct Grid {
    cell_w: f64,
    cell_h: f64,
    origin_x: f64,
    origin_y: f64,
    entries: Vec<Option<Aabb2D>>,
    cells: FxHashMap<(i64, i64), Vec<usize>>,
    oversized: Vec<usize>,
}

/// Inclusive cell range covered by a box.
#[derive(Copy, Clone, Debug)]
struct CellSpan {
    min: (i64, i64),
    max: (i64, i64),
}

impl CellSpan {
    /// Number of cells in the span, saturating.
    fn count(&self) -> u128 {
        let axis = |lo: i64, hi: i64| (i128::from(hi) - i128::from(lo) + 1).max(0).unsigned_abs();
        axis(self.min.0, self.max.0).saturating_mul(axis(self.min.1, self.max.1))
    }

    fn keys(self) -> impl Iterator<Item = (i64, i64)> {
        let (minx, miny) = self.min;
        let (maxx, maxy) = self.max;
        (miny..=maxy).flat_map(move |y| (minx..=maxx).map(move |x| (x, y)))
    }
}

impl Grid {
    /// Create a grid backend with the given cell size and origin offset.
    ///
    /// Fails with [`CollisionError::InvalidCellSize`] unless both extents are finite and
    /// strictly positive.
    pub fn new(cell_w: f64, cell_h: f64, origin_x: f64, origin_y: f64) -> Result<Self> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !(ok(cell_w) && ok(cell_h)) {
            return Err(CollisionError::InvalidCellSize {
                width: cell_w,
                height: cell_h,
            });
        }
        Ok(Self {
            cell_w,
            cell_h,
            origin_x,
            origin_y,
            entries: Vec::new(),
            cells: FxHashMap::default(),
            oversized: Vec::new(),
        })
    }

    #[inline]
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Cell coordinates saturate at the i64 range; the span count then exceeds the cap."
    )]
    fn floor_to_i64(v: f64) -> i64 {
        v.floor() as i64
    }

    fn key_for(&self, x: f64, y: f64) -> (i64, i64) {
        let cx = Self::floor_to_i64((x - self.origin_x) / self.cell_w);
        let cy = Self::floor_to_i64((y - self.origin_y) / self.cell_h);
        (cx, cy)
    }

    fn span(&self, a: &Aabb2D) -> CellSpan {
        CellSpan {
            min: self.key_for(a.min_x, a.min_y),
            max: self.key_for(a.max_x, a.max_y),
        }
    }

    fn link(&mut self, slot: usize, aabb: &Aabb2D) {
        let span = self.span(aabb);
        if span.count() > MAX_CELLS_PER_BOX {
            self.oversized.push(slot);
            return;
        }
        for key in span.keys() {
            self.cells.entry(key).or_default().push(slot);
        }
    }

    fn unlink(&mut self, slot: usize) {
        let Some(Some(old)) = self.entries.get(slot).copied() else {
            return;
        };
        let span = self.span(&old);
        if span.count() > MAX_CELLS_PER_BOX {
            if let Some(pos) = self.oversized.iter().position(|&s| s == slot) {
                self.oversized.swap_remove(pos);
            }
            return;
        }
        for key in span.keys() {
            if let Some(slots) = self.cells.get_mut(&key) {
                if let Some(pos) = slots.iter().position(|&s| s == slot) {
                    slots.swap_remove(pos);
                }
                if slots.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
    }

    fn collect_hits(&self, rect: &Aabb2D, out: &mut Vec<usize>, hit: impl Fn(&Aabb2D) -> bool) {
        let start = out.len();
        let span = self.span(rect);
        let scan_all = span.count() > MAX_CELLS_PER_BOX.max(self.entries.len() as u128);
        if scan_all {
            out.extend(
                self.entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.is_some_and(|a| hit(&a)))
                    .map(|(i, _)| i),
            );
            return;
        }
        for key in span.keys() {
            let Some(slots) = self.cells.get(&key) else {
                continue;
            };
            out.extend(slots.iter().copied().filter(|&s| self.is_hit(s, &hit)));
        }
        out.extend(self.oversized.iter().copied().filter(|&s| self.is_hit(s, &hit)));
        // A box spanning several probed cells shows up once per cell.
        let mut tail = out.split_off(start);
        tail.sort_unstable();
        tail.dedup();
        out.append(&mut tail);
    }

    fn is_hit(&self, slot: usize, hit: &impl Fn(&Aabb2D) -> bool) -> bool {
        matches!(self.entries.get(slot), Some(Some(a)) if hit(a))
    }
}

impl Backend for Grid {
    fn insert(&mut self, slot: usize, aabb: Aabb2D) {
        if self.entries.len() <= slot {
            self.entries.resize_with(slot + 1, || None);
        }
        self.unlink(slot);
        self.entries[slot] = Some(aabb);
        self.link(slot, &aabb);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D) {
        if slot >= self.entries.len() {
            return;
        }
        self.unlink(slot);
        self.entries[slot] = Some(aabb);
        self.link(slot, &aabb);
    }

    fn remove(&mut self, slot: usize) {
        self.unlink(slot);
        if let Some(e) = self.entries.get_mut(slot) {
            *e = None;
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.cells.clear();
        self.oversized.clear();
    }

    fn query_point(&self, x: f64, y: f64, out: &mut Vec<usize>) {
        let probe = Aabb2D::new(x, y, x, y);
        self.collect_hits(&probe, out, |a| a.contains_point(x, y));
    }

    fn query_rect(&self, rect: Aabb2D, out: &mut Vec<usize>) {
        self.collect_hits(&rect, out, |a| a.intersects(&rect));
    }
}

impl Debug for Grid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("Grid")
            .field("cell_w", &self.cell_w)
            .field("cell_h", &self.cell_h)
            .field("origin_x", &self.origin_x)
            .field("origin_y", &self.origin_y)
            .field("total_slots", &total)
            .field("alive", &alive)
            .field("cells", &self.cells.len())
            .field("oversized", &self.oversized.len())
            .finish_non_exhaustive()
    }
}
