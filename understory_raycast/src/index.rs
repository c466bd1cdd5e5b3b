// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The query contract raycasts need, and a space store that provides it.

use std::sync::Arc;

use kurbo::{Point, Rect, Vec2};
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::aabb::Aabb2D;
use crate::backend::Backend;
use crate::backends::{FlatVec, Grid};
use crate::damage::Damage;
use crate::error::{CollisionError, Result};
use crate::space::{Cid, Space, validate_rect};

/// The one capability the raycast engine needs from a spatial index.
///
/// Implementations return every currently stored space whose rectangle intersects the query
/// rectangle, edges included. Each [`Cid`] identifies one space, so an implementation never
/// reports two different spaces with the same id. No particular order is promised; raycast
/// tie-breaks between spaces hit in the same step follow whatever order the implementation
/// produces. Implementations shared between threads must give each call a coherent snapshot
/// and must tolerate concurrent mutation (see [`SharedSpaceIndex`](crate::SharedSpaceIndex)).
pub trait SpatialIndex {
    /// Append the spaces intersecting `rect` to `out`.
    fn intersect_into(&self, rect: Rect, out: &mut Vec<Space>);

    /// Collect the spaces intersecting `rect`.
    fn intersect(&self, rect: Rect) -> Vec<Space> {
        let mut out = Vec::new();
        self.intersect_into(rect, &mut out);
        out
    }
}

impl<T: SpatialIndex + ?Sized> SpatialIndex for &T {
    fn intersect_into(&self, rect: Rect, out: &mut Vec<Space>) {
        (**self).intersect_into(rect, out);
    }
}

impl<T: SpatialIndex + ?Sized> SpatialIndex for Box<T> {
    fn intersect_into(&self, rect: Rect, out: &mut Vec<Space>) {
        (**self).intersect_into(rect, out);
    }
}

impl<T: SpatialIndex + ?Sized> SpatialIndex for Arc<T> {
    fn intersect_into(&self, rect: Rect, out: &mut Vec<Space>) {
        (**self).intersect_into(rect, out);
    }
}

/// Generational handle for a space stored in a [`SpaceIndex`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpaceKey(u32, u32);

impl SpaceKey {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Space keys are 32-bit; an index never holds more than u32::MAX slots."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Added,
    Updated,
    Removed,
}

#[derive(Clone, Debug)]
struct Entry {
    /// Latest state, including edits not yet committed.
    space: Space,
    /// Rectangle currently registered with the backend.
    committed: Option<Rect>,
    mark: Option<Mark>,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Owner of the current set of spaces, backed by a pluggable spatial [`Backend`].
///
/// Edits are batched: [`insert`](Self::insert), [`update`](Self::update),
/// [`shift`](Self::shift) and [`remove`](Self::remove) take effect for queries at the next
/// [`commit`](Self::commit), which also reports what changed. Queries therefore always observe
/// the state as of the last commit.
///
/// Every live space has a distinct [`Cid`]; inserting a second space with an id in use fails
/// with [`CollisionError::DuplicateCid`]. Removing a space frees its id immediately.
///
/// Query results are ordered by ascending slot. Slots are handed out in insertion order and
/// recycled after removal, so for an index that never removes anything the order is insertion
/// order.
#[derive(Debug)]
pub struct SpaceIndex<B: Backend = FlatVec> {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
    live: usize,
    by_cid: FxHashMap<Cid, usize>,
    backend: B,
}

impl<B: Backend + Default> Default for SpaceIndex<B> {
    fn default() -> Self {
        Self::with_backend(B::default())
    }
}

impl SpaceIndex<FlatVec> {
    /// Create an empty index with the default linear-scan backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SpaceIndex<Grid> {
    /// Create a grid-backed index with the given cell size and the origin at `(0, 0)`.
    ///
    /// Fails with [`CollisionError::InvalidCellSize`] unless both extents are finite and
    /// strictly positive.
    pub fn with_uniform_grid(cell_w: f64, cell_h: f64) -> Result<Self> {
        Self::with_uniform_grid_with_origin(cell_w, cell_h, 0.0, 0.0)
    }

    /// Create a grid-backed index with an explicit origin offset.
    pub fn with_uniform_grid_with_origin(
        cell_w: f64,
        cell_h: f64,
        origin_x: f64,
        origin_y: f64,
    ) -> Result<Self> {
        Ok(Self::with_backend(Grid::new(
            cell_w, cell_h, origin_x, origin_y,
        )?))
    }
}

impl<B: Backend> SpaceIndex<B> {
    /// Create an empty index over the given backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            by_cid: FxHashMap::default(),
            backend,
        }
    }

    /// Reserve space for at least `n` more spaces.
    pub fn reserve(&mut self, n: usize) {
        self.slots.reserve(n);
    }

    /// Number of live spaces, counting uncommitted inserts.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the index holds no live spaces.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Insert a space. It becomes visible to queries at the next commit.
    ///
    /// Fails with [`CollisionError::DuplicateCid`] if a live space already uses `space.cid()`.
    pub fn insert(&mut self, space: Space) -> Result<SpaceKey> {
        if self.by_cid.contains_key(&space.cid()) {
            return Err(CollisionError::DuplicateCid(space.cid()));
        }
        let entry = Entry {
            space,
            committed: None,
            mark: Some(Mark::Added),
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some(entry);
            idx
        } else {
            self.slots.push(Slot {
                generation: 1,
                entry: Some(entry),
            });
            self.slots.len() - 1
        };
        self.live += 1;
        self.by_cid.insert(space.cid(), idx);
        trace!("insert {:?} into slot {idx}", space.cid());
        Ok(SpaceKey::new(idx, self.slots[idx].generation))
    }

    /// Move a space to a new rectangle.
    pub fn update(&mut self, key: SpaceKey, rect: Rect) -> Result<()> {
        validate_rect(rect)?;
        let e = self.entry_mut(key)?;
        e.space = e.space.with_rect(rect);
        if e.mark.is_none() {
            e.mark = Some(Mark::Updated);
        }
        Ok(())
    }

    /// Translate a space by `(dx, dy)`.
    pub fn shift(&mut self, key: SpaceKey, dx: f64, dy: f64) -> Result<()> {
        let rect = self.entry_mut(key)?.space.rect() + Vec2::new(dx, dy);
        self.update(key, rect)
    }

    /// Remove a space, returning its latest state. Queries keep seeing it until the next commit.
    pub fn remove(&mut self, key: SpaceKey) -> Result<Space> {
        let e = self.entry_mut(key)?;
        let space = e.space;
        if e.committed.is_none() {
            // Never reached the backend; drop it outright.
            self.slots[key.idx()].entry = None;
            self.free_list.push(key.idx());
        } else {
            e.mark = Some(Mark::Removed);
        }
        self.by_cid.remove(&space.cid());
        self.live -= 1;
        Ok(space)
    }

    /// Latest state of a space, including uncommitted edits.
    pub fn get(&self, key: SpaceKey) -> Option<Space> {
        let slot = self.slots.get(key.idx())?;
        if slot.generation != key.1 {
            return None;
        }
        slot.entry
            .as_ref()
            .filter(|e| e.mark != Some(Mark::Removed))
            .map(|e| e.space)
    }

    /// Whether `key` refers to a live space.
    pub fn contains(&self, key: SpaceKey) -> bool {
        self.get(key).is_some()
    }

    /// Key of the live space with id `cid`, if any.
    pub fn key_of(&self, cid: Cid) -> Option<SpaceKey> {
        let &idx = self.by_cid.get(&cid)?;
        Some(SpaceKey::new(idx, self.slots[idx].generation))
    }

    /// Clear the index without reporting damage. Outstanding keys become stale.
    pub fn clear(&mut self) {
        self.free_list.clear();
        for (i, slot) in self.slots.iter_mut().enumerate().rev() {
            slot.entry = None;
            self.free_list.push(i);
        }
        self.live = 0;
        self.by_cid.clear();
        self.backend.clear();
    }

    /// Apply pending edits to the backend and report what changed.
    pub fn commit(&mut self) -> Damage {
        let mut dmg = Damage::default();
        for i in 0..self.slots.len() {
            let Some(entry) = self.slots[i].entry.as_mut() else {
                continue;
            };
            let cid = entry.space.cid();
            match entry.mark.take() {
                Some(Mark::Added) => {
                    let rect = entry.space.rect();
                    self.backend.insert(i, Aabb2D::from(rect));
                    entry.committed = Some(rect);
                    dmg.added.push((cid, rect));
                }
                Some(Mark::Removed) => {
                    self.backend.remove(i);
                    if let Some(rect) = entry.committed {
                        dmg.removed.push((cid, rect));
                    }
                    self.slots[i].entry = None;
                    self.free_list.push(i);
                }
                Some(Mark::Updated) => {
                    let rect = entry.space.rect();
                    self.backend.update(i, Aabb2D::from(rect));
                    if let Some(prev) = entry.committed.replace(rect)
                        && prev != rect
                    {
                        dmg.moved.push((cid, prev, rect));
                    }
                }
                None => {}
            }
        }
        debug!(
            "space index commit: {} added, {} removed, {} moved",
            dmg.added.len(),
            dmg.removed.len(),
            dmg.moved.len()
        );
        dmg
    }

    /// Spaces whose rectangle intersects `rect`, as of the last commit.
    pub fn hits(&self, rect: Rect) -> Vec<Space> {
        self.intersect(rect)
    }

    /// Spaces containing `pt`, as of the last commit.
    pub fn hits_point(&self, pt: Point) -> Vec<Space> {
        let mut slots = Vec::new();
        self.backend.query_point(pt.x, pt.y, &mut slots);
        slots.into_iter().filter_map(|i| self.committed(i)).collect()
    }

    /// Other spaces overlapping the committed rectangle of the space at `key`.
    ///
    /// Returns an empty list if `key` is stale or the space has not been committed yet.
    pub fn hits_space(&self, key: SpaceKey) -> Vec<Space> {
        let Some(rect) = self
            .slots
            .get(key.idx())
            .filter(|s| s.generation == key.1)
            .and_then(|s| s.entry.as_ref())
            .and_then(|e| e.committed)
        else {
            return Vec::new();
        };
        let mut slots = Vec::new();
        self.backend.query_rect(Aabb2D::from(rect), &mut slots);
        slots
            .into_iter()
            .filter(|&i| i != key.idx())
            .filter_map(|i| self.committed(i))
            .collect()
    }

    /// Committed snapshot of the space in slot `i`.
    fn committed(&self, i: usize) -> Option<Space> {
        let e = self.slots.get(i)?.entry.as_ref()?;
        e.committed.map(|rect| e.space.with_rect(rect))
    }

    fn entry_mut(&mut self, key: SpaceKey) -> Result<&mut Entry> {
        self.slots
            .get_mut(key.idx())
            .filter(|s| s.generation == key.1)
            .and_then(|s| s.entry.as_mut())
            .filter(|e| e.mark != Some(Mark::Removed))
            .ok_or(CollisionError::StaleKey(key))
    }
}

impl<B: Backend> SpatialIndex for SpaceIndex<B> {
    fn intersect_into(&self, rect: Rect, out: &mut Vec<Space>) {
        let mut slots = Vec::new();
        self.backend.query_rect(Aabb2D::from(rect), &mut slots);
        out.extend(slots.into_iter().filter_map(|i| self.committed(i)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{Cid, Label};

    fn space(x: f64, y: f64, w: f64, h: f64, cid: u64) -> Space {
        Space::from_xywh(x, y, w, h, Cid(cid), Label(0)).unwrap()
    }

    #[test]
    fn insert_update_commit_and_query() {
        let mut idx = SpaceIndex::new();
        let k1 = idx.insert(space(0.0, 0.0, 10.0, 10.0, 1)).unwrap();
        let _ = idx.commit();
        idx.update(k1, Rect::new(5.0, 5.0, 15.0, 15.0)).unwrap();
        let dmg = idx.commit();
        assert!(!dmg.is_empty());

        let hits = idx.hits_point(Point::new(12.0, 12.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].cid(), Cid(1));
        assert_eq!(hits[0].rect(), Rect::new(5.0, 5.0, 15.0, 15.0));
    }

    #[test]
    fn edits_invisible_until_commit() {
        let mut idx = SpaceIndex::new();
        let k = idx.insert(space(0.0, 0.0, 1.0, 1.0, 1)).unwrap();
        assert!(idx.hits(Rect::new(0.0, 0.0, 1.0, 1.0)).is_empty());
        let _ = idx.commit();

        idx.shift(k, 10.0, 0.0).unwrap();
        let before = idx.hits(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].rect(), Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(idx.get(k).unwrap().rect(), Rect::new(10.0, 0.0, 11.0, 1.0));

        let _ = idx.commit();
        assert!(idx.hits(Rect::new(0.0, 0.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn added_then_removed_before_commit_is_ignored() {
        let mut idx = SpaceIndex::new();
        let k = idx.insert(space(0.0, 0.0, 10.0, 10.0, 1)).unwrap();
        idx.remove(k).unwrap();
        let dmg = idx.commit();
        assert!(dmg.is_empty());
        assert!(idx.hits_point(Point::new(1.0, 1.0)).is_empty());
        assert!(idx.is_empty());
    }

    #[test]
    fn removed_after_commit_reports_removed() {
        let mut idx = SpaceIndex::new();
        let k = idx.insert(space(0.0, 0.0, 10.0, 10.0, 4)).unwrap();
        let _ = idx.commit();
        idx.remove(k).unwrap();
        let dmg = idx.commit();
        assert_eq!(dmg.removed, [(Cid(4), Rect::new(0.0, 0.0, 10.0, 10.0))]);
        assert!(dmg.added.is_empty());
    }

    #[test]
    fn moved_reports_pair() {
        let mut idx = SpaceIndex::new();
        let k = idx.insert(space(0.0, 0.0, 10.0, 10.0, 2)).unwrap();
        let _ = idx.commit();
        idx.update(k, Rect::new(5.0, 5.0, 15.0, 15.0)).unwrap();
        let dmg = idx.commit();
        assert_eq!(
            dmg.moved,
            [(
                Cid(2),
                Rect::new(0.0, 0.0, 10.0, 10.0),
                Rect::new(5.0, 5.0, 15.0, 15.0)
            )]
        );
    }

    #[test]
    fn stale_keys_are_rejected() {
        let mut idx = SpaceIndex::new();
        let k = idx.insert(space(0.0, 0.0, 1.0, 1.0, 1)).unwrap();
        let _ = idx.commit();
        idx.remove(k).unwrap();
        let _ = idx.commit();

        let k2 = idx.insert(space(0.0, 0.0, 1.0, 1.0, 2)).unwrap();
        assert_ne!(k, k2);
        assert_eq!(idx.update(k, Rect::ZERO), Err(CollisionError::StaleKey(k)));
        assert_eq!(idx.remove(k), Err(CollisionError::StaleKey(k)));
        assert!(idx.get(k).is_none());
        assert_eq!(idx.get(k2).map(|s| s.cid()), Some(Cid(2)));
    }

    #[test]
    fn update_rejects_inverted_rect() {
        let mut idx = SpaceIndex::new();
        let k = idx.insert(space(0.0, 0.0, 1.0, 1.0, 1)).unwrap();
        let err = idx.update(k, Rect::new(2.0, 0.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, CollisionError::InvalidSpace { .. }));
    }

    #[test]
    fn hits_space_excludes_self() {
        let mut idx = SpaceIndex::with_uniform_grid(4.0, 4.0).unwrap();
        let a = idx.insert(space(0.0, 0.0, 2.0, 2.0, 1)).unwrap();
        idx.insert(space(1.0, 1.0, 2.0, 2.0, 2)).unwrap();
        idx.insert(space(9.0, 9.0, 1.0, 1.0, 3)).unwrap();
        let _ = idx.commit();
        let others: Vec<_> = idx.hits_space(a).iter().map(Space::cid).collect();
        assert_eq!(others, [Cid(2)]);
    }

    #[test]
    fn clear_invalidates_keys() {
        let mut idx = SpaceIndex::new();
        let k = idx.insert(space(0.0, 0.0, 1.0, 1.0, 1)).unwrap();
        let _ = idx.commit();
        idx.clear();
        assert!(idx.is_empty());
        assert!(idx.hits(Rect::new(0.0, 0.0, 1.0, 1.0)).is_empty());
        let k2 = idx.insert(space(0.0, 0.0, 1.0, 1.0, 2)).unwrap();
        assert_ne!(k, k2);
        assert!(!idx.contains(k));
    }

    #[test]
    fn duplicate_cid_is_rejected_while_live() {
        let mut idx = SpaceIndex::new();
        let body = idx.insert(space(0.0, 0.0, 2.0, 4.0, 1)).unwrap();
        assert_eq!(
            idx.insert(space(0.5, -1.5, 1.0, 1.5, 1)),
            Err(CollisionError::DuplicateCid(Cid(1)))
        );
        let head = idx.insert(space(0.5, -1.5, 1.0, 1.5, 2)).unwrap();
        assert_eq!(idx.key_of(Cid(1)), Some(body));
        assert_eq!(idx.key_of(Cid(2)), Some(head));
        assert_eq!(idx.len(), 2);

        let _ = idx.commit();
        idx.remove(body).unwrap();
        assert_eq!(idx.key_of(Cid(1)), None);
        // The id is free again right away; the old space stays queryable until commit.
        let body2 = idx.insert(space(10.0, 0.0, 2.0, 4.0, 1)).unwrap();
        assert_eq!(idx.hits_point(Point::new(1.0, 1.0)).len(), 1);
        let dmg = idx.commit();
        assert_eq!(dmg.added.len(), 1);
        assert_eq!(dmg.removed.len(), 1);
        assert!(idx.hits_point(Point::new(1.0, 1.0)).is_empty());
        assert_eq!(idx.key_of(Cid(1)), Some(body2));

        idx.clear();
        assert!(idx.insert(space(0.0, 0.0, 1.0, 1.0, 2)).is_ok());
    }

    #[test]
    fn grid_constructor_rejects_bad_cells() {
        for (w, h) in [(0.0, 0.0), (-1.0, 1.0), (1.0, f64::NAN), (f64::INFINITY, 1.0)] {
            let err = SpaceIndex::<Grid>::with_uniform_grid(w, h).unwrap_err();
            assert!(matches!(err, CollisionError::InvalidCellSize { .. }));
        }
    }
}
