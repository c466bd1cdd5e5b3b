// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batched damage returned by [`SpaceIndex::commit`](crate::SpaceIndex::commit).

use kurbo::Rect;

use crate::space::Cid;

/// Regions whose collision state changed since the previous commit.
///
/// Hosts use this to invalidate cached line-of-sight results or to redraw debug overlays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Damage {
    /// Spaces that became queryable.
    pub added: Vec<(Cid, Rect)>,
    /// Spaces that stopped being queryable.
    pub removed: Vec<(Cid, Rect)>,
    /// Spaces that moved: (owner, old, new).
    pub moved: Vec<(Cid, Rect, Rect)>,
}

impl Damage {
    /// True if no damage entries recorded.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    /// Union of all affected rectangles. Returns `None` if empty.
    pub fn union(&self) -> Option<Rect> {
        let mut it = self
            .added
            .iter()
            .chain(&self.removed)
            .map(|(_, r)| *r)
            .chain(self.moved.iter().flat_map(|(_, a, b)| [*a, *b]));
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }
}
