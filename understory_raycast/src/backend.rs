// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for the spatial structure behind [`SpaceIndex`](crate::SpaceIndex).

use core::fmt::Debug;

use crate::aabb::Aabb2D;

/// Spatial backend abstraction used by [`SpaceIndex`](crate::SpaceIndex).
///
/// Backends only track slot numbers and boxes; the index owns the [`Space`](crate::Space)
/// records. Query results must be reported in ascending slot order so that
/// raycast tie-breaks stay stable across backends.
pub trait Backend: Debug {
    /// Insert a new slot into the spatial structure.
    fn insert(&mut self, slot: usize, aabb: Aabb2D);

    /// Update an existing slot's AABB.
    fn update(&mut self, slot: usize, aabb: Aabb2D);

    /// Remove a slot from the spatial structure.
    fn remove(&mut self, slot: usize);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Append slots whose AABB contains the point to `out`.
    fn query_point(&self, x: f64, y: f64, out: &mut Vec<usize>);

    /// Append slots whose AABB intersects the rectangle to `out`.
    fn query_rect(&self, rect: Aabb2D, out: &mut Vec<usize>);
}
