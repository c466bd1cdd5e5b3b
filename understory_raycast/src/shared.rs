// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reader-writer handle for sharing one [`SpaceIndex`] between simulation and query threads.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use kurbo::Rect;
use log::warn;

use crate::backend::Backend;
use crate::backends::FlatVec;
use crate::damage::Damage;
use crate::error::Result;
use crate::index::{SpaceIndex, SpaceKey, SpatialIndex};
use crate::space::Space;

/// Cloneable, thread-safe handle to a [`SpaceIndex`].
///
/// Any number of queries may run at once; structural edits take the lock exclusively. Each
/// [`intersect`](SpatialIndex::intersect) holds the read lock for its whole scan and copies the
/// matching spaces out, so a query sees the index as of a single commit even while writers are
/// waiting.
///
/// A panic while the lock is held does not make the index unusable: every edit leaves the
/// index structurally valid, so a poisoned lock is logged and recovered.
#[derive(Debug)]
pub struct SharedSpaceIndex<B: Backend = FlatVec> {
    inner: Arc<RwLock<SpaceIndex<B>>>,
}

impl<B: Backend> Clone for SharedSpaceIndex<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend + Default> Default for SharedSpaceIndex<B> {
    fn default() -> Self {
        Self::new(SpaceIndex::default())
    }
}

impl<B: Backend> From<SpaceIndex<B>> for SharedSpaceIndex<B> {
    fn from(index: SpaceIndex<B>) -> Self {
        Self::new(index)
    }
}

impl<B: Backend> SharedSpaceIndex<B> {
    /// Wrap an index for shared use.
    pub fn new(index: SpaceIndex<B>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    /// Acquire shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, SpaceIndex<B>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("space index lock poisoned; recovering for read");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Acquire exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, SpaceIndex<B>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("space index lock poisoned; recovering for write");
            PoisonError::into_inner(poisoned)
        })
    }

    /// Run several edits under one write lock.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut SpaceIndex<B>) -> R) -> R {
        f(&mut self.write())
    }

    /// See [`SpaceIndex::insert`].
    pub fn insert(&self, space: Space) -> Result<SpaceKey> {
        self.write().insert(space)
    }

    /// See [`SpaceIndex::update`].
    pub fn update(&self, key: SpaceKey, rect: Rect) -> Result<()> {
        self.write().update(key, rect)
    }

    /// See [`SpaceIndex::shift`].
    pub fn shift(&self, key: SpaceKey, dx: f64, dy: f64) -> Result<()> {
        self.write().shift(key, dx, dy)
    }

    /// See [`SpaceIndex::remove`].
    pub fn remove(&self, key: SpaceKey) -> Result<Space> {
        self.write().remove(key)
    }

    /// See [`SpaceIndex::commit`].
    pub fn commit(&self) -> Damage {
        self.write().commit()
    }

    /// See [`SpaceIndex::get`].
    pub fn get(&self, key: SpaceKey) -> Option<Space> {
        self.read().get(key)
    }

    /// Number of live spaces.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the index holds no live spaces.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<B: Backend> SpatialIndex for SharedSpaceIndex<B> {
    fn intersect_into(&self, rect: Rect, out: &mut Vec<Space>) {
        self.read().intersect_into(rect, out);
    }
}
