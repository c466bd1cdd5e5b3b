// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray queries against a [`SpatialIndex`].
//!
//! A raycast walks its [`Ray`] in unit steps and, at each step, asks the index for the spaces
//! intersecting a small probe rectangle (see [`RaycastConfig`]). Three selection policies sit on
//! top of that walk:
//!
//! - [`RayCaster::cast_all`]: every distinct collider along the ray, nearest first.
//! - [`RayCaster::cast_first_excluding`]: the first collider not owned by an excluded entity.
//! - [`RayCaster::cast_first_by_label`]: the first collider carrying a given label.
//!
//! Spaces hit in the same step are visited in the order the index returns them, which the
//! [`SpatialIndex`] contract leaves unspecified; [`SpaceIndex`](crate::SpaceIndex) uses
//! ascending slot order.

use core::fmt;

use kurbo::Point;
use log::{debug, trace};
use rustc_hash::FxHashSet;

use crate::config::RaycastConfig;
use crate::error::Result;
use crate::index::SpatialIndex;
use crate::ray::{Ray, RaySteps};
use crate::space::{Cid, CollisionPoint, Label, Space};

/// Runs raycasts against a borrowed index.
///
/// The caster owns no state besides its configuration, so it is cheap to build per query or
/// to keep around. Thread safety is the index's business: with a
/// [`SharedSpaceIndex`](crate::SharedSpaceIndex), any number of threads may cast while the
/// simulation edits the index.
pub struct RayCaster<'a, I: SpatialIndex + ?Sized> {
    index: &'a I,
    config: RaycastConfig,
}

impl<I: SpatialIndex + ?Sized> Clone for RayCaster<'_, I> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I: SpatialIndex + ?Sized> Copy for RayCaster<'_, I> {}

impl<I: SpatialIndex + ?Sized> fmt::Debug for RayCaster<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RayCaster")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<'a, I: SpatialIndex + ?Sized> RayCaster<'a, I> {
    /// Create a caster with the default probe configuration.
    pub fn new(index: &'a I) -> Self {
        Self {
            index,
            config: RaycastConfig::default(),
        }
    }

    /// Create a caster with a custom probe configuration, validating it.
    pub fn with_config(index: &'a I, config: RaycastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { index, config })
    }

    /// The probe configuration in use.
    pub fn config(&self) -> RaycastConfig {
        self.config
    }

    /// Every distinct collider along the ray, in order of first encounter.
    ///
    /// Each space appears once, keyed by its [`Cid`], paired with the first sample that touched
    /// it. Overlapping spaces are all reported, even when they are hit in the same step.
    /// Always walks the full ray.
    pub fn cast_all(&self, ray: Ray) -> Vec<CollisionPoint> {
        let hits: Vec<_> = self.hits_along(ray).collect();
        debug!(
            "cast_all from {:?} at {}° over {}: {} hit(s)",
            ray.origin(),
            ray.degrees(),
            ray.length(),
            hits.len()
        );
        hits
    }

    /// Lazy form of [`cast_all`](Self::cast_all); stops querying the index once dropped.
    pub fn hits_along(&self, ray: Ray) -> HitsAlong<'a, I> {
        HitsAlong {
            index: self.index,
            config: self.config,
            steps: ray.steps(),
            seen: FxHashSet::default(),
            buf: Vec::new(),
            cursor: 0,
            point: ray.origin(),
        }
    }

    /// First space along the ray accepted by `accept`.
    ///
    /// Returns `None` if the ray ends without an accepted hit.
    pub fn cast_first_where(
        &self,
        ray: Ray,
        mut accept: impl FnMut(&Space) -> bool,
    ) -> Option<CollisionPoint> {
        let mut buf = Vec::new();
        for point in ray.steps() {
            buf.clear();
            self.index
                .intersect_into(self.config.probe_at(point), &mut buf);
            if let Some(space) = buf.iter().find(|&s| accept(s)) {
                return Some(CollisionPoint {
                    space: *space,
                    point,
                });
            }
        }
        None
    }

    /// First space along the ray whose owner is not in `excluded`.
    ///
    /// Typical use is a hit-scan shot that must not hit its shooter.
    pub fn cast_first_excluding(&self, ray: Ray, excluded: &[Cid]) -> Option<CollisionPoint> {
        let hit = self.cast_first_where(ray, |s| !excluded.contains(&s.cid()));
        debug!(
            "cast_first_excluding from {:?} at {}° ({} excluded): {:?}",
            ray.origin(),
            ray.degrees(),
            excluded.len(),
            hit.map(|h| h.space.cid())
        );
        hit
    }

    /// First space along the ray carrying `label`.
    ///
    /// Typical use is a line-of-sight check against one category, such as terrain.
    pub fn cast_first_by_label(&self, ray: Ray, label: Label) -> Option<CollisionPoint> {
        let hit = self.cast_first_where(ray, |s| s.label() == label);
        debug!(
            "cast_first_by_label from {:?} at {}° for {:?}: {:?}",
            ray.origin(),
            ray.degrees(),
            label,
            hit.map(|h| h.space.cid())
        );
        hit
    }
}

/// Iterator returned by [`RayCaster::hits_along`].
pub struct HitsAlong<'a, I: SpatialIndex + ?Sized> {
    index: &'a I,
    config: RaycastConfig,
    steps: RaySteps,
    seen: FxHashSet<Cid>,
    buf: Vec<Space>,
    cursor: usize,
    point: Point,
}

impl<I: SpatialIndex + ?Sized> fmt::Debug for HitsAlong<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HitsAlong")
            .field("config", &self.config)
            .field("steps", &self.steps)
            .field("seen", &self.seen.len())
            .finish_non_exhaustive()
    }
}

impl<I: SpatialIndex + ?Sized> Iterator for HitsAlong<'_, I> {
    type Item = CollisionPoint;

    fn next(&mut self) -> Option<CollisionPoint> {
        loop {
            while let Some(space) = self.buf.get(self.cursor).copied() {
                self.cursor += 1;
                if self.seen.insert(space.cid()) {
                    return Some(CollisionPoint {
                        space,
                        point: self.point,
                    });
                }
            }
            let step = self.steps.step_index();
            self.point = self.steps.next()?;
            self.buf.clear();
            self.cursor = 0;
            self.index
                .intersect_into(self.config.probe_at(self.point), &mut self.buf);
            trace!(
                "step {step} at {:?}: {} candidate(s)",
                self.point,
                self.buf.len()
            );
        }
    }
}

impl<I: SpatialIndex + ?Sized> core::iter::FusedIterator for HitsAlong<'_, I> {}

/// [`RayCaster::cast_all`] with the default probe.
pub fn cast_all<I: SpatialIndex + ?Sized>(
    index: &I,
    x: f64,
    y: f64,
    degrees: f64,
    length: f64,
) -> Vec<CollisionPoint> {
    RayCaster::new(index).cast_all(Ray::new(x, y, degrees, length))
}

/// [`RayCaster::cast_first_excluding`] with the default probe.
pub fn cast_first_excluding<I: SpatialIndex + ?Sized>(
    index: &I,
    x: f64,
    y: f64,
    degrees: f64,
    length: f64,
    excluded: &[Cid],
) -> Option<CollisionPoint> {
    RayCaster::new(index).cast_first_excluding(Ray::new(x, y, degrees, length), excluded)
}

/// [`RayCaster::cast_first_by_label`] with the default probe.
pub fn cast_first_by_label<I: SpatialIndex + ?Sized>(
    index: &I,
    x: f64,
    y: f64,
    degrees: f64,
    length: f64,
    label: Label,
) -> Option<CollisionPoint> {
    RayCaster::new(index).cast_first_by_label(Ray::new(x, y, degrees, length), label)
}
