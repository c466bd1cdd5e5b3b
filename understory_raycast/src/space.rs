// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collidable regions and raycast results.

use kurbo::{Point, Rect};

use crate::aabb::Aabb2D;
use crate::error::{CollisionError, Result};

/// Opaque, stable identifier of a [`Space`].
///
/// A `Cid` names exactly one live space: [`SpaceIndex`](crate::SpaceIndex) rejects a second
/// space with an id that is already in use. Raycasts rely on this to report each space once.
/// An entity with several hitboxes gives each hitbox its own id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cid(pub u64);

/// Integer grouping tag used for category filtering (terrain, players, pickups, ...).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label(pub i32);

/// An axis-aligned collidable region with an owner and a label.
///
/// Values handed out by queries are snapshots: moving the space in the index afterwards does
/// not change a `Space` a caller already holds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Space {
    rect: Rect,
    cid: Cid,
    label: Label,
}

impl Space {
    /// Create a space, rejecting inverted or non-finite rectangles.
    ///
    /// Zero-width or zero-height rectangles are accepted; they still collide along their edge.
    pub fn new(rect: Rect, cid: Cid, label: Label) -> Result<Self> {
        validate_rect(rect)?;
        Ok(Self { rect, cid, label })
    }

    /// Create a space from its minimum corner and size.
    pub fn from_xywh(x: f64, y: f64, w: f64, h: f64, cid: Cid, label: Label) -> Result<Self> {
        Self::new(Rect::new(x, y, x + w, y + h), cid, label)
    }

    /// Current rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Owning entity.
    pub fn cid(&self) -> Cid {
        self.cid
    }

    /// Category label.
    pub fn label(&self) -> Label {
        self.label
    }

    /// Whether this space's rectangle overlaps `other`'s, edges included.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.aabb().intersects(&other.aabb())
    }

    pub(crate) fn aabb(&self) -> Aabb2D {
        Aabb2D::new(self.rect.x0, self.rect.y0, self.rect.x1, self.rect.y1)
    }

    pub(crate) fn with_rect(self, rect: Rect) -> Self {
        Self { rect, ..self }
    }
}

pub(crate) fn validate_rect(rect: Rect) -> Result<()> {
    let finite = rect.x0.is_finite()
        && rect.y0.is_finite()
        && rect.x1.is_finite()
        && rect.y1.is_finite();
    if finite && rect.x0 <= rect.x1 && rect.y0 <= rect.y1 {
        Ok(())
    } else {
        Err(CollisionError::InvalidSpace { rect })
    }
}

/// A space hit by a ray, and the probe position at which the hit was detected.
///
/// `point` is the sample position of the ray step, not an exact boundary intersection; its
/// precision is bounded by the unit step length and the probe size.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CollisionPoint {
    /// Snapshot of the space that was hit.
    pub space: Space,
    /// Ray sample position of the step that hit it.
    pub point: Point,
}

impl CollisionPoint {
    /// Sample x coordinate.
    pub fn x(&self) -> f64 {
        self.point.x
    }

    /// Sample y coordinate.
    pub fn y(&self) -> f64 {
        self.point.y
    }
}
