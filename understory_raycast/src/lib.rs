// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Raycast: ray-stepped collision queries over a 2D space index.
//!
//! Game logic often needs to ask "what does this line pass through?": hit-scan weapons,
//! line-of-sight checks, laser sensors. This crate answers that against a dynamic set of
//! axis-aligned collidable regions ([`Space`]s), each with a unique id ([`Cid`]) and tagged
//! with a category ([`Label`]). An entity made of several hitboxes gives each its own id.
//!
//! - [`SpaceIndex`] stores spaces over a pluggable [`Backend`] (linear scan or uniform grid),
//!   with batched edits and damage reporting at [`SpaceIndex::commit`].
//! - [`SharedSpaceIndex`] shares one index between threads: concurrent queries, exclusive edits.
//! - [`RayCaster`] walks a [`Ray`] in unit steps and queries the index with a small probe
//!   rectangle at every step, under one of three policies:
//!   [`cast_all`](RayCaster::cast_all),
//!   [`cast_first_excluding`](RayCaster::cast_first_excluding), and
//!   [`cast_first_by_label`](RayCaster::cast_first_by_label).
//!
//! The engine only relies on the [`SpatialIndex`] trait, so any structure that can list the
//! spaces intersecting a rectangle can stand in for [`SpaceIndex`].
//!
//! # Example
//!
//! ```rust
//! use understory_raycast::{Cid, Label, Ray, RayCaster, Space, SpaceIndex};
//!
//! const TERRAIN: Label = Label(1);
//! const ACTOR: Label = Label(2);
//!
//! let mut idx = SpaceIndex::new();
//! idx.insert(Space::from_xywh(0.0, 0.0, 1.0, 1.0, Cid(1), ACTOR)?)?;
//! idx.insert(Space::from_xywh(4.0, -2.0, 1.0, 4.0, Cid(2), ACTOR)?)?;
//! idx.insert(Space::from_xywh(9.0, -5.0, 2.0, 10.0, Cid(3), TERRAIN)?)?;
//! let _ = idx.commit();
//!
//! let caster = RayCaster::new(&idx);
//! let shot = Ray::new(0.5, 0.5, 0.0, 20.0);
//!
//! // Everything along the ray, nearest first; the shooter is hit at the muzzle.
//! let all: Vec<Cid> = caster.cast_all(shot).iter().map(|h| h.space.cid()).collect();
//! assert_eq!(all, [Cid(1), Cid(2), Cid(3)]);
//!
//! // A shot that ignores its shooter.
//! let hit = caster.cast_first_excluding(shot, &[Cid(1)]).expect("target in range");
//! assert_eq!(hit.space.cid(), Cid(2));
//!
//! // Line of sight against terrain only.
//! let wall = caster.cast_first_by_label(shot, TERRAIN).expect("wall in range");
//! assert_eq!(wall.space.cid(), Cid(3));
//! # Ok::<(), understory_raycast::CollisionError>(())
//! ```
//!
//! ## Precision
//!
//! Hits are reported at the sample position of the step that found them, not at the exact
//! boundary crossing. Samples are one unit apart, so geometry thinner than a unit can be
//! skipped by a diagonal ray. See [`RaycastConfig`] for the probe-size trade-off. Rays longer
//! than [`Ray::MAX_LENGTH`] are clamped to it.
//!
//! ## Ordering
//!
//! Results follow step order, so nearer colliders come first. When one step touches several
//! spaces, they are visited in the order the index returns them; [`SpaceIndex`] returns them in
//! ascending slot order, other [`SpatialIndex`] implementations may differ.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: query summaries at `debug`, per-step candidate
//! counts at `trace`. Install any logger in the host application to see them.

pub mod aabb;
pub mod backend;
pub mod backends;
pub mod config;
pub mod damage;
pub mod error;
pub mod index;
pub mod ray;
pub mod raycast;
pub mod shared;
pub mod space;

pub use aabb::Aabb2D;
pub use backend::Backend;
pub use backends::{FlatVec, Grid};
pub use config::{DEFAULT_PROBE_SIZE, ProbeAnchor, RaycastConfig};
pub use damage::Damage;
pub use error::{CollisionError, Result};
pub use index::{SpaceIndex, SpaceKey, SpatialIndex};
pub use ray::{Ray, RaySteps};
pub use raycast::{HitsAlong, RayCaster, cast_all, cast_first_by_label, cast_first_excluding};
pub use shared::SharedSpaceIndex;
pub use space::{Cid, CollisionPoint, Label, Space};
