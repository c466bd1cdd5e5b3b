// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for index mutation and raycast configuration.
//!
//! Queries never fail: an empty result is an ordinary outcome. Errors only arise when
//! building a [`Space`](crate::Space), [`RaycastConfig`](crate::RaycastConfig) or grid backend
//! from bad numbers, when a space id is already taken, or when a caller mutates a space through
//! a key that is no longer live.

use kurbo::Rect;

use crate::index::SpaceKey;
use crate::space::Cid;

/// Result alias used throughout the crate.
pub type Result<T, E = CollisionError> = core::result::Result<T, E>;

/// Errors that can occur while building spaces, configuring probes, or editing the index.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum CollisionError {
    /// Probe extents must be finite and strictly positive.
    #[error("probe size must be finite and positive, got {width}x{height}")]
    InvalidProbeSize {
        /// Requested probe width.
        width: f64,
        /// Requested probe height.
        height: f64,
    },

    /// A space rectangle had a negative extent or a non-finite coordinate.
    #[error("invalid space rectangle {rect:?}")]
    InvalidSpace {
        /// The rejected rectangle.
        rect: Rect,
    },

    /// Grid cell extents must be finite and strictly positive.
    #[error("grid cell size must be finite and positive, got {width}x{height}")]
    InvalidCellSize {
        /// Requested cell width.
        width: f64,
        /// Requested cell height.
        height: f64,
    },

    /// Another live space in the index already carries this id.
    #[error("a live space with {0:?} is already indexed")]
    DuplicateCid(Cid),

    /// The key does not refer to a live space (removed, or from another index).
    #[error("space key {0:?} is stale")]
    StaleKey(SpaceKey),
}
