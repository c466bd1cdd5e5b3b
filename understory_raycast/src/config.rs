// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Probe configuration for raycasts.
//!
//! Each ray step asks the index for spaces intersecting a small probe rectangle placed at the
//! step position. The probe size trades precision for robustness:
//!
//! - Smaller probes report hit positions closer to the real boundary crossing, but a ray that
//!   passes between two unit steps can skip geometry thinner than one unit, whatever the probe.
//! - Larger probes catch thin or diagonal geometry more reliably, but may report spaces the ray
//!   only grazes and make each index query cover more cells.
//!
//! The default, `0.1 × 0.1` anchored at its minimum corner, suits worlds measured in pixels or
//! tiles where spaces are at least one unit wide.

use kurbo::{Point, Rect};

use crate::error::{CollisionError, Result};

/// Default probe width and height.
pub const DEFAULT_PROBE_SIZE: f64 = 0.1;

/// Where the probe rectangle sits relative to the sample position.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbeAnchor {
    /// The sample position is the probe's minimum corner.
    #[default]
    MinCorner,
    /// The sample position is the probe's center.
    Center,
}

/// Tunable parameters of a [`RayCaster`](crate::RayCaster).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaycastConfig {
    /// Probe rectangle width.
    pub probe_width: f64,
    /// Probe rectangle height.
    pub probe_height: f64,
    /// Probe placement relative to each sample.
    #[cfg_attr(feature = "serde", serde(default))]
    pub anchor: ProbeAnchor,
}

impl Default for RaycastConfig {
    fn default() -> Self {
        Self {
            probe_width: DEFAULT_PROBE_SIZE,
            probe_height: DEFAULT_PROBE_SIZE,
            anchor: ProbeAnchor::MinCorner,
        }
    }
}

impl RaycastConfig {
    /// Create a validated configuration.
    pub fn new(probe_width: f64, probe_height: f64, anchor: ProbeAnchor) -> Result<Self> {
        let config = Self {
            probe_width,
            probe_height,
            anchor,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the probe size, validating it.
    pub fn with_probe_size(self, width: f64, height: f64) -> Result<Self> {
        Self::new(width, height, self.anchor)
    }

    /// Replace the probe anchor.
    #[must_use]
    pub fn with_anchor(self, anchor: ProbeAnchor) -> Self {
        Self { anchor, ..self }
    }

    /// Check that both probe extents are finite and strictly positive.
    ///
    /// Useful after deserializing a configuration, since the fields are public.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.probe_width) && ok(self.probe_height) {
            Ok(())
        } else {
            Err(CollisionError::InvalidProbeSize {
                width: self.probe_width,
                height: self.probe_height,
            })
        }
    }

    /// Probe rectangle for a sample position.
    pub fn probe_at(&self, p: Point) -> Rect {
        match self.anchor {
            ProbeAnchor::MinCorner => {
                Rect::new(p.x, p.y, p.x + self.probe_width, p.y + self.probe_height)
            }
            ProbeAnchor::Center => {
                let hw = 0.5 * self.probe_width;
                let hh = 0.5 * self.probe_height;
                Rect::new(p.x - hw, p.y - hh, p.x + hw, p.y + hh)
            }
        }
    }
}
