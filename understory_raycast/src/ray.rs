// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rays and the unit-step sampler that walks them.

use core::iter::FusedIterator;

use kurbo::{Point, Rect, Vec2};

use crate::config::RaycastConfig;

/// A ray given by origin, heading in degrees, and length.
///
/// Headings follow the usual math convention: 0° points along +x and angles grow towards +y.
/// With a y-down screen coordinate system that means 90° points down. Any real heading is
/// accepted; it is reduced through `sin`/`cos`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    origin: Point,
    degrees: f64,
    direction: Vec2,
    length: f64,
}

impl Ray {
    /// Longest length a ray walks. Longer finite lengths are clamped to this.
    ///
    /// At one index query per unit, this is already far more work than any single query
    /// should do; the cap keeps absurd inputs such as `1e300` from running indefinitely.
    pub const MAX_LENGTH: f64 = 16_777_216.0;

    /// Create a ray starting at `(x, y)`.
    pub fn new(x: f64, y: f64, degrees: f64, length: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            degrees,
            direction: Vec2::from_angle(degrees.to_radians()),
            length,
        }
    }

    /// Where the ray starts.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Heading in degrees, as given.
    pub fn degrees(&self) -> f64 {
        self.degrees
    }

    /// Unit direction vector `(cos θ, sin θ)`.
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Requested length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Number of samples the ray produces: `⌈length⌉`.
    ///
    /// Zero, negative, NaN, and infinite lengths produce no samples. Finite lengths above
    /// [`MAX_LENGTH`](Self::MAX_LENGTH) produce `MAX_LENGTH` samples.
    pub fn step_count(&self) -> usize {
        if self.length.is_finite() && self.length > 0.0 {
            ceil_to_usize(self.length.min(Self::MAX_LENGTH))
        } else {
            0
        }
    }

    /// Sample position of step `k`: `origin + k · direction`.
    #[allow(
        clippy::cast_precision_loss,
        reason = "Step indices stay far below 2^53 for any ray that finishes in practice."
    )]
    pub fn point_at(&self, k: usize) -> Point {
        self.origin + self.direction * k as f64
    }

    /// Lazily iterate the sample positions, starting at the origin.
    ///
    /// Consecutive samples are exactly one unit apart. The iterator is cheap to recreate, so
    /// every query walks the ray from the start.
    pub fn steps(&self) -> RaySteps {
        RaySteps {
            ray: *self,
            next: 0,
            end: self.step_count(),
        }
    }

    /// Iterate the probe rectangles a raycast with `config` would query.
    pub fn probes(&self, config: RaycastConfig) -> impl Iterator<Item = Rect> + use<> {
        self.steps().map(move |p| config.probe_at(p))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "Callers pass positive values no larger than Ray::MAX_LENGTH."
)]
fn ceil_to_usize(v: f64) -> usize {
    v.ceil() as usize
}

/// Iterator over the unit-spaced sample positions of a [`Ray`].
#[derive(Clone, Debug)]
pub struct RaySteps {
    ray: Ray,
    next: usize,
    end: usize,
}

impl RaySteps {
    /// Index of the next step to be produced.
    pub fn step_index(&self) -> usize {
        self.next
    }
}

impl Iterator for RaySteps {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.next >= self.end {
            return None;
        }
        let p = self.ray.point_at(self.next);
        self.next += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for RaySteps {}

impl FusedIterator for RaySteps {}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn step_count_is_ceiling() {
        assert_eq!(Ray::new(0.0, 0.0, 0.0, 10.0).step_count(), 10);
        assert_eq!(Ray::new(0.0, 0.0, 0.0, 10.2).step_count(), 11);
        assert_eq!(Ray::new(0.0, 0.0, 0.0, 0.5).step_count(), 1);
        assert_eq!(Ray::new(0.0, 0.0, 0.0, 0.0).steps().count(), 0);
        assert_eq!(Ray::new(0.0, 0.0, 0.0, -3.0).steps().count(), 0);
        assert_eq!(Ray::new(0.0, 0.0, 0.0, f64::NAN).steps().count(), 0);
        assert_eq!(Ray::new(0.0, 0.0, 0.0, f64::INFINITY).steps().count(), 0);
    }

    #[test]
    fn huge_lengths_are_clamped() {
        let cap = Ray::new(0.0, 0.0, 0.0, Ray::MAX_LENGTH).step_count();
        assert_eq!(Ray::new(0.0, 0.0, 0.0, 1e300).step_count(), cap);
        assert_eq!(Ray::new(0.0, 0.0, 0.0, f64::MAX).steps().len(), cap);
        assert_eq!(cap, 1 << 24);
        assert_eq!(Ray::new(0.0, 0.0, 0.0, Ray::MAX_LENGTH - 0.5).step_count(), cap);
    }

    #[test]
    fn consecutive_samples_are_unit_apart() {
        for degrees in [0.0, 33.0, 90.0, 135.0, 270.0, -45.0, 720.5] {
            let ray = Ray::new(3.0, -2.0, degrees, 25.0);
            let pts: Vec<_> = ray.steps().collect();
            assert_eq!(pts.len(), 25);
            assert_eq!(pts[0], Point::new(3.0, -2.0));
            let theta = f64::to_radians(degrees);
            for w in pts.windows(2) {
                let d = w[1] - w[0];
                assert_abs_diff_eq!(d.hypot(), 1.0, epsilon = 1e-9);
                assert_abs_diff_eq!(d.x, theta.cos(), epsilon = 1e-9);
                assert_abs_diff_eq!(d.y, theta.sin(), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn steps_restart_and_report_size() {
        let ray = Ray::new(0.0, 0.0, 90.0, 4.0);
        let mut it = ray.steps();
        assert_eq!(it.len(), 4);
        it.next();
        assert_eq!(it.step_index(), 1);
        assert_eq!(it.len(), 3);
        assert_eq!(ray.steps().next(), Some(Point::ORIGIN));
        let last = it.last().unwrap();
        assert_abs_diff_eq!(last.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(last.y, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn probes_follow_samples() {
        let ray = Ray::new(1.0, 1.0, 0.0, 3.0);
        let probes: Vec<_> = ray.probes(RaycastConfig::default()).collect();
        assert_eq!(probes.len(), 3);
        assert_eq!(probes[2].x0, 3.0);
        assert_eq!(probes[2].y0, 1.0);
    }
}
