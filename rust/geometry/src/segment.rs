// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duct centerline segments.

use crate::{Error, Point3, Result, Vector3};

/// Tolerance on `|direction| - 1` for a direction to count as unit length.
pub const UNIT_TOLERANCE: f64 = 1e-9;

/// Below this norm a direction vector is considered degenerate.
const DEGENERATE_NORM: f64 = 1e-12;

/// A duct centerline: origin, unit direction and length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point of the centerline
    pub origin: Point3<f64>,
    /// Unit direction from start to end
    pub direction: Vector3<f64>,
    /// Centerline length (>= 0)
    pub length: f64,
}

impl Segment {
    /// Create a segment, normalizing `direction`.
    ///
    /// Fails with [`Error::InvalidSegment`] for a zero or non-finite
    /// direction, non-finite origin, or negative length.
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>, length: f64) -> Result<Self> {
        let norm = direction.norm();
        if !norm.is_finite() || norm < DEGENERATE_NORM {
            return Err(Error::InvalidSegment(format!(
                "degenerate direction ({}, {}, {})",
                direction.x, direction.y, direction.z
            )));
        }

        let segment = Self {
            origin,
            direction: direction / norm,
            length,
        };
        segment.validate()?;
        Ok(segment)
    }

    /// Derive a segment from centerline end points.
    pub fn from_endpoints(start: Point3<f64>, end: Point3<f64>) -> Result<Self> {
        let delta = end - start;
        Self::new(start, delta, delta.norm())
    }

    /// Check the segment invariants.
    ///
    /// Fields are public, so a segment can be assembled by hand; every
    /// consumer re-validates before use.
    pub fn validate(&self) -> Result<()> {
        if !(self.origin.x.is_finite() && self.origin.y.is_finite() && self.origin.z.is_finite())
        {
            return Err(Error::InvalidSegment("non-finite origin".to_string()));
        }

        let norm = self.direction.norm();
        if !norm.is_finite() || norm < DEGENERATE_NORM {
            return Err(Error::InvalidSegment(format!(
                "degenerate direction ({}, {}, {})",
                self.direction.x, self.direction.y, self.direction.z
            )));
        }
        if (norm - 1.0).abs() > UNIT_TOLERANCE {
            return Err(Error::InvalidSegment(format!(
                "direction is not a unit vector (norm {})",
                norm
            )));
        }

        if !self.length.is_finite() || self.length < 0.0 {
            return Err(Error::InvalidSegment(format!(
                "invalid length {}",
                self.length
            )));
        }

        Ok(())
    }

    /// Point at `distance` along the direction from the origin.
    #[inline]
    pub fn point_at(&self, distance: f64) -> Point3<f64> {
        self.origin + self.direction * distance
    }

    /// End point of the centerline.
    #[inline]
    pub fn end(&self) -> Point3<f64> {
        self.point_at(self.length)
    }
}
