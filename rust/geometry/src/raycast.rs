// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ray casting against wall candidates
//!
//! [`RayCaster`] is the seam to whatever geometric kernel the host provides.
//! [`MeshRayCaster`] is the in-crate implementation over triangulated
//! [`SurfaceCandidate`]s.

use crate::keys::SurfaceId;
use crate::surface::SurfaceCandidate;
use crate::{Point3, Vector3};

/// Hits this far behind the origin still count (and clamp to zero), so a
/// duct that starts flush with a wall face still sees that wall.
pub const BEHIND_ORIGIN_TOLERANCE: f64 = 1e-9;

/// A single ray hit: which wall, how far along the ray, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub surface: SurfaceId,
    /// Distance from the ray origin (>= 0)
    pub proximity: f64,
    pub point: Point3<f64>,
}

/// Ray-cast primitive.
pub trait RayCaster {
    /// Cast a ray from `origin` along unit `direction`.
    ///
    /// Returns every hit against candidates accepted by `filter`, in a
    /// stable order. Implementations may skip hits beyond `max_distance`
    /// but callers must not rely on it.
    fn cast(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance: f64,
        filter: &dyn Fn(&SurfaceId) -> bool,
    ) -> Vec<Crossing>;
}

/// Brute-force caster over a candidate slice with a bounding box prefilter.
#[derive(Debug, Clone, Copy)]
pub struct MeshRayCaster<'a> {
    candidates: &'a [SurfaceCandidate],
}

impl<'a> MeshRayCaster<'a> {
    pub fn new(candidates: &'a [SurfaceCandidate]) -> Self {
        Self { candidates }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

impl RayCaster for MeshRayCaster<'_> {
    fn cast(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        max_distance: f64,
        filter: &dyn Fn(&SurfaceId) -> bool,
    ) -> Vec<Crossing> {
        let mut hits = Vec::new();

        for candidate in self.candidates {
            if !filter(&candidate.id) {
                continue;
            }
            if !candidate.bounds.intersects_ray(
                origin,
                direction,
                -BEHIND_ORIGIN_TOLERANCE,
                max_distance + BEHIND_ORIGIN_TOLERANCE,
            ) {
                continue;
            }

            for triangle in &candidate.triangles {
                let Some(t) = triangle.intersect_ray(origin, direction) else {
                    continue;
                };
                if t < -BEHIND_ORIGIN_TOLERANCE || t > max_distance {
                    continue;
                }

                let proximity = t.max(0.0);
                hits.push(Crossing {
                    surface: candidate.id,
                    proximity,
                    point: *origin + *direction * proximity,
                });
            }
        }

        // Stable: equal proximities keep candidate/triangle order
        hits.sort_by(|a, b| a.proximity.total_cmp(&b.proximity));
        hits
    }
}
