// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall surface candidates
//!
//! A candidate is a logical wall ([`SurfaceId`]) together with the
//! triangles of its boundary. Walls are closed solids, so a centerline that
//! passes through one hits at least two of its triangles. Those hits are
//! collapsed again by the crossing finder.

use crate::error::{Error, Result};
use crate::keys::SurfaceId;
use crate::triangulation::triangulate_face;
use crate::{Point3, Vector3};

/// Barycentric slack so hits on shared triangle edges are not lost
const EDGE_EPSILON: f64 = 1e-9;

/// Triangle definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    /// Create a new triangle
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// Calculate triangle area
    pub fn area(&self) -> f64 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(&edge2).norm() * 0.5
    }

    /// Ray parameter of the intersection with this triangle (Möller–Trumbore).
    ///
    /// Returns the signed distance along `direction` (which must be unit
    /// length for the result to be a distance). Rays parallel to the
    /// triangle plane and degenerate triangles never hit.
    pub fn intersect_ray(&self, origin: &Point3<f64>, direction: &Vector3<f64>) -> Option<f64> {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = direction.cross(&edge2);
        let a = edge1.dot(&h);
        // Scale-aware parallel test
        if a.abs() <= 1e-12 * edge1.norm() * edge2.norm() {
            return None;
        }

        let f = 1.0 / a;
        let s = *origin - self.v0;
        let u = f * s.dot(&h);
        if !(-EDGE_EPSILON..=1.0 + EDGE_EPSILON).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);
        if v < -EDGE_EPSILON || u + v > 1.0 + EDGE_EPSILON {
            return None;
        }

        let t = f * edge2.dot(&q);
        t.is_finite().then_some(t)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// An inverted box that any point will expand
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn expand(&mut self, p: &Point3<f64>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Slab test for the ray interval `[t_min, t_max]`.
    pub fn intersects_ray(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
        t_min: f64,
        t_max: f64,
    ) -> bool {
        let mut tmin = t_min;
        let mut tmax = t_max;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (min, max) = (self.min[axis], self.max[axis]);

            if d.abs() <= 1e-15 {
                if o < min || o > max {
                    return false;
                }
                continue;
            }

            let inv_d = 1.0 / d;
            let mut t0 = (min - o) * inv_d;
            let mut t1 = (max - o) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            tmin = tmin.max(t0);
            tmax = tmax.min(t1);
            if tmax < tmin {
                return false;
            }
        }

        true
    }
}

/// A straight wall solid: baseline, thickness and height.
///
/// The baseline runs along the wall's centre at its base elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallSolid {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub thickness: f64,
    pub height: f64,
}

/// A wall that a duct centerline may cross
#[derive(Debug, Clone)]
pub struct SurfaceCandidate {
    pub id: SurfaceId,
    pub triangles: Vec<Triangle>,
    pub bounds: Aabb,
}

impl SurfaceCandidate {
    /// Build a candidate from triangles.
    pub fn from_triangles(id: SurfaceId, triangles: Vec<Triangle>) -> Result<Self> {
        if triangles.is_empty() {
            return Err(Error::InvalidSurface {
                surface: id,
                reason: "no triangles".to_string(),
            });
        }

        let mut bounds = Aabb::empty();
        for tri in &triangles {
            bounds.expand(&tri.v0);
            bounds.expand(&tri.v1);
            bounds.expand(&tri.v2);
        }

        Ok(Self {
            id,
            triangles,
            bounds,
        })
    }

    /// Build a candidate from planar polygon faces.
    pub fn from_faces(id: SurfaceId, faces: &[Vec<Point3<f64>>]) -> Result<Self> {
        let mut triangles = Vec::with_capacity(faces.len() * 2);

        for face in faces {
            let indices = triangulate_face(face).map_err(|e| Error::InvalidSurface {
                surface: id,
                reason: e.to_string(),
            })?;
            triangles.extend(
                indices
                    .into_iter()
                    .map(|[a, b, c]| Triangle::new(face[a], face[b], face[c])),
            );
        }

        Self::from_triangles(id, triangles)
    }

    /// Mesh a straight wall solid as a closed box (12 triangles).
    pub fn from_wall(id: SurfaceId, wall: &WallSolid) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidSurface { surface: id, reason };

        let run = Vector3::new(wall.end.x - wall.start.x, wall.end.y - wall.start.y, 0.0);
        let run_len = run.norm();
        if !run_len.is_finite() || run_len < 1e-9 {
            return Err(invalid("zero-length baseline".to_string()));
        }
        if !(wall.thickness.is_finite() && wall.thickness > 0.0) {
            return Err(invalid(format!("invalid thickness {}", wall.thickness)));
        }
        if !(wall.height.is_finite() && wall.height > 0.0) {
            return Err(invalid(format!("invalid height {}", wall.height)));
        }

        let along = run / run_len;
        let across = Vector3::new(-along.y, along.x, 0.0) * (wall.thickness * 0.5);
        let up = Vector3::new(0.0, 0.0, wall.height);
        let base = wall.start.z;
        let start = Point3::new(wall.start.x, wall.start.y, base);
        let end = Point3::new(wall.end.x, wall.end.y, base);

        let v0 = start - across; // bottom, right side, start
        let v1 = end - across; // bottom, right side, end
        let v2 = end + across; // bottom, left side, end
        let v3 = start + across; // bottom, left side, start
        let v4 = v0 + up;
        let v5 = v1 + up;
        let v6 = v2 + up;
        let v7 = v3 + up;

        let triangles = vec![
            // Right face
            Triangle::new(v0, v1, v5),
            Triangle::new(v0, v5, v4),
            // Left face
            Triangle::new(v2, v3, v7),
            Triangle::new(v2, v7, v6),
            // Start end cap
            Triangle::new(v3, v0, v4),
            Triangle::new(v3, v4, v7),
            // Finish end cap
            Triangle::new(v1, v2, v6),
            Triangle::new(v1, v6, v5),
            // Bottom
            Triangle::new(v0, v3, v2),
            Triangle::new(v0, v2, v1),
            // Top
            Triangle::new(v4, v5, v6),
            Triangle::new(v4, v6, v7),
        ];

        Self::from_triangles(id, triangles)
    }

    /// Copy of this candidate moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        let offset = *offset;
        let shift = |t: &Triangle| Triangle::new(t.v0 + offset, t.v1 + offset, t.v2 + offset);
        Self {
            id: self.id,
            triangles: self.triangles.iter().map(shift).collect(),
            bounds: Aabb {
                min: self.bounds.min + offset,
                max: self.bounds.max + offset,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::ElementId;
    use approx::assert_relative_eq;

    fn wall_along_y_at_x5() -> WallSolid {
        WallSolid {
            start: Point3::new(5.0, -10.0, 0.0),
            end: Point3::new(5.0, 10.0, 0.0),
            thickness: 0.2,
            height: 3.0,
        }
    }

    #[test]
    fn triangle_hit_and_miss() {
        let tri = Triangle::new(
            Point3::new(2.0, -1.0, -1.0),
            Point3::new(2.0, 1.0, -1.0),
            Point3::new(2.0, 0.0, 1.0),
        );
        let t = tri.intersect_ray(&Point3::origin(), &Vector3::x()).unwrap();
        assert_relative_eq!(t, 2.0, epsilon = 1e-12);

        // Behind the origin: negative parameter
        let t = tri
            .intersect_ray(&Point3::new(5.0, 0.0, 0.0), &Vector3::x())
            .unwrap();
        assert_relative_eq!(t, -3.0, epsilon = 1e-12);

        // Outside the triangle
        assert!(tri
            .intersect_ray(&Point3::new(0.0, 5.0, 0.0), &Vector3::x())
            .is_none());

        // Parallel
        assert!(tri.intersect_ray(&Point3::origin(), &Vector3::y()).is_none());
    }

    #[test]
    fn aabb_slab_test() {
        let mut bounds = Aabb::empty();
        bounds.expand(&Point3::new(1.0, -1.0, -1.0));
        bounds.expand(&Point3::new(2.0, 1.0, 1.0));

        assert!(bounds.intersects_ray(&Point3::origin(), &Vector3::x(), 0.0, 10.0));
        assert!(!bounds.intersects_ray(&Point3::origin(), &Vector3::x(), 0.0, 0.5));
        assert!(!bounds.intersects_ray(&Point3::origin(), &Vector3::y(), 0.0, 10.0));
        assert!(!bounds.intersects_ray(&Point3::origin(), &-Vector3::x(), 0.0, 10.0));
    }

    #[test]
    fn wall_box_bounds() {
        let cand =
            SurfaceCandidate::from_wall(SurfaceId::host(ElementId(1)), &wall_along_y_at_x5())
                .unwrap();
        assert_eq!(cand.triangles.len(), 12);
        assert_relative_eq!(cand.bounds.min.x, 4.9, epsilon = 1e-12);
        assert_relative_eq!(cand.bounds.max.x, 5.1, epsilon = 1e-12);
        assert_relative_eq!(cand.bounds.max.z, 3.0, epsilon = 1e-12);

        let area: f64 = cand.triangles.iter().map(Triangle::area).sum();
        // 2 * (20*3) + 2 * (0.2*3) + 2 * (20*0.2)
        assert_relative_eq!(area, 120.0 + 1.2 + 8.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_walls_are_rejected() {
        let id = SurfaceId::host(ElementId(1));
        let mut wall = wall_along_y_at_x5();
        wall.thickness = 0.0;
        assert!(matches!(
            SurfaceCandidate::from_wall(id, &wall),
            Err(Error::InvalidSurface { .. })
        ));

        let mut wall = wall_along_y_at_x5();
        wall.end = Point3::new(5.0, -10.0, 2.0);
        assert!(SurfaceCandidate::from_wall(id, &wall).is_err());

        assert!(SurfaceCandidate::from_triangles(id, Vec::new()).is_err());
    }

    #[test]
    fn from_faces_triangulates() {
        let face = vec![
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(5.0, 2.0, 0.0),
            Point3::new(5.0, 2.0, 3.0),
            Point3::new(0.0, 2.0, 3.0),
        ];
        let cand = SurfaceCandidate::from_faces(SurfaceId::host(ElementId(3)), &[face]).unwrap();
        assert_eq!(cand.triangles.len(), 2);
        assert_relative_eq!(cand.bounds.min.y, 2.0);
    }

    #[test]
    fn translation_moves_bounds_and_triangles() {
        let cand =
            SurfaceCandidate::from_wall(SurfaceId::host(ElementId(1)), &wall_along_y_at_x5())
                .unwrap();
        let moved = cand.translated(&Vector3::new(1.0, 0.0, 0.5));
        assert_relative_eq!(moved.bounds.min.x, 5.9, epsilon = 1e-12);
        assert_relative_eq!(moved.bounds.min.z, 0.5, epsilon = 1e-12);
        assert_relative_eq!(moved.triangles[0].v0.x, cand.triangles[0].v0.x + 1.0);
    }
}
