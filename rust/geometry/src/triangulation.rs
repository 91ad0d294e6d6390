// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar face triangulation
//!
//! Wall faces arrive as planar 3D polygons. They are projected onto their
//! own plane and triangulated with earcutr, with fast paths for the
//! triangles, quads and small convex faces that make up most wall geometry.

use crate::{Error, Point2, Point3, Result, Vector3};

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate a simple 2D polygon (no holes).
/// Returns triangle indices into the input points.
pub fn triangulate_polygon(points: &[Point2<f64>]) -> Result<Vec<usize>> {
    let n = points.len();

    if n < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points to triangulate".to_string(),
        ));
    }

    if n == 3 {
        return Ok(vec![0, 1, 2]);
    }

    if n <= 8 && is_convex(points) {
        return Ok(fan_triangulate(n));
    }

    let mut vertices = Vec::with_capacity(n * 2);
    for p in points {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    earcutr::earcut(&vertices, &[], 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Project 3D points onto the plane with the given normal.
/// Uses the first point as the 2D origin.
pub fn project_to_2d(points_3d: &[Point3<f64>], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let Some(origin) = points_3d.first().copied() else {
        return Vec::new();
    };

    // Axis least parallel to the normal gives a stable cross product
    let abs_x = normal.x.abs();
    let abs_y = normal.y.abs();
    let abs_z = normal.z.abs();

    let reference = if abs_x <= abs_y && abs_x <= abs_z {
        Vector3::new(1.0, 0.0, 0.0)
    } else if abs_y <= abs_z {
        Vector3::new(0.0, 1.0, 0.0)
    } else {
        Vector3::new(0.0, 0.0, 1.0)
    };

    let u_axis = normal.cross(&reference).normalize();
    let v_axis = normal.cross(&u_axis).normalize();

    points_3d
        .iter()
        .map(|p| {
            let v = p - origin;
            Point2::new(v.dot(&u_axis), v.dot(&v_axis))
        })
        .collect()
}

/// Polygon normal by Newell's method.
/// Returns `None` for degenerate (zero-area) polygons.
pub fn calculate_polygon_normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    let mut normal = Vector3::<f64>::zeros();
    for i in 0..n {
        let current = &points[i];
        let next = &points[(i + 1) % n];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    let len = normal.norm();
    (len > 1e-10).then(|| normal / len)
}

/// Triangulate a planar 3D face.
/// Returns index triples into `points`.
pub fn triangulate_face(points: &[Point3<f64>]) -> Result<Vec<[usize; 3]>> {
    let normal = calculate_polygon_normal(points).ok_or_else(|| {
        Error::TriangulationError(format!("degenerate face with {} points", points.len()))
    })?;

    let projected = project_to_2d(points, &normal);
    let indices = triangulate_polygon(&projected)?;

    Ok(indices
        .chunks_exact(3)
        .map(|tri| [tri[0], tri[1], tri[2]])
        .collect())
}
