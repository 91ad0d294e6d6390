// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duct Openings Geometry
//!
//! Detects where duct centerlines cross walls. Walls are triangulated
//! surface candidates, rays are cast with a pluggable [`RayCaster`], and
//! hits are reduced to one crossing per logical wall.

pub mod crossing;
pub mod error;
pub mod keys;
pub mod raycast;
pub mod segment;
pub mod surface;
pub mod triangulation;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use crossing::{dedup_by_surface, find_crossings, find_crossings_filtered, find_crossings_in};
pub use error::{Error, Result};
pub use keys::{ContainerKey, ElementId, LevelId, SurfaceId};
pub use raycast::{Crossing, MeshRayCaster, RayCaster};
pub use segment::Segment;
pub use surface::{Aabb, SurfaceCandidate, Triangle, WallSolid};
