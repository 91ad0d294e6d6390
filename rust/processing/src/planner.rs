// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Opening Placement Planner
//!
//! Turns one wall crossing into a placement request: where the opening
//! goes, which wall and level host it, and how big it is.

use duct_openings_geometry::{Crossing, LevelId, Point3, Segment, SurfaceId};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::host::LevelResolver;

/// Everything the host needs to insert one opening.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRequest {
    pub insertion_point: Point3<f64>,
    pub host_wall: SurfaceId,
    pub host_level: LevelId,
    pub width: f64,
    pub height: f64,
}

/// Plan the opening for `crossing` on a round duct of `duct_diameter`.
///
/// The insertion point is re-derived from the segment and the crossing's
/// proximity rather than taken from the hit point, so it always lies on
/// the centerline.
pub fn plan<L: LevelResolver + ?Sized>(
    segment: &Segment,
    crossing: &Crossing,
    duct_diameter: f64,
    levels: &L,
) -> Result<PlacementRequest> {
    if !(duct_diameter.is_finite() && duct_diameter > 0.0) {
        return Err(Error::InvalidDuctGeometry {
            diameter: duct_diameter,
        });
    }

    let host_level = levels
        .level_of(&crossing.surface)
        .ok_or(Error::UnresolvedHost(crossing.surface))?;

    Ok(PlacementRequest {
        insertion_point: segment.point_at(crossing.proximity),
        host_wall: crossing.surface,
        host_level,
        width: duct_diameter,
        height: duct_diameter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LevelIndex;
    use duct_openings_geometry::{ElementId, Vector3};

    fn setup() -> (Segment, Crossing, LevelIndex) {
        let wall = SurfaceId::host(ElementId(1));
        let segment = Segment::new(Point3::origin(), Vector3::x(), 10.0).unwrap();
        let crossing = Crossing {
            surface: wall,
            proximity: 4.0,
            point: Point3::new(4.0, 0.0, 0.0),
        };
        let levels = [(wall, LevelId(100))].into_iter().collect();
        (segment, crossing, levels)
    }

    #[test]
    fn insertion_point_lies_at_proximity() {
        let (segment, crossing, levels) = setup();
        let request = plan(&segment, &crossing, 0.3, &levels).unwrap();

        assert_eq!(request.insertion_point, Point3::new(4.0, 0.0, 0.0));
        assert_eq!(request.host_wall, crossing.surface);
        assert_eq!(request.host_level, LevelId(100));
    }

    #[test]
    fn diameter_becomes_width_and_height() {
        let (segment, crossing, levels) = setup();
        let request = plan(&segment, &crossing, 0.3, &levels).unwrap();
        assert_eq!(request.width, 0.3);
        assert_eq!(request.height, 0.3);
    }

    #[test]
    fn non_positive_diameter_is_rejected() {
        let (segment, crossing, levels) = setup();
        for diameter in [0.0, -0.2, f64::NAN] {
            assert!(matches!(
                plan(&segment, &crossing, diameter, &levels),
                Err(Error::InvalidDuctGeometry { .. })
            ));
        }
    }

    #[test]
    fn missing_level_is_unresolved_host() {
        let (segment, crossing, _) = setup();
        let err = plan(&segment, &crossing, 0.3, &LevelIndex::new()).unwrap_err();
        assert!(matches!(err, Error::UnresolvedHost(s) if s == crossing.surface));
    }

    #[test]
    fn diameter_checked_before_level_lookup() {
        let (segment, crossing, _) = setup();
        let err = plan(&segment, &crossing, 0.0, &LevelIndex::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidDuctGeometry { .. }));
    }
}
