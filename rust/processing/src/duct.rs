// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ducts as read from the mechanical model.

use duct_openings_geometry::{ElementId, Point3, Segment};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cross-section of a duct
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DuctProfile {
    Round { diameter: f64 },
    Rectangular { width: f64, height: f64 },
}

/// A straight duct run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duct {
    pub id: ElementId,
    /// Centerline start
    pub start: Point3<f64>,
    /// Centerline end
    pub end: Point3<f64>,
    pub profile: DuctProfile,
}

impl Duct {
    pub fn round(id: ElementId, start: Point3<f64>, end: Point3<f64>, diameter: f64) -> Self {
        Self {
            id,
            start,
            end,
            profile: DuctProfile::Round { diameter },
        }
    }

    /// Centerline segment from start to end.
    pub fn segment(&self) -> Result<Segment> {
        Ok(Segment::from_endpoints(self.start, self.end)?)
    }

    /// Diameter of a round duct.
    ///
    /// Rectangular ducts have no defined opening size yet and are reported
    /// as [`Error::UnsupportedProfile`].
    pub fn diameter(&self) -> Result<f64> {
        match self.profile {
            DuctProfile::Round { diameter } => Ok(diameter),
            DuctProfile::Rectangular { width, height } => Err(Error::UnsupportedProfile {
                duct: self.id,
                profile: format!("rectangular {}x{}", width, height),
            }),
        }
    }
}
