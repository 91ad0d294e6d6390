// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for planning and placing openings.

use duct_openings_geometry::{ElementId, SurfaceId};
use thiserror::Error;

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while planning or placing openings.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed centerline or wall geometry.
    #[error(transparent)]
    Geometry(#[from] duct_openings_geometry::Error),

    /// Duct diameter is zero, negative or not a number.
    #[error("invalid duct geometry: diameter {diameter}")]
    InvalidDuctGeometry { diameter: f64 },

    /// Only round ducts map to a square opening.
    #[error("unsupported duct profile for duct {duct}: {profile}")]
    UnsupportedProfile { duct: ElementId, profile: String },

    /// The crossed wall has no level to host the opening on.
    #[error("unresolved host: wall {0} has no level")]
    UnresolvedHost(SurfaceId),

    /// The host refused to create an opening.
    #[error("opening creation failed: {0}")]
    Creation(String),

    /// Unit-of-work misuse or a failed commit.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// No open document besides the active one carries the marker.
    #[error("mechanical model not found: no document title contains '{0}'")]
    MechanicalModelNotFound(String),

    #[error("opening family '{0}' not found")]
    FamilyNotFound(String),

    #[error("no non-template 3D view found")]
    ViewNotFound,

    #[error("session has no documents")]
    EmptySession,

    /// Every element id up to `u64::MAX` is taken.
    #[error("no element ids left in the document")]
    IdSpaceExhausted,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for [`duct_openings_geometry::Error::InvalidSegment`].
    pub fn is_invalid_segment(&self) -> bool {
        matches!(
            self,
            Error::Geometry(duct_openings_geometry::Error::InvalidSegment(_))
        )
    }
}
