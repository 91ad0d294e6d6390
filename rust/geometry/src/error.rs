// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::keys::SurfaceId;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during crossing detection
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    #[error("Invalid surface {surface}: {reason}")]
    InvalidSurface { surface: SurfaceId, reason: String },

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),
}
