// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Capabilities supplied by the host modeling environment.
//!
//! Crossing detection and planning are pure; everything that reads the
//! model beyond geometry, or mutates it, goes through these traits. The
//! ray-cast primitive lives in the geometry crate as
//! [`duct_openings_geometry::RayCaster`].

use duct_openings_geometry::{ElementId, LevelId, SurfaceCandidate, SurfaceId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::planner::PlacementRequest;

/// Supplies the walls to test duct centerlines against.
pub trait CandidateSupplier {
    fn candidates(&self) -> Vec<SurfaceCandidate>;
}

/// Resolves a wall to the level it is hosted on.
pub trait LevelResolver {
    fn level_of(&self, surface: &SurfaceId) -> Option<LevelId>;
}

/// The opening family symbol to instantiate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyRef {
    pub id: ElementId,
    pub name: String,
}

/// Handle of a created opening instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpeningHandle(pub ElementId);

/// Creates opening instances inside units of work.
///
/// `create_opening` is only valid between `begin` and `commit`/`rollback`.
pub trait OpeningCreator {
    /// Make the family symbol placeable. Applied immediately.
    fn activate_family(&mut self, family: &FamilyRef) -> Result<()>;

    fn begin(&mut self, name: &str) -> Result<()>;

    fn create_opening(
        &mut self,
        request: &PlacementRequest,
        family: &FamilyRef,
    ) -> Result<OpeningHandle>;

    fn commit(&mut self) -> Result<()>;

    /// Discard everything created since `begin`.
    fn rollback(&mut self);
}

/// Owned wall-to-level lookup table.
#[derive(Debug, Clone, Default)]
pub struct LevelIndex {
    levels: FxHashMap<SurfaceId, LevelId>,
}

impl LevelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, surface: SurfaceId, level: LevelId) {
        self.levels.insert(surface, level);
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelResolver for LevelIndex {
    fn level_of(&self, surface: &SurfaceId) -> Option<LevelId> {
        self.levels.get(surface).copied()
    }
}

impl FromIterator<(SurfaceId, LevelId)> for LevelIndex {
    fn from_iter<I: IntoIterator<Item = (SurfaceId, LevelId)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}
