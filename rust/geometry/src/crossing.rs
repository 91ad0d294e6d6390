// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crossing Finder
//!
//! Finds every distinct wall a duct centerline passes through:
//!
//! 1. Cast the segment as a ray from its origin along its direction.
//! 2. Drop hits farther than the segment length (the duct ends first).
//! 3. Collapse hits that resolve to the same [`SurfaceId`], keeping the
//!    first one in caster order.
//!
//! A wall is a closed solid and may be tessellated, so one wall normally
//! produces several raw hits. Keeping the first is safe because all of
//! them lie on the same wall within modeling tolerance.

use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::keys::SurfaceId;
use crate::raycast::{Crossing, MeshRayCaster, RayCaster};
use crate::segment::Segment;
use crate::surface::SurfaceCandidate;

/// Find the distinct walls crossed by `segment`.
///
/// Fails with [`crate::Error::InvalidSegment`] for a malformed segment;
/// an empty result means nothing was crossed.
pub fn find_crossings<R: RayCaster + ?Sized>(
    segment: &Segment,
    caster: &R,
) -> Result<Vec<Crossing>> {
    find_crossings_filtered(segment, caster, &|_| true)
}

/// [`find_crossings`] restricted to candidates accepted by `filter`.
pub fn find_crossings_filtered<R: RayCaster + ?Sized>(
    segment: &Segment,
    caster: &R,
    filter: &dyn Fn(&SurfaceId) -> bool,
) -> Result<Vec<Crossing>> {
    segment.validate()?;

    let raw = caster.cast(&segment.origin, &segment.direction, segment.length, filter);
    let within = raw.into_iter().filter(|c| c.proximity <= segment.length);

    Ok(dedup_by_surface(within))
}

/// Convenience wrapper casting against `candidates` with [`MeshRayCaster`].
pub fn find_crossings_in(
    segment: &Segment,
    candidates: &[SurfaceCandidate],
) -> Result<Vec<Crossing>> {
    find_crossings(segment, &MeshRayCaster::new(candidates))
}

/// Keep the first crossing per logical wall, preserving input order.
pub fn dedup_by_surface(crossings: impl IntoIterator<Item = Crossing>) -> Vec<Crossing> {
    let mut seen = FxHashSet::default();
    crossings
        .into_iter()
        .filter(|c| seen.insert(c.surface))
        .collect()
}
