// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch placement of openings.
//!
//! Every duct is processed exactly once and independently:
//!
//! 1. derive the centerline segment and the diameter,
//! 2. find the distinct walls it crosses,
//! 3. plan one opening per crossing,
//! 4. create the planned openings in one unit of work for that duct.
//!
//! A bad duct is skipped and the batch moves on; a crossing that cannot be
//! placed is skipped without affecting its siblings. Only failing to
//! activate the opening family aborts the run.

use std::collections::BTreeMap;

use duct_openings_geometry::{
    find_crossings, ElementId, Error as GeometryError, LevelId, Point3, RayCaster, SurfaceId,
};
use serde::Serialize;

use crate::duct::Duct;
use crate::error::{Error, Result};
use crate::host::{FamilyRef, LevelResolver, OpeningCreator};
use crate::planner::{plan, PlacementRequest};

/// Why a duct or crossing was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InvalidSegment,
    InvalidDuctGeometry,
    UnsupportedProfile,
    UnresolvedHost,
    CreationFailed,
    TransactionFailed,
    /// Malformed geometry other than the duct centerline
    InvalidGeometry,
    /// An error that has no business surfacing per duct
    Unexpected,
}

impl SkipReason {
    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::InvalidDuctGeometry { .. } => SkipReason::InvalidDuctGeometry,
            Error::UnsupportedProfile { .. } => SkipReason::UnsupportedProfile,
            Error::UnresolvedHost(_) => SkipReason::UnresolvedHost,
            Error::Transaction(_) => SkipReason::TransactionFailed,
            Error::Creation(_) => SkipReason::CreationFailed,
            Error::Geometry(GeometryError::InvalidSegment(_)) => SkipReason::InvalidSegment,
            Error::Geometry(_) => SkipReason::InvalidGeometry,
            Error::MechanicalModelNotFound(_)
            | Error::FamilyNotFound(_)
            | Error::ViewNotFound
            | Error::EmptySession
            | Error::IdSpaceExhausted
            | Error::Json(_) => SkipReason::Unexpected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::InvalidSegment => "invalid segment",
            SkipReason::InvalidDuctGeometry => "invalid duct geometry",
            SkipReason::UnsupportedProfile => "unsupported duct profile",
            SkipReason::UnresolvedHost => "unresolved host",
            SkipReason::CreationFailed => "creation failed",
            SkipReason::TransactionFailed => "transaction failed",
            SkipReason::InvalidGeometry => "invalid geometry",
            SkipReason::Unexpected => "unexpected error",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedOpening {
    pub duct: ElementId,
    pub opening: ElementId,
    pub wall: SurfaceId,
    pub level: LevelId,
    pub point: Point3<f64>,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDuct {
    pub duct: ElementId,
    pub reason: SkipReason,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCrossing {
    pub duct: ElementId,
    pub wall: SurfaceId,
    pub reason: SkipReason,
    pub message: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub ducts_processed: usize,
    pub placed: Vec<PlacedOpening>,
    pub skipped_ducts: Vec<SkippedDuct>,
    pub skipped_crossings: Vec<SkippedCrossing>,
}

/// Aggregate counts of a [`RunReport`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub ducts_processed: usize,
    pub openings_placed: usize,
    pub ducts_skipped: usize,
    pub crossings_skipped: usize,
    pub reasons: BTreeMap<SkipReason, usize>,
}

impl RunReport {
    pub fn openings_placed(&self) -> usize {
        self.placed.len()
    }

    /// No duct or crossing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped_ducts.is_empty() && self.skipped_crossings.is_empty()
    }

    pub fn summary(&self) -> ReportSummary {
        let mut reasons = BTreeMap::new();
        let all_reasons = self
            .skipped_ducts
            .iter()
            .map(|s| s.reason)
            .chain(self.skipped_crossings.iter().map(|s| s.reason));
        for reason in all_reasons {
            *reasons.entry(reason).or_insert(0) += 1;
        }

        ReportSummary {
            ducts_processed: self.ducts_processed,
            openings_placed: self.placed.len(),
            ducts_skipped: self.skipped_ducts.len(),
            crossings_skipped: self.skipped_crossings.len(),
            reasons,
        }
    }
}

impl std::fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Ducts processed:   {}", self.ducts_processed)?;
        writeln!(f, "Openings placed:   {}", self.openings_placed)?;
        writeln!(f, "Ducts skipped:     {}", self.ducts_skipped)?;
        write!(f, "Crossings skipped: {}", self.crossings_skipped)?;
        for (reason, count) in &self.reasons {
            write!(f, "\n  {}: {}", reason, count)?;
        }
        Ok(())
    }
}

/// Planned openings of one duct.
#[derive(Debug, Clone, Default)]
pub struct DuctPlan {
    pub requests: Vec<PlacementRequest>,
    pub skipped: Vec<SkippedCrossing>,
}

/// Places openings for a batch of ducts.
pub struct OpeningPlacer<'a, R: ?Sized, L: ?Sized> {
    caster: &'a R,
    levels: &'a L,
    family: FamilyRef,
}

impl<'a, R, L> OpeningPlacer<'a, R, L>
where
    R: RayCaster + ?Sized,
    L: LevelResolver + ?Sized,
{
    pub fn new(caster: &'a R, levels: &'a L, family: FamilyRef) -> Self {
        Self {
            caster,
            levels,
            family,
        }
    }

    /// Plan every opening for one duct.
    ///
    /// Errors are duct-level failures; crossing-level failures are
    /// collected in [`DuctPlan::skipped`].
    pub fn plan_duct(&self, duct: &Duct) -> Result<DuctPlan> {
        let segment = duct.segment()?;
        let diameter = duct.diameter()?;
        if !(diameter.is_finite() && diameter > 0.0) {
            return Err(Error::InvalidDuctGeometry { diameter });
        }

        let crossings = find_crossings(&segment, self.caster)?;
        tracing::debug!(
            duct = %duct.id,
            crossings = crossings.len(),
            length = segment.length,
            "Found wall crossings"
        );

        let mut duct_plan = DuctPlan::default();
        for crossing in &crossings {
            match plan(&segment, crossing, diameter, self.levels) {
                Ok(request) => duct_plan.requests.push(request),
                Err(err) => {
                    tracing::warn!(
                        duct = %duct.id,
                        wall = %crossing.surface,
                        error = %err,
                        "Skipping crossing"
                    );
                    duct_plan.skipped.push(SkippedCrossing {
                        duct: duct.id,
                        wall: crossing.surface,
                        reason: SkipReason::from_error(&err),
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok(duct_plan)
    }

    /// Process every duct, creating openings through `creator`.
    pub fn run<C: OpeningCreator + ?Sized>(
        &self,
        ducts: &[Duct],
        creator: &mut C,
    ) -> Result<RunReport> {
        tracing::info!(
            ducts = ducts.len(),
            family = %self.family.name,
            "Starting opening placement"
        );

        creator.activate_family(&self.family)?;

        let mut report = RunReport::default();
        for duct in ducts {
            report.ducts_processed += 1;

            match self.plan_duct(duct) {
                Ok(duct_plan) => {
                    report.skipped_crossings.extend(duct_plan.skipped);
                    if !duct_plan.requests.is_empty() {
                        self.place(duct, &duct_plan.requests, creator, &mut report);
                    }
                }
                Err(err) => {
                    tracing::warn!(duct = %duct.id, error = %err, "Skipping duct");
                    report.skipped_ducts.push(SkippedDuct {
                        duct: duct.id,
                        reason: SkipReason::from_error(&err),
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            ducts = report.ducts_processed,
            placed = report.placed.len(),
            skipped_ducts = report.skipped_ducts.len(),
            skipped_crossings = report.skipped_crossings.len(),
            "Opening placement complete"
        );

        Ok(report)
    }

    /// Create one duct's openings in a single unit of work.
    fn place<C: OpeningCreator + ?Sized>(
        &self,
        duct: &Duct,
        requests: &[PlacementRequest],
        creator: &mut C,
        report: &mut RunReport,
    ) {
        if let Err(err) = creator.begin(&format!("Place openings for duct {}", duct.id)) {
            tracing::warn!(duct = %duct.id, error = %err, "Could not start unit of work");
            report.skipped_ducts.push(SkippedDuct {
                duct: duct.id,
                reason: SkipReason::TransactionFailed,
                message: err.to_string(),
            });
            return;
        }

        let mut placed = Vec::with_capacity(requests.len());
        for request in requests {
            match creator.create_opening(request, &self.family) {
                Ok(handle) => {
                    tracing::debug!(
                        duct = %duct.id,
                        opening = %handle.0,
                        wall = %request.host_wall,
                        "Created opening"
                    );
                    placed.push(PlacedOpening {
                        duct: duct.id,
                        opening: handle.0,
                        wall: request.host_wall,
                        level: request.host_level,
                        point: request.insertion_point,
                        width: request.width,
                        height: request.height,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        duct = %duct.id,
                        wall = %request.host_wall,
                        error = %err,
                        "Opening creation failed"
                    );
                    report.skipped_crossings.push(SkippedCrossing {
                        duct: duct.id,
                        wall: request.host_wall,
                        reason: SkipReason::CreationFailed,
                        message: err.to_string(),
                    });
                }
            }
        }

        match creator.commit() {
            Ok(()) => report.placed.extend(placed),
            Err(err) => {
                tracing::warn!(
                    duct = %duct.id,
                    error = %err,
                    "Commit failed, discarding duct openings"
                );
                creator.rollback();
                report.skipped_ducts.push(SkippedDuct {
                    duct: duct.id,
                    reason: SkipReason::TransactionFailed,
                    message: err.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duct::DuctProfile;
    use crate::host::{LevelIndex, OpeningHandle};
    use duct_openings_geometry::{MeshRayCaster, SurfaceCandidate, WallSolid};

    /// Records calls instead of touching a model.
    #[derive(Default)]
    struct RecordingCreator {
        open: bool,
        staged: Vec<PlacementRequest>,
        committed: Vec<PlacementRequest>,
        commits: usize,
        fail_commit: bool,
        next_id: u64,
    }

    impl OpeningCreator for RecordingCreator {
        fn activate_family(&mut self, _family: &FamilyRef) -> Result<()> {
            Ok(())
        }

        fn begin(&mut self, _name: &str) -> Result<()> {
            self.open = true;
            Ok(())
        }

        fn create_opening(
            &mut self,
            request: &PlacementRequest,
            _family: &FamilyRef,
        ) -> Result<OpeningHandle> {
            assert!(self.open);
            self.staged.push(*request);
            self.next_id += 1;
            Ok(OpeningHandle(ElementId(1000 + self.next_id)))
        }

        fn commit(&mut self) -> Result<()> {
            self.open = false;
            if self.fail_commit {
                return Err(Error::Transaction("disk full".into()));
            }
            self.commits += 1;
            self.committed.append(&mut self.staged);
            Ok(())
        }

        fn rollback(&mut self) {
            self.open = false;
            self.staged.clear();
        }
    }

    fn wall(id: u64, x: f64) -> SurfaceCandidate {
        SurfaceCandidate::from_wall(
            SurfaceId::host(ElementId(id)),
            &WallSolid {
                start: Point3::new(x, -10.0, 0.0),
                end: Point3::new(x, 10.0, 0.0),
                thickness: 0.25,
                height: 3.0,
            },
        )
        .unwrap()
    }

    fn family() -> FamilyRef {
        FamilyRef {
            id: ElementId(500),
            name: "Opening".into(),
        }
    }

    #[test]
    fn places_one_opening_per_crossed_wall() {
        let walls = vec![wall(1, 2.0), wall(2, 6.0), wall(3, 20.0)];
        let caster = MeshRayCaster::new(&walls);
        let levels: LevelIndex = (1..=3)
            .map(|id| (SurfaceId::host(ElementId(id)), LevelId(1)))
            .collect();
        let placer = OpeningPlacer::new(&caster, &levels, family());

        let ducts = vec![Duct::round(
            ElementId(10),
            Point3::new(0.0, 0.0, 1.5),
            Point3::new(10.0, 0.0, 1.5),
            0.3,
        )];
        let mut creator = RecordingCreator::default();
        let report = placer.run(&ducts, &mut creator).unwrap();

        assert_eq!(report.ducts_processed, 1);
        assert_eq!(report.openings_placed(), 2);
        assert!(report.is_clean());
        assert_eq!(creator.commits, 1);
        assert!(creator
            .committed
            .iter()
            .all(|r| r.width == 0.3 && r.height == 0.3));
    }

    #[test]
    fn bad_duct_does_not_block_the_rest() {
        let walls = vec![wall(1, 2.0)];
        let caster = MeshRayCaster::new(&walls);
        let levels: LevelIndex = [(SurfaceId::host(ElementId(1)), LevelId(1))]
            .into_iter()
            .collect();
        let placer = OpeningPlacer::new(&caster, &levels, family());

        let p = Point3::new(0.0, 0.0, 1.0);
        let ducts = vec![
            Duct::round(ElementId(1), p, p, 0.3),
            Duct::round(ElementId(2), p, Point3::new(5.0, 0.0, 1.0), 0.0),
            Duct {
                id: ElementId(3),
                start: p,
                end: Point3::new(5.0, 0.0, 1.0),
                profile: DuctProfile::Rectangular {
                    width: 0.4,
                    height: 0.2,
                },
            },
            Duct::round(ElementId(4), p, Point3::new(5.0, 0.0, 1.0), 0.2),
        ];
        let mut creator = RecordingCreator::default();
        let report = placer.run(&ducts, &mut creator).unwrap();

        assert_eq!(report.ducts_processed, 4);
        assert_eq!(report.openings_placed(), 1);
        assert_eq!(report.placed[0].duct, ElementId(4));

        let reasons: Vec<_> = report.skipped_ducts.iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::InvalidSegment,
                SkipReason::InvalidDuctGeometry,
                SkipReason::UnsupportedProfile
            ]
        );
    }

    #[test]
    fn unresolved_host_skips_only_that_crossing() {
        let walls = vec![wall(1, 2.0), wall(2, 4.0)];
        let caster = MeshRayCaster::new(&walls);
        let levels: LevelIndex = [(SurfaceId::host(ElementId(2)), LevelId(1))]
            .into_iter()
            .collect();
        let placer = OpeningPlacer::new(&caster, &levels, family());

        let ducts = vec![Duct::round(
            ElementId(10),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(8.0, 0.0, 1.0),
            0.2,
        )];
        let mut creator = RecordingCreator::default();
        let report = placer.run(&ducts, &mut creator).unwrap();

        assert_eq!(report.openings_placed(), 1);
        assert_eq!(report.placed[0].wall, SurfaceId::host(ElementId(2)));
        assert_eq!(report.skipped_crossings.len(), 1);
        assert_eq!(report.skipped_crossings[0].reason, SkipReason::UnresolvedHost);
        assert!(report.skipped_ducts.is_empty());

        let summary = report.summary();
        assert_eq!(summary.reasons.get(&SkipReason::UnresolvedHost), Some(&1));
    }

    #[test]
    fn failed_commit_discards_the_ducts_openings() {
        let walls = vec![wall(1, 2.0)];
        let caster = MeshRayCaster::new(&walls);
        let levels: LevelIndex = [(SurfaceId::host(ElementId(1)), LevelId(1))]
            .into_iter()
            .collect();
        let placer = OpeningPlacer::new(&caster, &levels, family());

        let ducts = vec![Duct::round(
            ElementId(10),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(8.0, 0.0, 1.0),
            0.2,
        )];
        let mut creator = RecordingCreator {
            fail_commit: true,
            ..Default::default()
        };
        let report = placer.run(&ducts, &mut creator).unwrap();

        assert_eq!(report.openings_placed(), 0);
        assert_eq!(report.skipped_ducts[0].reason, SkipReason::TransactionFailed);
        assert!(creator.committed.is_empty());
    }

    #[test]
    fn duct_without_crossings_opens_no_unit_of_work() {
        let caster = MeshRayCaster::new(&[]);
        let levels = LevelIndex::new();
        let placer = OpeningPlacer::new(&caster, &levels, family());

        let ducts = vec![Duct::round(
            ElementId(10),
            Point3::origin(),
            Point3::new(8.0, 0.0, 0.0),
            0.2,
        )];
        let mut creator = RecordingCreator::default();
        let report = placer.run(&ducts, &mut creator).unwrap();

        assert_eq!(report.ducts_processed, 1);
        assert!(report.is_clean());
        assert_eq!(creator.commits, 0);
    }

    #[test]
    fn skip_reasons_follow_the_error_kind() {
        let segment = Error::Geometry(GeometryError::InvalidSegment("zero length".into()));
        assert_eq!(SkipReason::from_error(&segment), SkipReason::InvalidSegment);

        let surface = Error::Geometry(GeometryError::TriangulationError("flat".into()));
        assert_eq!(SkipReason::from_error(&surface), SkipReason::InvalidGeometry);

        let creation = Error::Creation("host refused".into());
        assert_eq!(SkipReason::from_error(&creation), SkipReason::CreationFailed);

        for err in [
            Error::FamilyNotFound("Отверстия".into()),
            Error::EmptySession,
            Error::ViewNotFound,
            Error::IdSpaceExhausted,
        ] {
            assert_eq!(SkipReason::from_error(&err), SkipReason::Unexpected);
        }
    }
}
