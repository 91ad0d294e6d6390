// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Running the placement command against an in-memory [`Session`].
//!
//! [`Session::prepare`] checks the run preconditions, [`SceneCandidates`]
//! and [`Session::level_index`] provide the read side, and
//! [`DocumentEditor`] writes openings into the active document.

use std::collections::BTreeMap;

use duct_openings_geometry::{ElementId, MeshRayCaster, SurfaceCandidate, SurfaceId};

use crate::config::Config;
use crate::duct::Duct;
use crate::error::{Error, Result};
use crate::host::{CandidateSupplier, FamilyRef, LevelIndex, OpeningCreator, OpeningHandle};
use crate::model::{Document, Opening, Session};
use crate::pipeline::{OpeningPlacer, RunReport};
use crate::planner::PlacementRequest;

/// Resolved inputs of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Index of the architectural (active) document
    pub architectural: usize,
    /// Index of the mechanical document holding the ducts
    pub mechanical: usize,
    pub family: FamilyRef,
    /// The 3D view whose visibility decides which walls count
    pub view: ElementId,
}

impl Session {
    /// Check the preconditions of a run, in order: mechanical model,
    /// opening family, 3D view.
    pub fn prepare(&self, config: &Config) -> Result<RunContext> {
        let architectural = 0;
        let active = self.documents.first().ok_or(Error::EmptySession)?;

        let mechanical = self
            .documents
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, doc)| doc.title.contains(&config.mechanical_model_marker))
            .map(|(index, _)| index)
            .ok_or_else(|| Error::MechanicalModelNotFound(config.mechanical_model_marker.clone()))?;

        let family = active
            .families
            .iter()
            .find(|f| {
                f.family == config.opening_family_name && f.category == config.opening_category
            })
            .map(|f| FamilyRef {
                id: f.id,
                name: f.family.clone(),
            })
            .ok_or_else(|| Error::FamilyNotFound(config.opening_family_name.clone()))?;

        let view = active
            .views
            .iter()
            .find(|v| !v.is_template)
            .map(|v| v.id)
            .ok_or(Error::ViewNotFound)?;

        tracing::info!(
            architectural = %active.title,
            mechanical = %self.documents[mechanical].title,
            family = %family.name,
            view = %view,
            "Run preconditions satisfied"
        );

        Ok(RunContext {
            architectural,
            mechanical,
            family,
            view,
        })
    }

    /// Ducts of the mechanical document.
    pub fn ducts(&self, ctx: &RunContext) -> &[Duct] {
        &self.documents[ctx.mechanical].ducts
    }

    /// Wall-to-level table for host and linked walls.
    ///
    /// Every wall resolves to a level of the active document. A host wall
    /// keeps its own level when that level exists. A linked wall maps to the
    /// active level at the elevation of its linked level, shifted by the link
    /// offset.
    pub fn level_index(&self, ctx: &RunContext) -> LevelIndex {
        let active = &self.documents[ctx.architectural];
        let mut index = LevelIndex::new();

        for wall in &active.walls {
            if active.level(wall.level).is_some() {
                index.insert(SurfaceId::host(wall.id), wall.level);
            }
        }

        for link in &active.links {
            let Some(linked) = self.document_by_title(&link.document) else {
                continue;
            };
            for wall in &linked.walls {
                let Some(linked_level) = linked.level(wall.level) else {
                    continue;
                };
                let elevation = linked_level.elevation + link.offset.z;
                match active.level_at_elevation(elevation) {
                    Some(level) => {
                        index.insert(SurfaceId::linked(link.id, wall.id), level.id);
                    }
                    None => tracing::debug!(
                        wall = %SurfaceId::linked(link.id, wall.id),
                        elevation,
                        "No level at linked wall elevation"
                    ),
                }
            }
        }

        index
    }

    /// Editor writing openings into the architectural document.
    pub fn editor<'a>(
        &'a mut self,
        ctx: &RunContext,
        config: &'a Config,
    ) -> Result<DocumentEditor<'a>> {
        DocumentEditor::new(&mut self.documents[ctx.architectural], config)
    }

    /// Run the whole command: preconditions, crossing detection, placement.
    pub fn run(&mut self, config: &Config) -> Result<RunReport> {
        let ctx = self.prepare(config)?;

        let candidates = SceneCandidates::new(self, &ctx).candidates();
        let levels = self.level_index(&ctx);
        let ducts = self.ducts(&ctx).to_vec();
        tracing::info!(
            walls = candidates.len(),
            ducts = ducts.len(),
            "Loaded model"
        );

        let caster = MeshRayCaster::new(&candidates);
        let placer = OpeningPlacer::new(&caster, &levels, ctx.family.clone());
        let mut editor = self.editor(&ctx, config)?;
        placer.run(&ducts, &mut editor)
    }
}

/// Walls visible in the run's 3D view, from the active document and every
/// linked document.
pub struct SceneCandidates<'a> {
    session: &'a Session,
    ctx: &'a RunContext,
}

impl<'a> SceneCandidates<'a> {
    pub fn new(session: &'a Session, ctx: &'a RunContext) -> Self {
        Self { session, ctx }
    }

    fn is_hidden(&self, id: ElementId) -> bool {
        self.session.documents[self.ctx.architectural]
            .views
            .iter()
            .find(|v| v.id == self.ctx.view)
            .is_some_and(|v| v.hides(id))
    }
}

impl CandidateSupplier for SceneCandidates<'_> {
    fn candidates(&self) -> Vec<SurfaceCandidate> {
        let active = &self.session.documents[self.ctx.architectural];
        let mut candidates = Vec::with_capacity(active.walls.len());

        for wall in &active.walls {
            if self.is_hidden(wall.id) {
                continue;
            }
            match SurfaceCandidate::from_wall(SurfaceId::host(wall.id), &wall.solid()) {
                Ok(candidate) => candidates.push(candidate),
                Err(err) => tracing::warn!(wall = %wall.id, error = %err, "Ignoring wall"),
            }
        }

        for link in &active.links {
            if self.is_hidden(link.id) {
                continue;
            }
            let Some(linked) = self.session.document_by_title(&link.document) else {
                tracing::warn!(link = %link.id, document = %link.document, "Linked document is not open");
                continue;
            };

            for wall in &linked.walls {
                let id = SurfaceId::linked(link.id, wall.id);
                match SurfaceCandidate::from_wall(id, &wall.solid()) {
                    Ok(candidate) => candidates.push(candidate.translated(&link.offset)),
                    Err(err) => tracing::warn!(wall = %id, error = %err, "Ignoring linked wall"),
                }
            }
        }

        candidates
    }
}

/// Unit-of-work editor over a [`Document`].
///
/// Openings created inside a unit of work are staged and only become part
/// of the document on commit.
pub struct DocumentEditor<'a> {
    document: &'a mut Document,
    config: &'a Config,
    transaction: Option<String>,
    staged: Vec<Opening>,
    /// `None` once the id space is used up
    next_id: Option<u64>,
}

impl<'a> DocumentEditor<'a> {
    pub fn new(document: &'a mut Document, config: &'a Config) -> Result<Self> {
        let next_id = document.next_element_id()?.0;
        Ok(Self {
            document,
            config,
            transaction: None,
            staged: Vec::new(),
            next_id: Some(next_id),
        })
    }

    pub fn staged_count(&self) -> usize {
        self.staged.len()
    }
}

impl OpeningCreator for DocumentEditor<'_> {
    fn activate_family(&mut self, family: &FamilyRef) -> Result<()> {
        let symbol = self
            .document
            .families
            .iter_mut()
            .find(|f| f.id == family.id)
            .ok_or_else(|| Error::FamilyNotFound(family.name.clone()))?;
        if !symbol.active {
            symbol.active = true;
            tracing::debug!(family = %family.name, "Activated family symbol");
        }
        Ok(())
    }

    fn begin(&mut self, name: &str) -> Result<()> {
        if let Some(open) = &self.transaction {
            return Err(Error::Transaction(format!(
                "cannot start '{}' while '{}' is open",
                name, open
            )));
        }
        self.transaction = Some(name.to_string());
        Ok(())
    }

    fn create_opening(
        &mut self,
        request: &PlacementRequest,
        family: &FamilyRef,
    ) -> Result<OpeningHandle> {
        if self.transaction.is_none() {
            return Err(Error::Transaction("no open transaction".into()));
        }

        let active = self
            .document
            .families
            .iter()
            .any(|f| f.id == family.id && f.active);
        if !active {
            return Err(Error::Creation(format!(
                "family '{}' is not active",
                family.name
            )));
        }

        let id = self.next_id.ok_or(Error::IdSpaceExhausted)?;
        self.next_id = id.checked_add(1);
        let id = ElementId(id);

        let parameters = BTreeMap::from([
            (self.config.width_parameter.clone(), request.width),
            (self.config.height_parameter.clone(), request.height),
        ]);
        self.staged.push(Opening {
            id,
            family: family.id,
            host: request.host_wall,
            level: request.host_level,
            point: request.insertion_point,
            parameters,
        });

        Ok(OpeningHandle(id))
    }

    fn commit(&mut self) -> Result<()> {
        if self.transaction.take().is_none() {
            return Err(Error::Transaction("commit without open transaction".into()));
        }
        self.document.openings.append(&mut self.staged);
        Ok(())
    }

    fn rollback(&mut self) {
        self.transaction = None;
        self.staged.clear();
    }
}
