// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory host model.
//!
//! A [`Session`] is the set of open documents. The first document is the
//! active (architectural) one that receives openings; the mechanical model
//! with the ducts is another open document, and walls may also come from
//! documents linked into the active one. Links share coordinates up to a
//! translation.

use std::collections::BTreeMap;

use duct_openings_geometry::{ElementId, LevelId, Point3, SurfaceId, Vector3, WallSolid};
use serde::{Deserialize, Serialize};

use crate::duct::Duct;
use crate::error::{Error, Result};

/// Levels of different documents match when their elevations agree this
/// closely.
pub const ELEVATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    pub name: String,
    #[serde(default)]
    pub elevation: f64,
}

/// Straight wall on a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: ElementId,
    pub level: LevelId,
    /// Baseline start; z is the wall base
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub thickness: f64,
    pub height: f64,
}

impl Wall {
    pub fn solid(&self) -> WallSolid {
        WallSolid {
            start: self.start,
            end: self.end,
            thickness: self.thickness,
            height: self.height,
        }
    }
}

/// Another document placed into this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkInstance {
    pub id: ElementId,
    /// Title of the linked document
    pub document: String,
    #[serde(default = "no_offset")]
    pub offset: Vector3<f64>,
}

fn no_offset() -> Vector3<f64> {
    Vector3::zeros()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySymbol {
    pub id: ElementId,
    pub family: String,
    pub category: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View3d {
    pub id: ElementId,
    pub name: String,
    #[serde(default)]
    pub is_template: bool,
    /// Elements (walls or link instances) hidden in this view
    #[serde(default)]
    pub hidden: Vec<ElementId>,
}

impl View3d {
    pub fn hides(&self, id: ElementId) -> bool {
        self.hidden.contains(&id)
    }
}

/// An inserted opening instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub id: ElementId,
    pub family: ElementId,
    pub host: SurfaceId,
    pub level: LevelId,
    pub point: Point3<f64>,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub links: Vec<LinkInstance>,
    #[serde(default)]
    pub ducts: Vec<Duct>,
    #[serde(default)]
    pub families: Vec<FamilySymbol>,
    #[serde(default)]
    pub views: Vec<View3d>,
    #[serde(default)]
    pub openings: Vec<Opening>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Level at `elevation`, within [`ELEVATION_TOLERANCE`].
    pub fn level_at_elevation(&self, elevation: f64) -> Option<&Level> {
        self.levels
            .iter()
            .find(|l| (l.elevation - elevation).abs() <= ELEVATION_TOLERANCE)
    }

    /// First id above every element id in use.
    pub fn next_element_id(&self) -> Result<ElementId> {
        let max = self
            .walls
            .iter()
            .map(|w| w.id)
            .chain(self.links.iter().map(|l| l.id))
            .chain(self.ducts.iter().map(|d| d.id))
            .chain(self.families.iter().map(|f| f.id))
            .chain(self.views.iter().map(|v| v.id))
            .chain(self.openings.iter().map(|o| o.id))
            .map(|id| id.0)
            .max()
            .unwrap_or(0);
        max.checked_add(1)
            .map(ElementId)
            .ok_or(Error::IdSpaceExhausted)
    }
}

/// All open documents; the first is the active one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub documents: Vec<Document>,
}

impl Session {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn document_by_title(&self, title: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.title == title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_element_id_skips_used_ids() {
        let mut doc = Document::new("AR");
        assert_eq!(doc.next_element_id().unwrap(), ElementId(1));

        doc.walls.push(Wall {
            id: ElementId(41),
            level: LevelId(1),
            start: Point3::origin(),
            end: Point3::new(1.0, 0.0, 0.0),
            thickness: 0.2,
            height: 3.0,
        });
        doc.views.push(View3d {
            id: ElementId(7),
            name: "{3D}".into(),
            is_template: false,
            hidden: Vec::new(),
        });
        assert_eq!(doc.next_element_id().unwrap(), ElementId(42));
    }

    #[test]
    fn exhausted_id_space_is_an_error() {
        let json = format!(
            r#"{{ "title": "AR", "views": [ {{ "id": {}, "name": "{{3D}}" }} ] }}"#,
            u64::MAX
        );
        let doc: Document = serde_json::from_str(&json).unwrap();
        assert!(matches!(doc.next_element_id(), Err(Error::IdSpaceExhausted)));
    }

    #[test]
    fn level_lookup_by_elevation() {
        let mut doc = Document::new("AR");
        doc.levels.push(Level {
            id: LevelId(1),
            name: "Level 1".into(),
            elevation: 0.0,
        });
        doc.levels.push(Level {
            id: LevelId(2),
            name: "Level 2".into(),
            elevation: 3.3,
        });

        assert_eq!(doc.level_at_elevation(3.3 + 1e-9).map(|l| l.id), Some(LevelId(2)));
        assert_eq!(doc.level_at_elevation(0.0).map(|l| l.id), Some(LevelId(1)));
        assert!(doc.level_at_elevation(1.5).is_none());
    }

    #[test]
    fn session_json_defaults() {
        let json = r#"{
            "documents": [
                { "title": "AR", "links": [ { "id": 3, "document": "KR" } ] }
            ]
        }"#;
        let session = Session::from_json(json).unwrap();
        let doc = &session.documents[0];
        assert!(doc.walls.is_empty());
        assert_eq!(doc.links[0].offset, Vector3::zeros());
        assert!(session.document_by_title("AR").is_some());
        assert!(session.document_by_title("KR").is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Session::from_json("{ \"documents\": 5 }").is_err());
    }
}
