// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Duct Openings Processing
//!
//! Places an opening wherever a round duct of the mechanical model passes
//! through a wall of the architectural model.
//!
//! ```no_run
//! use duct_openings_processing::{Config, Session};
//!
//! let json = std::fs::read_to_string("session.json").unwrap();
//! let mut session = Session::from_json(&json).unwrap();
//! let report = session.run(&Config::from_env()).unwrap();
//! println!("{}", report.summary());
//! ```
//!
//! The pieces are usable on their own: [`planner::plan`] turns a crossing
//! into a [`PlacementRequest`], and [`OpeningPlacer`] drives any
//! [`OpeningCreator`] from any ray caster.

pub mod config;
pub mod duct;
pub mod error;
pub mod host;
pub mod model;
pub mod pipeline;
pub mod planner;
pub mod session;

pub use config::Config;
pub use duct::{Duct, DuctProfile};
pub use error::{Error, Result};
pub use host::{
    CandidateSupplier, FamilyRef, LevelIndex, LevelResolver, OpeningCreator, OpeningHandle,
};
pub use model::{Document, FamilySymbol, Level, LinkInstance, Opening, Session, View3d, Wall};
pub use pipeline::{
    DuctPlan, OpeningPlacer, PlacedOpening, ReportSummary, RunReport, SkipReason,
    SkippedCrossing, SkippedDuct,
};
pub use planner::{plan, PlacementRequest};
pub use session::{DocumentEditor, RunContext, SceneCandidates};
