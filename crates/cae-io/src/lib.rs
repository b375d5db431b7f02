//! Importers for CAE geometry decks and transient displacement reports.
//!
//! This crate provides:
//! - **Geometry import**: `*Part` / `*Instance` / `*Node` / `*Element` decks
//!   into [`PartGeometry`] values with derived edges, faces and world-space
//!   positions
//! - **Report import**: tabular displacement reports reconciled against one
//!   part's node indexing into a [`ReportModel`]
//! - **Progress reporting** through an optional [`ProgressSink`]
//! - **JSON export** of imported models, one asset file per part
//! - **VTK export** for inspecting a part (and one snapshot) in ParaView

pub mod error;
pub mod export;
pub mod geometry;
pub mod progress;
pub mod report;
pub mod vtk_writer;

pub use cae_model::{PartGeometry, ReportDiagnostic, ReportModel, RigidTransform, Snapshot};
pub use error::{ImportError, Result};
pub use export::{load_json, save_json, write_part_assets};
pub use geometry::{GeometryImport, GeometryImporter, PartGeometryBuilder};
pub use progress::{NoProgress, ProgressEvent, ProgressSink, RecordingProgress};
pub use report::{
    HeaderBlock, HeaderMarker, NodeBound, NodeIdLocation, ReportFormat, ReportImporter, ReportText,
};
pub use vtk_writer::VtkWriter;
