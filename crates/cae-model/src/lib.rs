//! In-memory models produced by the geometry and report importers.
//!
//! - [`PartGeometry`]: one mesh part with reconciled node positions,
//!   tetrahedral connectivity, derived edges/faces and its rigid transform.
//! - [`ReportModel`]: a displacement time series aligned to one part's node
//!   indexing.

pub mod part;
pub mod report;
pub mod topology;

pub use cae_inp::SENTINEL_ID;
pub use part::{PartGeometry, RigidTransform};
pub use report::{ReportDiagnostic, ReportModel, Snapshot};
pub use topology::{Edge, Face, Tetrahedron, boundary_faces, extract_edges, extract_faces};
