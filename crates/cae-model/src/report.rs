//! Displacement time series aligned to one part's node indexing.

use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Displacements of every node at one time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: f64,
    /// One vector per node index of the part; unreported nodes are zero.
    pub displacements: Vec<Vector3<f64>>,
}

/// Recoverable condition met while reading a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportDiagnostic {
    /// A block for a node index at or beyond `limit` (typically a mid-edge
    /// node of a higher-order element). The block was skipped.
    OutOfRangeNode { line: usize, node: usize, limit: usize },
    /// `times[index]` is not greater than `times[index - 1]`.
    NonMonotonicTime { index: usize, previous: f64, current: f64 },
    /// A header annotation or data row could not be read. The block was
    /// skipped.
    MalformedBlock { line: usize, message: String },
}

impl fmt::Display for ReportDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportDiagnostic::OutOfRangeNode { line, node, limit } => write!(
                f,
                "line {line}: node index {node} outside range 0..{limit}, block skipped"
            ),
            ReportDiagnostic::NonMonotonicTime { index, previous, current } => write!(
                f,
                "time step {index}: {current} does not follow {previous}"
            ),
            ReportDiagnostic::MalformedBlock { line, message } => {
                write!(f, "line {line}: {message}, block skipped")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportModel {
    part_name: String,
    times: Vec<f64>,
    snapshots: Vec<Snapshot>,
    diagnostics: Vec<ReportDiagnostic>,
}

impl ReportModel {
    /// `times` is taken from the snapshots, so both always have the same
    /// length.
    pub fn new(
        part_name: impl Into<String>,
        snapshots: Vec<Snapshot>,
        diagnostics: Vec<ReportDiagnostic>,
    ) -> Self {
        Self {
            part_name: part_name.into(),
            times: snapshots.iter().map(|s| s.time).collect(),
            snapshots,
            diagnostics,
        }
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn diagnostics(&self) -> &[ReportDiagnostic] {
        &self.diagnostics
    }

    /// Number of nodes per snapshot.
    pub fn node_count(&self) -> usize {
        self.snapshots.first().map_or(0, |s| s.displacements.len())
    }

    /// Displacement history of one node, `None` when any snapshot lacks it.
    pub fn history(&self, node: usize) -> Option<Vec<Vector3<f64>>> {
        if self.snapshots.is_empty() {
            return None;
        }
        self.snapshots
            .iter()
            .map(|s| s.displacements.get(node).copied())
            .collect()
    }

    /// Largest displacement magnitude over all nodes and times.
    pub fn max_magnitude(&self) -> f64 {
        self.snapshots
            .iter()
            .flat_map(|s| s.displacements.iter())
            .map(|d| d.norm())
            .fold(0.0, f64::max)
    }
}
