//! Reconciles located report blocks against one part's node indexing.

use cae_model::{PartGeometry, ReportDiagnostic, ReportModel, Snapshot};
use nalgebra::Vector3;
use tracing::{debug, warn};

use super::format::ReportFormat;
use super::text::{HeaderBlock, ReportText, extract_value};
use crate::error::{ImportError, Result};

/// Builds the `times × nodes` displacement table. Every node and axis not
/// covered by a readable block stays exactly zero.
///
/// `diagnostics` carries what was already found while locating blocks and
/// reading times; block-level conditions found here are appended.
pub fn assemble(
    text: &ReportText,
    format: &ReportFormat,
    times: &[f64],
    blocks: &[HeaderBlock],
    part: &PartGeometry,
    mut diagnostics: Vec<ReportDiagnostic>,
) -> Result<ReportModel> {
    let node_count = part.positions().len();
    if node_count == 0 {
        return Err(ImportError::DegeneratePart(part.name().to_string()));
    }

    let limit = format.node_bound.limit(node_count);
    let mut table = vec![Vector3::<f64>::zeros(); times.len() * node_count];

    for block in blocks {
        if block.node >= limit {
            debug!(line = block.line(), node = block.node, limit, "report block out of range");
            diagnostics.push(ReportDiagnostic::OutOfRangeNode {
                line: block.line(),
                node: block.node,
                limit,
            });
            continue;
        }

        match block_values(text, format, block, times.len()) {
            Ok(values) => {
                for (step, value) in values.into_iter().enumerate() {
                    table[step * node_count + block.node][block.axis] = value;
                }
            }
            Err(diagnostic) => {
                warn!("{diagnostic}");
                diagnostics.push(diagnostic);
            }
        }
    }

    let snapshots = times
        .iter()
        .zip(table.chunks_exact(node_count))
        .map(|(&time, row)| Snapshot {
            time,
            displacements: row.to_vec(),
        })
        .collect();

    Ok(ReportModel::new(part.name(), snapshots, diagnostics))
}

/// Values of one block, one per time step at most. Either every row parses
/// or the block contributes nothing.
fn block_values(
    text: &ReportText,
    format: &ReportFormat,
    block: &HeaderBlock,
    steps: usize,
) -> std::result::Result<Vec<f64>, ReportDiagnostic> {
    text.data_rows(block.header, format)
        .take(steps)
        .map(|(index, row)| {
            extract_value(row).ok_or_else(|| ReportDiagnostic::MalformedBlock {
                line: index + 1,
                message: format!("unreadable value in `{row}`"),
            })
        })
        .collect()
}
