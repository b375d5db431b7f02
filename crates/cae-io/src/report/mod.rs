//! Transient displacement report importer.
//!
//! A report is a sequence of blocks, one per node and displacement
//! component. Each block has a header line (located with the configured
//! [`HeaderMarker`]) whose meta text names the node and the axis, followed
//! by `<time> <value>` rows up to a blank line:
//!
//! ```text
//!                                U:U2 PI: COIL-1
//!             X                          N: 3
//!
//!             0.                   0.
//!             1.                   1.5E-03
//! ```
//!
//! The time column of the first block is taken as the time axis for every
//! block. Blocks are then scattered into a `times × nodes` table aligned to
//! one part of the geometry.

pub mod assemble;
pub mod format;
pub mod text;

use std::path::Path;

use cae_model::{PartGeometry, ReportModel};
use tracing::info;

pub use assemble::assemble;
pub use format::{HeaderMarker, NodeBound, NodeIdLocation, ReportFormat};
pub use text::{HeaderBlock, HeaderLine, ReportText, extract_value};

use crate::error::{ImportError, Result};
use crate::progress::ProgressSink;

#[derive(Debug, Clone, Default)]
pub struct ReportImporter {
    format: ReportFormat,
}

impl ReportImporter {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &ReportFormat {
        &self.format
    }

    pub fn import_file(
        &self,
        path: impl AsRef<Path>,
        part: &PartGeometry,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<ReportModel> {
        let path = path.as_ref();
        if part.positions().is_empty() {
            return Err(ImportError::DegeneratePart(part.name().to_string()));
        }
        let text = ReportText::from_file(path, progress)?;
        let model = self.import_text(&text, part)?;
        info!(
            path = %path.display(),
            part = part.name(),
            steps = model.times().len(),
            diagnostics = model.diagnostics().len(),
            "report imported"
        );
        Ok(model)
    }

    pub fn import_str(&self, raw: &str, part: &PartGeometry) -> Result<ReportModel> {
        self.import_text(&ReportText::from_text(raw), part)
    }

    /// Locates the blocks, reads the time axis and assembles the table.
    pub fn import_text(&self, text: &ReportText, part: &PartGeometry) -> Result<ReportModel> {
        if part.positions().is_empty() {
            return Err(ImportError::DegeneratePart(part.name().to_string()));
        }

        let headers = text.find_headers(&self.format);
        let first = headers.first().ok_or_else(|| ImportError::Format {
            line: text.len(),
            message: "no report block header found".to_string(),
        })?;

        let (times, mut diagnostics) = text.read_times(first, &self.format)?;
        let (blocks, malformed) = text.header_blocks(&headers, &self.format);
        diagnostics.extend(malformed);

        assemble(text, &self.format, &times, &blocks, part, diagnostics)
    }
}
