//! Geometry deck importer.
//!
//! Walks a `*Part` / `*Instance` deck with a [`LineCursor`], hands every
//! node and element section to the [`PartGeometryBuilder`] of the part in
//! scope, and derives topology and world-space positions once the whole
//! file has been read.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cae_io::GeometryImporter;
//!
//! let import = GeometryImporter::import_file("coil.inp", None)?;
//! for part in import.parts() {
//!     println!("{}: {} nodes, {} edges", part.name(), part.node_count(), part.edges().len());
//! }
//! # Ok::<(), cae_io::ImportError>(())
//! ```

pub mod builder;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use cae_inp::{LineCursor, Record, classify};
use cae_model::PartGeometry;
use tracing::{debug, info, warn};

pub use builder::{PartGeometryBuilder, reconcile_elements, reconcile_positions};

use crate::error::{ImportError, Result};
use crate::progress::{Progress, ProgressSink};

const PHASE_UNIT: &str = "phase";

/// Named checkpoints reported to the progress sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ReadingLines,
    ReadingNodes,
    ReadingElements,
    ConstructingEdges,
    ConstructingFaces,
    ConstructingMovedPositions,
}

impl Phase {
    const COUNT: u64 = 6;

    fn index(self) -> u64 {
        self as u64
    }

    fn caption(self) -> &'static str {
        match self {
            Phase::ReadingLines => "reading lines",
            Phase::ReadingNodes => "reading nodes",
            Phase::ReadingElements => "reading elements",
            Phase::ConstructingEdges => "constructing edges",
            Phase::ConstructingFaces => "constructing faces",
            Phase::ConstructingMovedPositions => "constructing moved positions",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanState {
    Scanning,
    InPart(String),
    InInstance(String),
}

impl ScanState {
    fn current_part(&self) -> Option<&str> {
        match self {
            ScanState::Scanning => None,
            ScanState::InPart(name) | ScanState::InInstance(name) => Some(name),
        }
    }
}

/// Completed parts of one deck, keyed by part name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryImport {
    parts: BTreeMap<String, PartGeometry>,
}

impl GeometryImport {
    pub fn part(&self, name: &str) -> Option<&PartGeometry> {
        self.parts.get(name)
    }

    pub fn parts(&self) -> impl Iterator<Item = &PartGeometry> {
        self.parts.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn into_parts(self) -> BTreeMap<String, PartGeometry> {
        self.parts
    }
}

pub struct GeometryImporter<'p> {
    progress: Progress<'p>,
    state: ScanState,
    builders: Vec<PartGeometryBuilder>,
    index: BTreeMap<String, usize>,
}

impl<'p> GeometryImporter<'p> {
    fn new(progress: Option<&'p mut dyn ProgressSink>) -> Self {
        Self {
            progress: Progress::new(progress),
            state: ScanState::Scanning,
            builders: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn import_file(
        path: impl AsRef<Path>,
        progress: Option<&'p mut dyn ProgressSink>,
    ) -> Result<GeometryImport> {
        let path = path.as_ref();
        let mut importer = Self::new(progress);
        importer.phase(Phase::ReadingLines);
        let raw = fs::read_to_string(path).map_err(|e| ImportError::open(path, e))?;
        let import = importer.run(&raw)?;
        info!(path = %path.display(), parts = import.len(), "geometry imported");
        Ok(import)
    }

    pub fn import_str(
        raw: &str,
        progress: Option<&'p mut dyn ProgressSink>,
    ) -> Result<GeometryImport> {
        let mut importer = Self::new(progress);
        importer.phase(Phase::ReadingLines);
        importer.run(raw)
    }

    fn phase(&mut self, phase: Phase) {
        self.progress.report(phase.index(), Phase::COUNT, PHASE_UNIT, phase.caption());
    }

    fn run(mut self, raw: &str) -> Result<GeometryImport> {
        let mut cursor = LineCursor::new(raw);
        debug!(lines = cursor.len(), "scanning geometry deck");
        self.scan(&mut cursor)?;
        self.complete()
    }

    fn scan(&mut self, cursor: &mut LineCursor<'_>) -> Result<()> {
        while let Some(line) = cursor.advance() {
            let line_no = cursor.line_number();
            match classify(line, line_no)? {
                Record::Blank | Record::Comment | Record::Data(_) => {}
                Record::Part(header) => {
                    let name = header.require("name")?.to_string();
                    if self.index.contains_key(&name) {
                        return Err(ImportError::Format {
                            line: line_no,
                            message: format!("part `{name}` is declared twice"),
                        });
                    }
                    self.index.insert(name.clone(), self.builders.len());
                    self.builders.push(PartGeometryBuilder::new(name.clone()));
                    self.state = ScanState::InPart(name);
                }
                Record::Instance(header) => {
                    let name = header
                        .parameter("part")
                        .or_else(|| header.parameter("name"))
                        .filter(|v| !v.is_empty())
                        .ok_or_else(|| ImportError::MissingParameter {
                            line: line_no,
                            parameter: "part".to_string(),
                        })?
                        .to_string();
                    let builder = self.builder_mut(&name).ok_or_else(|| ImportError::UndefinedPart {
                        line: line_no,
                        name: name.clone(),
                    })?;
                    builder.read_transform(cursor)?;
                    self.state = ScanState::InInstance(name);
                }
                Record::NodeSection(_) => {
                    self.phase(Phase::ReadingNodes);
                    match self.current_builder() {
                        Some(builder) => {
                            let count = builder.read_nodes(cursor)?;
                            debug!(part = builder.name(), count, "read node section");
                        }
                        None => skip_orphan_section(cursor, "*Node", line_no),
                    }
                }
                Record::ElementSection(_) => {
                    self.phase(Phase::ReadingElements);
                    match self.current_builder() {
                        Some(builder) => {
                            let count = builder.read_elements(cursor)?;
                            debug!(part = builder.name(), count, "read element section");
                        }
                        None => skip_orphan_section(cursor, "*Element", line_no),
                    }
                }
                Record::Keyword(header) => {
                    if matches!(header.keyword.as_str(), "ENDPART" | "ENDINSTANCE") {
                        self.state = ScanState::Scanning;
                    }
                }
            }
        }
        Ok(())
    }

    fn builder_mut(&mut self, name: &str) -> Option<&mut PartGeometryBuilder> {
        let i = *self.index.get(name)?;
        self.builders.get_mut(i)
    }

    fn current_builder(&mut self) -> Option<&mut PartGeometryBuilder> {
        let name = self.state.current_part()?.to_string();
        self.builder_mut(&name)
    }

    /// Finishes every builder, then derives topology and moved positions.
    /// Any failure discards all parts.
    fn complete(mut self) -> Result<GeometryImport> {
        let mut parts = std::mem::take(&mut self.builders)
            .into_iter()
            .map(PartGeometryBuilder::finish)
            .collect::<Result<Vec<_>>>()?;

        self.phase(Phase::ConstructingEdges);
        for part in parts.iter_mut().filter(|p| !p.is_degenerate()) {
            part.construct_edges();
        }
        self.phase(Phase::ConstructingFaces);
        for part in parts.iter_mut().filter(|p| !p.is_degenerate()) {
            part.construct_faces();
        }
        self.phase(Phase::ConstructingMovedPositions);
        for part in &mut parts {
            part.construct_moved_positions();
            if part.is_degenerate() {
                warn!(part = part.name(), "part has no nodes");
            }
        }

        Ok(GeometryImport {
            parts: parts.into_iter().map(|p| (p.name().to_string(), p)).collect(),
        })
    }
}

fn skip_orphan_section(cursor: &mut LineCursor<'_>, keyword: &str, line_no: usize) {
    let skipped = cursor.skip_section();
    warn!(line = line_no, skipped, "{keyword} section outside any part, skipped");
}
