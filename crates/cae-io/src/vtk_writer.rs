//! Legacy VTK writer for ParaView inspection.
//!
//! Writes one part in world space (moved positions) as an unstructured grid
//! of linear tetrahedra, optionally with one report snapshot attached as a
//! `displacement` point vector field.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cae_io::{GeometryImporter, VtkWriter};
//!
//! let import = GeometryImporter::import_file("coil.inp", None)?;
//! if let Some(part) = import.part("Coil") {
//!     VtkWriter::new(part).write_vtk("coil.vtk")?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use cae_model::{PartGeometry, Snapshot, Tetrahedron};

/// VTK cell type code of a linear tetrahedron.
const VTK_TETRA: u8 = 10;

pub struct VtkWriter<'a> {
    part: &'a PartGeometry,
    snapshot: Option<&'a Snapshot>,
}

impl<'a> VtkWriter<'a> {
    pub fn new(part: &'a PartGeometry) -> Self {
        Self { part, snapshot: None }
    }

    /// Attaches the displacements of one snapshot as point data. A snapshot
    /// whose length does not match the part is written without point data.
    pub fn with_snapshot(mut self, snapshot: &'a Snapshot) -> Self {
        self.snapshot = Some(snapshot);
        self
    }

    pub fn write_vtk<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.write_header(out)?;
        self.write_points(out)?;
        self.write_cells(out)?;
        self.write_point_data(out)
    }

    fn write_header<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "# vtk DataFile Version 3.0")?;
        writeln!(out, "{}", self.part.name())?;
        writeln!(out, "ASCII")?;
        writeln!(out, "DATASET UNSTRUCTURED_GRID")
    }

    fn write_points<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let points = self.part.moved_positions();
        writeln!(out, "POINTS {} double", points.len())?;
        for p in points {
            writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
        }
        Ok(())
    }

    fn write_cells<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let cells: Vec<&Tetrahedron> =
            self.part.elements().iter().filter(|t| !t.is_degenerate()).collect();

        writeln!(out, "CELLS {} {}", cells.len(), cells.len() * 5)?;
        for tet in &cells {
            let [a, b, c, d] = tet.nodes();
            writeln!(out, "4 {a} {b} {c} {d}")?;
        }

        writeln!(out, "CELL_TYPES {}", cells.len())?;
        for _ in &cells {
            writeln!(out, "{VTK_TETRA}")?;
        }
        Ok(())
    }

    fn write_point_data<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(snapshot) = self.snapshot else {
            return Ok(());
        };
        let count = self.part.moved_positions().len();
        if snapshot.displacements.len() != count {
            return Ok(());
        }

        writeln!(out, "POINT_DATA {count}")?;
        writeln!(out, "VECTORS displacement double")?;
        for d in &snapshot.displacements {
            writeln!(out, "{} {} {}", d.x, d.y, d.z)?;
        }
        Ok(())
    }
}
