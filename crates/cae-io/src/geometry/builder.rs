//! Accumulates one part's nodes, elements and placement while its scopes
//! are scanned, then materializes a dense [`PartGeometry`].

use std::collections::BTreeMap;

use cae_inp::{LineCursor, SENTINEL_ID, parse_element_line, parse_float_row, parse_node_line};
use cae_model::{PartGeometry, RigidTransform, Tetrahedron};
use nalgebra::{Point3, Vector3};
use tracing::warn;

use crate::error::{ImportError, Result};

#[derive(Debug, Clone)]
pub struct PartGeometryBuilder {
    name: String,
    nodes: BTreeMap<usize, Vector3<f64>>,
    elements: BTreeMap<usize, [i32; 4]>,
    /// Source line of the latest definition of each element.
    element_lines: BTreeMap<usize, usize>,
    transform: RigidTransform,
}

impl PartGeometryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: BTreeMap::new(),
            elements: BTreeMap::new(),
            element_lines: BTreeMap::new(),
            transform: RigidTransform::identity(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn transform(&self) -> &RigidTransform {
        &self.transform
    }

    /// Reads `id, x, y, z` lines until the section ends. Returns the number
    /// of lines read. A repeated id overwrites the earlier position.
    pub fn read_nodes(&mut self, cursor: &mut LineCursor<'_>) -> Result<usize> {
        let mut count = 0;
        while let Some((line_no, line)) = cursor.next_payload() {
            let node = parse_node_line(line, line_no)?;
            self.nodes.insert(node.index, Vector3::from(node.coords));
            count += 1;
        }
        Ok(count)
    }

    /// Reads `id, n0, n1, n2, n3` lines until the section ends. A repeated
    /// element id overwrites the earlier connectivity.
    pub fn read_elements(&mut self, cursor: &mut LineCursor<'_>) -> Result<usize> {
        let mut count = 0;
        while let Some((line_no, line)) = cursor.next_payload() {
            let element = parse_element_line(line, line_no)?;
            self.elements.insert(element.index, element.nodes);
            self.element_lines.insert(element.index, line_no);
            count += 1;
        }
        Ok(count)
    }

    /// Reads the optional placement lines directly after an `*Instance`
    /// header: a translation row of 3 values, then a rotation row of 7
    /// (anchor `a`, anchor `b`, angle in degrees).
    pub fn read_transform(&mut self, cursor: &mut LineCursor<'_>) -> Result<()> {
        if let Some((line_no, line)) = cursor.next_payload() {
            let t = parse_float_row(line, line_no, 3)?;
            self.transform.translation = Vector3::new(t[0], t[1], t[2]);
        }
        if let Some((line_no, line)) = cursor.next_payload() {
            let r = parse_float_row(line, line_no, 7)?;
            self.transform.rotation = RigidTransform::rotation_about(
                Point3::new(r[0], r[1], r[2]),
                Point3::new(r[3], r[4], r[5]),
                r[6],
            );
        }
        Ok(())
    }

    /// Materializes the dense part. Topology and moved positions are left to
    /// the caller, which derives them once every part is complete.
    ///
    /// A part without nodes comes out degenerate: its elements are dropped
    /// so that no element refers past the (empty) position array.
    pub fn finish(self) -> Result<PartGeometry> {
        if self.nodes.is_empty() {
            if !self.elements.is_empty() {
                warn!(
                    part = %self.name,
                    elements = self.elements.len(),
                    "part has no nodes, elements dropped"
                );
            }
            return Ok(PartGeometry::empty(self.name).with_transform(self.transform));
        }

        let positions = reconcile_positions(&self.nodes)?;

        for (&id, nodes) in &self.elements {
            let dangling = nodes
                .iter()
                .copied()
                .find(|&n| n != SENTINEL_ID && (n < 0 || n as usize >= positions.len()));
            if let Some(node) = dangling {
                return Err(ImportError::Format {
                    line: self.element_lines.get(&id).copied().unwrap_or_default(),
                    message: format!(
                        "part `{}`: element {} references undefined node {}",
                        self.name,
                        id + 1,
                        i64::from(node) + 1
                    ),
                });
            }
        }

        let elements = reconcile_elements(&self.elements)?;
        Ok(PartGeometry::new(self.name, positions, elements).with_transform(self.transform))
    }
}

/// Dense positions indexed by 0-based node id.
///
/// When the ids already cover `0..=max` the positions are taken in id order
/// as they are; otherwise a zero-filled array of `max + 1` slots is
/// allocated and every position scattered to its id.
pub fn reconcile_positions(nodes: &BTreeMap<usize, Vector3<f64>>) -> Result<Vec<Vector3<f64>>> {
    let Some((&max_id, _)) = nodes.last_key_value() else {
        return Ok(Vec::new());
    };
    if nodes.len() == max_id + 1 {
        return Ok(nodes.values().copied().collect());
    }

    let mut positions = dense_slots(max_id + 1, "node")?;
    positions.resize(max_id + 1, Vector3::zeros());
    for (&id, p) in nodes {
        positions[id] = *p;
    }
    Ok(positions)
}

/// Dense tetrahedra indexed by 0-based element id; unreferenced slots hold
/// the sentinel tetrahedron.
pub fn reconcile_elements(elements: &BTreeMap<usize, [i32; 4]>) -> Result<Vec<Tetrahedron>> {
    let Some((&max_id, _)) = elements.last_key_value() else {
        return Ok(Vec::new());
    };
    let mut out = dense_slots(max_id + 1, "element")?;
    out.resize(max_id + 1, Tetrahedron::EMPTY);
    for (&id, nodes) in elements {
        out[id] = Tetrahedron::new(*nodes);
    }
    Ok(out)
}

/// Empty vector with room for `len` slots; sizes come from ids in the deck.
fn dense_slots<T>(len: usize, kind: &'static str) -> Result<Vec<T>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(len)
        .map_err(|_| ImportError::Capacity { kind, slots: len })?;
    Ok(slots)
}
