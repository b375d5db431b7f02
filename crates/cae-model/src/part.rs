//! Mesh part with reconciled node positions and a rigid placement.

use nalgebra::{Point3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::topology::{Edge, Face, Tetrahedron, extract_edges, extract_faces};

/// Translation followed by a rotation about the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Rotation of `angle_deg` degrees about the axis `b - a`. A zero-length
    /// axis gives the identity rotation.
    pub fn rotation_about(a: Point3<f64>, b: Point3<f64>, angle_deg: f64) -> UnitQuaternion<f64> {
        match Unit::try_new(b - a, f64::EPSILON) {
            Some(axis) => UnitQuaternion::from_axis_angle(&axis, angle_deg.to_radians()),
            None => UnitQuaternion::identity(),
        }
    }

    /// `rotation * (p + translation)`
    pub fn apply(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * (p + self.translation)
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// One named mesh part.
///
/// `positions` is dense: slot `i` holds node `i` (0-based), and ids missing
/// from the source are zero vectors. `moved_positions` always reflects the
/// current positions and transform; every mutator recomputes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartGeometry {
    name: String,
    positions: Vec<Vector3<f64>>,
    moved_positions: Vec<Vector3<f64>>,
    elements: Vec<Tetrahedron>,
    edges: Vec<Edge>,
    faces: Vec<Face>,
    transform: RigidTransform,
}

impl PartGeometry {
    /// Callers guarantee that every element id is the sentinel or
    /// `< positions.len()`.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vector3<f64>>,
        elements: Vec<Tetrahedron>,
    ) -> Self {
        let mut part = Self {
            name: name.into(),
            moved_positions: Vec::new(),
            positions,
            elements,
            edges: Vec::new(),
            faces: Vec::new(),
            transform: RigidTransform::identity(),
        };
        part.construct_moved_positions();
        part
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn moved_positions(&self) -> &[Vector3<f64>] {
        &self.moved_positions
    }

    pub fn elements(&self) -> &[Tetrahedron] {
        &self.elements
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn transform(&self) -> &RigidTransform {
        &self.transform
    }

    pub fn translate(&self) -> Vector3<f64> {
        self.transform.translation
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.transform.rotation
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// Highest 0-based node id, `None` for a part without nodes.
    pub fn max_node_id(&self) -> Option<usize> {
        self.positions.len().checked_sub(1)
    }

    pub fn max_element_id(&self) -> Option<usize> {
        self.elements.len().checked_sub(1)
    }

    /// A part without nodes; topology and report assembly skip it.
    pub fn is_degenerate(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn set_transform(&mut self, transform: RigidTransform) {
        self.transform = transform;
        self.construct_moved_positions();
    }

    pub fn with_transform(mut self, transform: RigidTransform) -> Self {
        self.set_transform(transform);
        self
    }

    pub fn construct_edges(&mut self) {
        self.edges = extract_edges(&self.elements);
    }

    pub fn construct_faces(&mut self) {
        self.faces = extract_faces(&self.elements);
    }

    pub fn construct_topology(&mut self) {
        self.construct_edges();
        self.construct_faces();
    }

    /// Recomputes world-space positions from the current state.
    pub fn construct_moved_positions(&mut self) {
        let transform = self.transform;
        self.moved_positions = self.positions.iter().map(|p| transform.apply(p)).collect();
    }

    /// Flat `[a0, b0, a1, b1, ...]` buffer for line rendering.
    pub fn line_indices(&self) -> Vec<u32> {
        self.edges.iter().flat_map(|e| e.nodes()).collect()
    }

    /// Flat triangle index buffer over `faces`. Winding is not consistent.
    pub fn triangle_indices(&self) -> Vec<u32> {
        self.faces.iter().flat_map(|f| f.nodes()).collect()
    }
}
