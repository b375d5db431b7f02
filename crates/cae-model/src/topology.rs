//! Edge and face extraction from tetrahedral connectivity.
//!
//! Edges and faces are stored in canonical (ascending) order, so the
//! derived `Eq`/`Hash` compare sub-entities by value and two tetrahedra
//! sharing a face produce equal keys regardless of winding.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use cae_inp::SENTINEL_ID;

/// Local vertex pairs of the six tetrahedron edges.
const EDGE_PATTERN: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// Faces are `(i, i+1, i+2)` over this cyclic sequence for `i in 0..4`.
const FACE_CYCLE: [usize; 6] = [0, 1, 2, 3, 0, 1];

/// Four-node tetrahedron with 0-based node ids; unset slots hold
/// [`SENTINEL_ID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tetrahedron(pub [i32; 4]);

impl Tetrahedron {
    pub const EMPTY: Tetrahedron = Tetrahedron([SENTINEL_ID; 4]);

    pub fn new(nodes: [i32; 4]) -> Self {
        Self(nodes)
    }

    pub fn nodes(&self) -> [i32; 4] {
        self.0
    }

    /// True when any slot holds the sentinel (or another negative id).
    pub fn is_degenerate(&self) -> bool {
        self.0.iter().any(|&n| n < 0)
    }

    fn corners(&self) -> Option<[u32; 4]> {
        let mut out = [0u32; 4];
        for (slot, &id) in out.iter_mut().zip(&self.0) {
            *slot = u32::try_from(id).ok()?;
        }
        Some(out)
    }

    /// The six canonical edges, or `None` for a degenerate tetrahedron.
    pub fn edges(&self) -> Option<[Edge; 6]> {
        let c = self.corners()?;
        Some(EDGE_PATTERN.map(|(a, b)| Edge::new(c[a], c[b])))
    }

    /// The four canonical faces, or `None` for a degenerate tetrahedron.
    pub fn faces(&self) -> Option<[Face; 4]> {
        let c = self.corners()?;
        Some([0, 1, 2, 3].map(|i| {
            Face::new(c[FACE_CYCLE[i]], c[FACE_CYCLE[i + 1]], c[FACE_CYCLE[i + 2]])
        }))
    }
}

impl Default for Tetrahedron {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Node pair with the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge([u32; 2]);

impl Edge {
    pub fn new(a: u32, b: u32) -> Self {
        if a <= b { Self([a, b]) } else { Self([b, a]) }
    }

    pub fn nodes(&self) -> [u32; 2] {
        self.0
    }
}

/// Node triple sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Face([u32; 3]);

impl Face {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        let mut ids = [a, b, c];
        ids.sort_unstable();
        Self(ids)
    }

    pub fn nodes(&self) -> [u32; 3] {
        self.0
    }
}

/// Deduplicated edges in first-occurrence order. Degenerate tetrahedra
/// contribute nothing.
pub fn extract_edges(elements: &[Tetrahedron]) -> Vec<Edge> {
    dedup_in_order(elements.iter().filter_map(Tetrahedron::edges).flatten())
}

/// Deduplicated faces in first-occurrence order. Degenerate tetrahedra
/// contribute nothing.
pub fn extract_faces(elements: &[Tetrahedron]) -> Vec<Face> {
    dedup_in_order(elements.iter().filter_map(Tetrahedron::faces).flatten())
}

/// Faces owned by exactly one tetrahedron, i.e. the outer surface.
pub fn boundary_faces(elements: &[Tetrahedron]) -> Vec<Face> {
    let mut counts: HashMap<Face, usize> = HashMap::new();
    let mut order = Vec::new();
    for face in elements.iter().filter_map(Tetrahedron::faces).flatten() {
        let count = counts.entry(face).or_insert(0);
        if *count == 0 {
            order.push(face);
        }
        *count += 1;
    }
    order.retain(|f| counts.get(f) == Some(&1));
    order
}

fn dedup_in_order<T: Copy + Eq + Hash>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item)).collect()
}
