// Copyright © 2018 Cormac O'Brien
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Binary space partitioning tree (C4 data model).
//!
//! Nodes live in a flat arena (`Vec<BspNode>`) and reference each other by
//! index rather than by pointer, per Design Note §9: this sidesteps the
//! ownership ambiguity of a cyclic node/portal graph and keeps
//! `FreeTree_r`-style teardown implicit (drop the arena).

pub mod build;
pub mod split;

use cgmath::Vector3;

use crate::plane::PlaneIndex;
use crate::portal::{PortalGraph, PortalIndex};

pub type NodeIndex = usize;

/// Sentinel returned by the split-plane selector when no candidate
/// qualifies; the node becomes a leaf.
pub const NO_SPLIT_PLANE: i64 = -1;

#[derive(Clone, Debug)]
pub struct BspLeaf {
    /// -1 = unassigned, per `spec.md` §3.
    pub area: i32,
    pub opaque: bool,
    /// Flood-fill occupant id, if this leaf has been reached from an
    /// occupant.
    pub occupied: Option<u32>,
    /// Indices into the owning entity's `primitives` vec identifying the
    /// structural brushes whose volume intersects this leaf.
    pub brush_list: Vec<usize>,
    /// Head of the doubly-linked portal list through this leaf.
    pub portals: Option<PortalIndex>,
    /// Areaportal-flagged mesh triangles discovered in this leaf, used by
    /// `FloodAreas` to treat areaportal geometry as a boundary.
    pub area_portal_tris: Vec<usize>,
    /// Assigned by a deterministic post-order traversal after the tree is
    /// fully built (`spec.md` §5, "Ordering guarantees").
    pub node_number: usize,
}

impl BspLeaf {
    fn new() -> BspLeaf {
        BspLeaf {
            area: -1,
            opaque: false,
            occupied: None,
            brush_list: Vec::new(),
            portals: None,
            area_portal_tris: Vec::new(),
            node_number: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Interior {
        plane: PlaneIndex,
        children: [NodeIndex; 2],
    },
    Leaf(BspLeaf),
}

#[derive(Clone, Debug)]
pub struct BspNode {
    pub bounds: (Vector3<f32>, Vector3<f32>),
    pub kind: NodeKind,
}

impl BspNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn leaf(&self) -> Option<&BspLeaf> {
        match &self.kind {
            NodeKind::Leaf(l) => Some(l),
            _ => None,
        }
    }

    pub fn leaf_mut(&mut self) -> Option<&mut BspLeaf> {
        match &mut self.kind {
            NodeKind::Leaf(l) => Some(l),
            _ => None,
        }
    }
}

/// A face in the singly-linked input list consumed by `FaceBSP`
/// (`bspFace_t` in `spec.md` §4.2).
#[derive(Clone, Debug)]
pub struct BspFace {
    pub winding: crate::winding::Winding,
    pub plane: PlaneIndex,
    pub portal: bool,
    pub simple_bsp: bool,
    /// Index of the source brush/mesh primitive, carried through splits
    /// so downstream stages can recover content flags.
    pub source_primitive: usize,
}

/// Root node, world bounds, and portal graph for one entity's tree.
#[derive(Debug)]
pub struct BspTree {
    pub nodes: Vec<BspNode>,
    pub root: NodeIndex,
    pub bounds: (Vector3<f32>, Vector3<f32>),
    pub simple_bsp: bool,
    pub portals: PortalGraph,
    /// Synthetic opaque leaf outside the world bounds, shared by every
    /// outside-bounding portal (`spec.md` §4.4 step 1).
    pub outside: NodeIndex,
}

impl BspTree {
    pub fn node(&self, idx: NodeIndex) -> &BspNode {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> &mut BspNode {
        &mut self.nodes[idx]
    }

    pub fn is_leaf(&self, idx: NodeIndex) -> bool {
        self.nodes[idx].is_leaf()
    }

    /// Locates the leaf containing `point`.
    pub fn find_leaf(&self, planes: &crate::plane::PlaneRegistry, point: Vector3<f32>) -> NodeIndex {
        let mut cur = self.root;
        loop {
            match &self.nodes[cur].kind {
                NodeKind::Leaf(_) => return cur,
                NodeKind::Interior { plane, children } => {
                    let side = planes.get(*plane).point_side(point, 0.0);
                    let child = match side {
                        crate::plane::PlaneSide::Back => children[1],
                        _ => children[0],
                    };
                    cur = child;
                }
            }
        }
    }

    /// Assigns `node_number` to every leaf via deterministic post-order
    /// traversal, per the ordering guarantee in `spec.md` §5.
    pub fn number_leaves(&mut self) -> usize {
        let mut counter = 0;
        self.number_leaves_r(self.root, &mut counter);
        counter
    }

    fn number_leaves_r(&mut self, idx: NodeIndex, counter: &mut usize) {
        let children = match &self.nodes[idx].kind {
            NodeKind::Interior { children, .. } => Some(*children),
            NodeKind::Leaf(_) => None,
        };

        match children {
            Some([a, b]) => {
                self.number_leaves_r(a, counter);
                self.number_leaves_r(b, counter);
            }
            None => {
                if let NodeKind::Leaf(leaf) = &mut self.nodes[idx].kind {
                    leaf.node_number = *counter;
                    *counter += 1;
                }
            }
        }
    }

    /// Collects every leaf's node index via pre-order traversal (stable,
    /// deterministic w.r.t. tree structure).
    pub fn leaf_indices(&self) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        self.leaf_indices_r(self.root, &mut out);
        out
    }

    fn leaf_indices_r(&self, idx: NodeIndex, out: &mut Vec<NodeIndex>) {
        match &self.nodes[idx].kind {
            NodeKind::Leaf(_) => out.push(idx),
            NodeKind::Interior { children, .. } => {
                self.leaf_indices_r(children[0], out);
                self.leaf_indices_r(children[1], out);
            }
        }
    }
}

pub use self::build::face_bsp;
