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

//! Portalization (C6): a doubly-linked, arena-indexed graph of convex
//! portals between leaves, built by clipping each node's splitting plane
//! against the half-spaces of its ancestors.

use cgmath::Vector3;

use crate::bsp::{BspTree, NodeIndex, NodeKind};
use crate::math::CLIP_EPSILON;
use crate::plane::{PlaneIndex, PlaneRegistry};
use crate::winding::Winding;

pub type PortalIndex = usize;

/// A convex polygon shared by exactly two leaves (or a leaf and the
/// synthetic outside leaf).
#[derive(Clone, Debug)]
pub struct Portal {
    pub winding: Winding,
    pub plane: PlaneIndex,
    /// The two leaves this portal separates. `nodes[0]` is on the front
    /// side of `plane`, `nodes[1]` on the back side.
    pub nodes: [NodeIndex; 2],
    /// Intrusive doubly-linked list links, one per side, through each of
    /// `nodes`' own portal chains.
    pub next: [Option<PortalIndex>; 2],
}

impl Portal {
    /// The leaf on the opposite side of this portal from `from`.
    pub fn other_side(&self, from: NodeIndex) -> NodeIndex {
        if self.nodes[0] == from {
            self.nodes[1]
        } else {
            self.nodes[0]
        }
    }

    fn side_index(&self, node: NodeIndex) -> usize {
        if self.nodes[0] == node {
            0
        } else {
            1
        }
    }
}

/// Owns every portal for one entity's tree and the per-leaf linked lists
/// threading through them.
#[derive(Debug, Default)]
pub struct PortalGraph {
    portals: Vec<Portal>,
}

impl PortalGraph {
    pub fn new() -> PortalGraph {
        PortalGraph {
            portals: Vec::new(),
        }
    }

    pub fn get(&self, idx: PortalIndex) -> &Portal {
        &self.portals[idx]
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    /// Iterates the portals threaded through `leaf`'s chain, starting at
    /// `head`. `leaf` seeds the walk directly rather than being guessed
    /// from the head portal's `nodes[0]` — a leaf sitting on the back side
    /// of its head portal would otherwise have its side misidentified and
    /// the walk would follow the neighbour's chain instead of its own.
    pub fn iter_leaf(&self, leaf: NodeIndex, head: Option<PortalIndex>) -> LeafPortalIter<'_> {
        LeafPortalIter {
            graph: self,
            cur: head,
            leaf,
        }
    }

    /// Allocates a portal with no endpoints yet; the caller must `attach`
    /// it before it participates in any chain.
    fn new_portal(&mut self, winding: Winding, plane: PlaneIndex) -> PortalIndex {
        let idx = self.portals.len();
        self.portals.push(Portal {
            winding,
            plane,
            nodes: [NodeIndex::max_value(), NodeIndex::max_value()],
            next: [None, None],
        });
        idx
    }

    /// Links `idx` between `a` and `b`, threading it onto the head of each
    /// node's chain (`chain[node]` tracks each node's current chain head
    /// during tree descent, separately from the final `BspLeaf::portals`
    /// field it gets copied into once a node resolves to a leaf).
    fn attach(&mut self, idx: PortalIndex, a: NodeIndex, b: NodeIndex, chain: &mut [Option<PortalIndex>]) {
        let next = [chain[a], chain[b]];
        let portal = &mut self.portals[idx];
        portal.nodes = [a, b];
        portal.next = next;
        chain[a] = Some(idx);
        chain[b] = Some(idx);
    }

    /// Unlinks `idx` from `node`'s chain, scanning from `chain[node]` the
    /// way `facebsp.cpp`'s `RemovePortalFromNode` does (no previous
    /// pointers are kept, so removal is a linear search down the list).
    fn detach(&mut self, idx: PortalIndex, node: NodeIndex, chain: &mut [Option<PortalIndex>]) {
        let mut prev: Option<(PortalIndex, usize)> = None;
        let mut cur = chain[node];
        loop {
            let cur_idx = cur.expect("portal not linked to node");
            if cur_idx == idx {
                break;
            }
            let side = self.portals[cur_idx].side_index(node);
            prev = Some((cur_idx, side));
            cur = self.portals[cur_idx].next[side];
        }

        let side = self.portals[idx].side_index(node);
        let after = self.portals[idx].next[side];
        match prev {
            Some((p_idx, p_side)) => self.portals[p_idx].next[p_side] = after,
            None => chain[node] = after,
        }
    }

    pub fn all_indices(&self) -> impl Iterator<Item = PortalIndex> + '_ {
        0..self.portals.len()
    }
}

pub struct LeafPortalIter<'a> {
    graph: &'a PortalGraph,
    cur: Option<PortalIndex>,
    leaf: NodeIndex,
}

impl<'a> Iterator for LeafPortalIter<'a> {
    type Item = PortalIndex;

    fn next(&mut self) -> Option<PortalIndex> {
        let idx = self.cur?;
        let portal = &self.graph.portals[idx];
        let side = portal.side_index(self.leaf);
        self.cur = portal.next[side];
        Some(idx)
    }
}

/// Whether a flood (occupancy or area) may pass through a portal between
/// two leaves, given `opaque` classification of the far leaf.
pub fn passable(tree: &BspTree, portal: &Portal, from: NodeIndex) -> bool {
    let other = portal.other_side(from);
    match tree.node(other).leaf() {
        Some(leaf) => !leaf.opaque,
        None => false,
    }
}

/// Builds the full portal graph for `tree` (`MakeTreePortals` in
/// `spec.md` §4.4). Mirrors `facebsp.cpp`'s three-step algorithm:
///
/// 1. `MakeHeadnodePortals` — six huge portals bounding the whole tree,
///    between the synthetic outside leaf and the root.
/// 2. `MakeNodePortal` — at each interior node, build the portal for its
///    own splitting plane by clipping a huge winding against every portal
///    already bounding that node's volume (inherited from its ancestors).
/// 3. `SplitNodePortals` — cut every portal currently bounding a node by
///    that node's plane, re-threading each fragment onto whichever child
///    it now borders. Without this step a portal's endpoint stays the
///    interior node itself rather than descending to the actual leaves on
///    either side, and `passable()` can never find the leaf-level
///    neighbours two non-sibling leaves need to flood through each other.
///
/// `chain[node]` tracks each node's current bounding-portal chain head
/// during the descent; once a node resolves to a leaf its final chain is
/// copied into `BspLeaf::portals`.
pub fn make_tree_portals(tree: &mut BspTree, planes: &mut PlaneRegistry) {
    let mut graph = PortalGraph::new();
    let node_count = tree.nodes.len();
    let mut chain: Vec<Option<PortalIndex>> = vec![None; node_count];

    let (mins, maxs) = tree.bounds;
    let margin = 1.0;
    let expanded_mins = mins - Vector3::new(margin, margin, margin);
    let expanded_maxs = maxs + Vector3::new(margin, margin, margin);

    let outside = tree.outside;
    let root = tree.root;

    make_headnode_portals(&mut graph, planes, &mut chain, outside, root, expanded_mins, expanded_maxs);
    make_tree_portals_r(tree, &mut graph, planes, &mut chain, root);

    for idx in 0..node_count {
        if let Some(leaf) = tree.node_mut(idx).leaf_mut() {
            leaf.portals = chain[idx];
        }
    }

    tree.portals = graph;
}

/// Step 1: six portals around the whole tree, linking the synthetic
/// outside leaf to the root.
fn make_headnode_portals(
    graph: &mut PortalGraph,
    planes: &mut PlaneRegistry,
    chain: &mut [Option<PortalIndex>],
    outside: NodeIndex,
    root: NodeIndex,
    mins: Vector3<f32>,
    maxs: Vector3<f32>,
) {
    let box_faces = [
        (Vector3::new(1.0, 0.0, 0.0), maxs.x),
        (Vector3::new(-1.0, 0.0, 0.0), -mins.x),
        (Vector3::new(0.0, 1.0, 0.0), maxs.y),
        (Vector3::new(0.0, -1.0, 0.0), -mins.y),
        (Vector3::new(0.0, 0.0, 1.0), maxs.z),
        (Vector3::new(0.0, 0.0, -1.0), -mins.z),
    ];

    for (normal, dist) in box_faces.iter() {
        let plane_idx = planes.find_or_insert_oriented(*normal, *dist);
        let plane = *planes.get(plane_idx);
        let winding = match bounded_winding(&plane, mins, maxs) {
            Some(w) => w,
            None => continue,
        };
        // the face's outward normal puts `outside` on the front side and
        // the tree's root volume on the back side.
        let idx = graph.new_portal(winding, plane_idx);
        graph.attach(idx, outside, root, chain);
    }
}

/// Steps 2 and 3, recursively: build `node`'s own portal, split every
/// portal currently bounding it down into its children, then recurse.
fn make_tree_portals_r(
    tree: &mut BspTree,
    graph: &mut PortalGraph,
    planes: &mut PlaneRegistry,
    chain: &mut Vec<Option<PortalIndex>>,
    node: NodeIndex,
) {
    let (plane_idx, children) = match tree.node(node).kind.clone() {
        NodeKind::Leaf(_) => return,
        NodeKind::Interior { plane, children } => (plane, children),
    };

    make_node_portal(tree, graph, planes, chain, node, plane_idx, children);
    split_node_portals(graph, planes, chain, node, plane_idx, children);

    make_tree_portals_r(tree, graph, planes, chain, children[0]);
    make_tree_portals_r(tree, graph, planes, chain, children[1]);
}

/// Builds the portal for `node`'s own splitting plane: a huge winding on
/// that plane, clipped down to `node`'s exact volume by every portal
/// already bounding it (inherited from ancestors via `chain`).
fn make_node_portal(
    tree: &BspTree,
    graph: &mut PortalGraph,
    planes: &PlaneRegistry,
    chain: &mut [Option<PortalIndex>],
    node: NodeIndex,
    plane_idx: PlaneIndex,
    children: [NodeIndex; 2],
) {
    let node_bounds = tree.node(node).bounds;
    let plane = *planes.get(plane_idx);
    let mut winding = match bounded_winding(&plane, node_bounds.0, node_bounds.1) {
        Some(w) => w,
        None => return,
    };

    let mut cur = chain[node];
    while let Some(idx) = cur {
        let portal = graph.get(idx);
        let side = portal.side_index(node);
        // `node`'s volume lies on whichever side of the bounding portal's
        // plane `node` itself occupies.
        let clip_plane = if side == 0 {
            *planes.get(portal.plane)
        } else {
            planes.get(portal.plane).opposite()
        };
        winding = match winding.clip(&clip_plane, CLIP_EPSILON) {
            Some(w) => w,
            None => return,
        };
        cur = portal.next[side];
    }

    if winding.is_degenerate() {
        return;
    }

    let idx = graph.new_portal(winding, plane_idx);
    graph.attach(idx, children[0], children[1], chain);
}

/// Cuts every portal on `node`'s chain by `node`'s own plane and
/// re-attaches each surviving fragment to whichever child it now borders,
/// leaving `node`'s chain empty.
fn split_node_portals(
    graph: &mut PortalGraph,
    planes: &PlaneRegistry,
    chain: &mut [Option<PortalIndex>],
    node: NodeIndex,
    plane_idx: PlaneIndex,
    children: [NodeIndex; 2],
) {
    let plane = *planes.get(plane_idx);
    let front_child = children[0];
    let back_child = children[1];

    let mut cur = chain[node];
    while let Some(idx) = cur {
        let portal = graph.get(idx);
        let side = portal.side_index(node);
        let next = portal.next[side];
        let other = portal.other_side(node);
        let portal_plane = portal.plane;
        let winding = portal.winding.clone();
        let (node0, node1) = (portal.nodes[0], portal.nodes[1]);

        graph.detach(idx, node0, chain);
        graph.detach(idx, node1, chain);

        let (front_w, back_w) = winding.split(&plane, CLIP_EPSILON);

        match (front_w, back_w) {
            (Some(_), None) => {
                if side == 0 {
                    graph.attach(idx, front_child, other, chain);
                } else {
                    graph.attach(idx, other, front_child, chain);
                }
            }
            (None, Some(_)) => {
                if side == 0 {
                    graph.attach(idx, back_child, other, chain);
                } else {
                    graph.attach(idx, other, back_child, chain);
                }
            }
            (Some(fw), Some(bw)) => {
                graph.portals[idx].winding = fw;
                let new_idx = graph.new_portal(bw, portal_plane);
                if side == 0 {
                    graph.attach(idx, front_child, other, chain);
                    graph.attach(new_idx, back_child, other, chain);
                } else {
                    graph.attach(idx, other, front_child, chain);
                    graph.attach(new_idx, other, back_child, chain);
                }
            }
            (None, None) => {
                // fully degenerate under this plane's epsilon; drop it.
            }
        }

        cur = next;
    }
}

fn bounded_winding(plane: &crate::plane::Plane, mins: Vector3<f32>, maxs: Vector3<f32>) -> Option<Winding> {
    let mut w = Winding::base_for_plane(plane);
    let box_planes = [
        (Vector3::new(1.0, 0.0, 0.0), maxs.x),
        (Vector3::new(-1.0, 0.0, 0.0), -mins.x),
        (Vector3::new(0.0, 1.0, 0.0), maxs.y),
        (Vector3::new(0.0, -1.0, 0.0), -mins.y),
        (Vector3::new(0.0, 0.0, 1.0), maxs.z),
        (Vector3::new(0.0, 0.0, -1.0), -mins.z),
    ];
    for (n, d) in box_planes.iter() {
        let clip_plane = crate::plane::Plane::new(-*n, -*d);
        match w.clip(&clip_plane, CLIP_EPSILON) {
            Some(next) => w = next,
            None => return None,
        }
    }
    if w.is_degenerate() {
        None
    } else {
        Some(w)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bsp::{BspLeaf, BspNode};
    use crate::plane::PlaneRegistry;

    fn trivial_tree(planes: &mut PlaneRegistry) -> BspTree {
        let mins = Vector3::new(-10.0, -10.0, -10.0);
        let maxs = Vector3::new(10.0, 10.0, 10.0);

        let mut nodes = vec![
            BspNode {
                bounds: (mins, maxs),
                kind: NodeKind::Leaf(BspLeaf {
                    opaque: true,
                    ..leaf_default()
                }),
            },
        ];
        let outside = 0;
        let root = nodes.len();
        nodes.push(BspNode {
            bounds: (mins, maxs),
            kind: NodeKind::Leaf(leaf_default()),
        });

        let _ = planes.find_or_insert(Vector3::new(1.0, 0.0, 0.0), 0.0);

        BspTree {
            nodes,
            root,
            bounds: (mins, maxs),
            simple_bsp: false,
            portals: PortalGraph::new(),
            outside,
        }
    }

    fn leaf_default() -> BspLeaf {
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

    #[test]
    fn test_make_tree_portals_single_leaf_borders_outside() {
        let mut planes = PlaneRegistry::new();
        let mut tree = trivial_tree(&mut planes);
        make_tree_portals(&mut tree, &mut planes);
        assert!(!tree.portals.is_empty());
        // all six world-bounding-box faces should reach the lone leaf.
        assert_eq!(tree.portals.all_indices().count(), 6);
    }
}
