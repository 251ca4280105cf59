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

//! Opaque classification, occupant flood-fill, and leak detection (C7).

use std::collections::VecDeque;

use cgmath::Vector3;

use crate::bsp::{BspTree, NodeIndex};
use crate::entity::EntityInput;
use crate::primitive::Primitive;

/// Marks every leaf touched by an opaque brush as opaque, and records the
/// brushes whose volume overlaps it, by testing each brush's bounds
/// against every leaf's bounds. A leaf is opaque if *any* overlapping
/// brush is opaque (`FilterBrushesIntoTree`, `spec.md` §4.5).
pub fn filter_brushes_into_tree(tree: &mut BspTree, entity: &EntityInput, planes: &crate::plane::PlaneRegistry) {
    for leaf_idx in tree.leaf_indices() {
        let leaf_bounds = tree.node(leaf_idx).bounds;
        let mut opaque = false;
        let mut brush_list = Vec::new();

        for (i, prim) in entity.primitives.iter().enumerate() {
            if let Primitive::Brush(b) = prim {
                let brush_bounds = match b.bounds(planes) {
                    Some(bounds) => bounds,
                    None => continue,
                };
                if !aabb_overlap(leaf_bounds, brush_bounds) {
                    continue;
                }
                brush_list.push(i);
                if b.is_opaque() {
                    opaque = true;
                }
            }
        }

        if let Some(leaf) = tree.node_mut(leaf_idx).leaf_mut() {
            leaf.opaque = opaque;
            leaf.brush_list = brush_list;
        }
    }
}

fn aabb_overlap(a: (Vector3<f32>, Vector3<f32>), b: (Vector3<f32>, Vector3<f32>)) -> bool {
    let (a_min, a_max) = a;
    let (b_min, b_max) = b;
    a_min.x <= b_max.x
        && a_max.x >= b_min.x
        && a_min.y <= b_max.y
        && a_max.y >= b_min.y
        && a_min.z <= b_max.z
        && a_max.z >= b_min.z
}

/// Outcome of flooding from the entity's occupants.
pub struct FloodResult {
    pub leaked: bool,
    /// Leaf-to-leaf trail from an occupant to the point where the flood
    /// escaped through the outside leaf, suitable for a leak-line pointfile.
    pub leak_trail: Vec<Vector3<f32>>,
}

/// Breadth-first floods outward from every occupant leaf (point entities
/// with an `origin` inside the tree) through passable portals. Reaching
/// the synthetic outside leaf means the level leaks; the BFS parent
/// pointers reconstruct a representative trail back to the occupant
/// (`spec.md` §4.5).
pub fn flood_entities(
    tree: &mut BspTree,
    planes: &crate::plane::PlaneRegistry,
    occupant_origins: &[Vector3<f32>],
) -> FloodResult {
    if occupant_origins.is_empty() {
        return FloodResult {
            leaked: false,
            leak_trail: Vec::new(),
        };
    }

    let mut parent: Vec<Option<NodeIndex>> = vec![None; tree.nodes.len()];
    let mut visited = vec![false; tree.nodes.len()];
    let mut queue = VecDeque::new();
    let mut occupant_id = 0u32;

    for &origin in occupant_origins {
        let leaf_idx = tree.find_leaf(planes, origin);
        if tree.node(leaf_idx).leaf().map_or(false, |l| l.opaque) {
            continue;
        }
        if !visited[leaf_idx] {
            visited[leaf_idx] = true;
            if let Some(leaf) = tree.node_mut(leaf_idx).leaf_mut() {
                leaf.occupied = Some(occupant_id);
            }
            queue.push_back(leaf_idx);
            occupant_id += 1;
        }
    }

    let outside = tree.outside;
    let mut leaked_at = None;

    'bfs: while let Some(cur) = queue.pop_front() {
        let head = tree.node(cur).leaf().and_then(|l| l.portals);
        let portal_indices: Vec<_> = tree.portals.iter_leaf(cur, head).collect();

        for portal_idx in portal_indices {
            let portal = tree.portals.get(portal_idx);
            if !crate::portal::passable(tree, portal, cur) {
                continue;
            }
            let other = portal.other_side(cur);

            if other == outside {
                parent[outside] = Some(cur);
                leaked_at = Some(outside);
                break 'bfs;
            }

            if !visited[other] {
                visited[other] = true;
                parent[other] = Some(cur);
                if let Some(leaf) = tree.node_mut(other).leaf_mut() {
                    leaf.occupied = Some(0);
                }
                queue.push_back(other);
            }
        }
    }

    match leaked_at {
        Some(mut cur) => {
            let mut trail = Vec::new();
            loop {
                let bounds = tree.node(cur).bounds;
                let center = (bounds.0 + bounds.1) * 0.5;
                trail.push(center);
                match parent[cur] {
                    Some(p) => cur = p,
                    None => break,
                }
            }
            trail.reverse();
            FloodResult {
                leaked: true,
                leak_trail: trail,
            }
        }
        None => FloodResult {
            leaked: false,
            leak_trail: Vec::new(),
        },
    }
}

/// Marks every leaf not reached by `flood_entities` as opaque, so that
/// unreachable voids get carved away downstream (`FillOutside`,
/// `spec.md` §4.5). A no-op under `no_flood`.
pub fn fill_outside(tree: &mut BspTree) {
    let leaves = tree.leaf_indices();
    for idx in leaves {
        if let Some(leaf) = tree.node_mut(idx).leaf_mut() {
            if leaf.occupied.is_none() {
                leaf.opaque = true;
            }
        }
    }
}
