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

//! Area classification (C8): partitions passable leaves into numbered
//! areas separated by areaportal-flagged geometry, and records the
//! portal pairs connecting adjacent areas.

use crate::bsp::{BspTree, NodeIndex, NodeKind};
use crate::entity::EntityInput;
use crate::math::CLIP_EPSILON;
use crate::plane::PlaneRegistry;
use crate::primitive::Primitive;
use crate::winding::Winding;

/// One areaportal's connection between two areas, carrying the winding of
/// the source geometry so downstream renderers can test portal
/// visibility.
#[derive(Clone, Debug)]
pub struct InterAreaPortal {
    pub area_a: usize,
    pub area_b: usize,
    pub winding: Winding,
    /// Index of the source brush side or mesh triangle that produced this
    /// areaportal, within the leaf's `area_portal_tris`.
    pub source_side: usize,
}

/// Assigns an area index to every non-opaque leaf by flood-filling through
/// every portal that doesn't cross areaportal-flagged geometry, and
/// records the `InterAreaPortal`s bridging adjacent areas
/// (`FloodAreas`, `spec.md` §4.6).
///
/// An areaportal leaf that never gets exactly two distinct areas on its
/// two sides is reported as invalid but does not abort the compile
/// (`spec.md` §7, Invalid Areaportal).
pub fn flood_areas(tree: &mut BspTree) -> (Vec<InterAreaPortal>, Vec<usize>) {
    let leaves = tree.leaf_indices();
    let mut area_of: Vec<Option<usize>> = vec![None; tree.nodes.len()];
    let mut next_area = 0usize;
    let mut invalid_sides = Vec::new();

    for &start in &leaves {
        if area_of[start].is_some() {
            continue;
        }
        if tree.node(start).leaf().map_or(true, |l| l.opaque) {
            continue;
        }

        let area = next_area;
        next_area += 1;
        flood_area_r(tree, start, area, &mut area_of);
    }

    for &idx in &leaves {
        if let Some(area) = area_of[idx] {
            if let Some(leaf) = tree.node_mut(idx).leaf_mut() {
                leaf.area = area as i32;
            }
        }
    }

    let mut portals = Vec::new();
    let mut seen_pairs = std::collections::HashSet::new();

    for &idx in &leaves {
        let (area, head, tris) = match tree.node(idx).leaf() {
            Some(l) if !l.opaque => (l.area, l.portals, l.area_portal_tris.clone()),
            _ => continue,
        };
        if area < 0 {
            continue;
        }

        let portal_indices: Vec<_> = tree.portals.iter_leaf(idx, head).collect();
        for portal_idx in portal_indices {
            let portal = tree.portals.get(portal_idx);
            let other = portal.other_side(idx);
            let other_area = tree.node(other).leaf().and_then(|l| if l.opaque { None } else { Some(l.area) });

            if let Some(other_area) = other_area {
                if other_area >= 0 && other_area as usize != area as usize && !tris.is_empty() {
                    let pair = if (area as usize) < other_area as usize {
                        (area as usize, other_area as usize)
                    } else {
                        (other_area as usize, area as usize)
                    };
                    if seen_pairs.insert((pair, portal_idx)) {
                        portals.push(InterAreaPortal {
                            area_a: pair.0,
                            area_b: pair.1,
                            winding: portal.winding.clone(),
                            source_side: tris[0],
                        });
                    }
                } else if !tris.is_empty() && other_area.map_or(true, |a| a < 0) {
                    invalid_sides.push(tris[0]);
                }
            }
        }
    }

    (portals, invalid_sides)
}

fn flood_area_r(tree: &mut BspTree, start: NodeIndex, area: usize, area_of: &mut Vec<Option<usize>>) {
    let mut stack = vec![start];
    area_of[start] = Some(area);

    while let Some(cur) = stack.pop() {
        let (is_areaportal, head) = match tree.node(cur).leaf() {
            Some(l) => (!l.area_portal_tris.is_empty(), l.portals),
            None => continue,
        };

        // Areaportal leaves are boundaries: they get assigned an area
        // themselves (so their own geometry has somewhere to live) but do
        // not propagate the flood through their far portals.
        if is_areaportal && cur != start {
            continue;
        }

        let portal_indices: Vec<_> = tree.portals.iter_leaf(cur, head).collect();
        for portal_idx in portal_indices {
            let portal = tree.portals.get(portal_idx);
            if !crate::portal::passable(tree, portal, cur) {
                continue;
            }
            let other = portal.other_side(cur);
            if area_of[other].is_none() {
                area_of[other] = Some(area);
                stack.push(other);
            }
        }
    }
}

/// Descends `tree`, splitting each areaportal brush's side windings at
/// every plane crossed, and records the source brush index in every
/// leaf the geometry touches. Must run before `flood_areas` so the flood
/// can treat those leaves as area boundaries.
pub fn mark_area_portal_leaves(tree: &mut BspTree, entity: &EntityInput, planes: &PlaneRegistry) {
    for (prim_idx, prim) in entity.primitives.iter().enumerate() {
        if let Primitive::Brush(b) = prim {
            if !b.is_areaportal() {
                continue;
            }
            for side in &b.sides {
                if let Some(winding) = &side.winding {
                    mark_r(tree, tree.root, winding.clone(), prim_idx, planes);
                }
            }
        }
    }
}

fn mark_r(tree: &mut BspTree, node: NodeIndex, winding: Winding, source: usize, planes: &PlaneRegistry) {
    if winding.is_degenerate() {
        return;
    }

    let kind = tree.node(node).kind.clone();
    match kind {
        NodeKind::Leaf(_) => {
            if let Some(leaf) = tree.node_mut(node).leaf_mut() {
                leaf.area_portal_tris.push(source);
            }
        }
        NodeKind::Interior { plane, children } => {
            let p = *planes.get(plane);
            let (front, back) = winding.split(&p, CLIP_EPSILON);
            if let Some(f) = front {
                mark_r(tree, children[0], f, source, planes);
            }
            if let Some(b) = back {
                mark_r(tree, children[1], b, source, planes);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bsp::{BspLeaf, BspNode, NodeKind};
    use crate::plane::PlaneRegistry;
    use crate::portal::PortalGraph;
    use cgmath::Vector3;

    fn leaf(opaque: bool) -> BspLeaf {
        BspLeaf {
            area: -1,
            opaque,
            occupied: None,
            brush_list: Vec::new(),
            portals: None,
            area_portal_tris: Vec::new(),
            node_number: 0,
        }
    }

    #[test]
    fn test_flood_areas_single_leaf_gets_area_zero() {
        let mins = Vector3::new(-1.0, -1.0, -1.0);
        let maxs = Vector3::new(1.0, 1.0, 1.0);
        let mut tree = BspTree {
            nodes: vec![
                BspNode {
                    bounds: (mins, maxs),
                    kind: NodeKind::Leaf(leaf(false)),
                },
                BspNode {
                    bounds: (mins, maxs),
                    kind: NodeKind::Leaf(leaf(true)),
                },
            ],
            root: 0,
            bounds: (mins, maxs),
            simple_bsp: false,
            portals: PortalGraph::new(),
            outside: 1,
        };
        let _ = PlaneRegistry::new();
        let (portals, invalid) = flood_areas(&mut tree);
        assert!(portals.is_empty());
        assert!(invalid.is_empty());
        assert_eq!(tree.node(0).leaf().unwrap().area, 0);
    }
}
