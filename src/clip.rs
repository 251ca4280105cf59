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

//! Side clipping and primitive distribution (C9): reduces every brush
//! side and mesh triangle to the portion that actually borders passable
//! space, then buckets the surviving fragments by area.

use crate::bsp::{BspTree, NodeIndex, NodeKind};
use crate::entity::EntityInput;
use crate::math::CLIP_EPSILON;
use crate::plane::{PlaneIndex, PlaneRegistry};
use crate::primitive::Primitive;
use crate::winding::Winding;

/// A surviving piece of a brush side or mesh triangle, already clipped to
/// a single area's worth of passable space.
#[derive(Clone, Debug)]
pub struct PlacedFragment {
    pub winding: Winding,
    pub plane: PlaneIndex,
    pub material: u32,
    pub source_primitive: usize,
    pub area: usize,
}

/// Clips every solid brush side's winding against the tree, discarding
/// the portions embedded in opaque leaves and splitting the remainder at
/// every plane crossing it descends through (`ClipSidesByTree`,
/// `spec.md` §4.7). Areaportal-only brushes are excluded: their sides
/// never become visible hull, only area boundaries.
pub fn clip_sides_by_tree(entity: &EntityInput, tree: &BspTree, planes: &PlaneRegistry) -> Vec<PlacedFragment> {
    let mut out = Vec::new();

    for (prim_idx, prim) in entity.primitives.iter().enumerate() {
        if let Primitive::Brush(b) = prim {
            if b.is_areaportal() {
                continue;
            }
            for side in &b.sides {
                let winding = match &side.winding {
                    Some(w) => w.clone(),
                    None => continue,
                };
                clip_fragment_r(
                    tree,
                    tree.root,
                    winding,
                    side.plane,
                    side.material,
                    prim_idx,
                    planes,
                    &mut out,
                );
            }
        }
    }

    out
}

/// Clips every mesh triangle the same way as `clip_sides_by_tree`, for
/// worldspawn geometry supplied as a triangle soup instead of brushes.
pub fn clip_meshes_by_tree(entity: &EntityInput, tree: &BspTree, planes: &PlaneRegistry) -> Vec<PlacedFragment> {
    let mut out = Vec::new();

    for (prim_idx, prim) in entity.primitives.iter().enumerate() {
        if let Primitive::Mesh(m) = prim {
            if m.is_areaportal() {
                continue;
            }
            for tri in &m.triangles {
                let winding = Winding::new(tri.vertices.to_vec());
                clip_fragment_r(
                    tree,
                    tree.root,
                    winding,
                    tri.plane,
                    tri.material,
                    prim_idx,
                    planes,
                    &mut out,
                );
            }
        }
    }

    out
}

fn clip_fragment_r(
    tree: &BspTree,
    node: NodeIndex,
    winding: Winding,
    plane: PlaneIndex,
    material: u32,
    source_primitive: usize,
    planes: &PlaneRegistry,
    out: &mut Vec<PlacedFragment>,
) {
    if winding.is_degenerate() {
        return;
    }

    match &tree.node(node).kind {
        NodeKind::Leaf(leaf) => {
            if leaf.opaque || leaf.area < 0 {
                return;
            }
            out.push(PlacedFragment {
                winding,
                plane,
                material,
                source_primitive,
                area: leaf.area as usize,
            });
        }
        NodeKind::Interior {
            plane: node_plane,
            children,
        } => {
            let p = planes.get(*node_plane);
            let (front, back) = winding.split(p, CLIP_EPSILON);
            if let Some(f) = front {
                clip_fragment_r(tree, children[0], f, plane, material, source_primitive, planes, out);
            }
            if let Some(b) = back {
                clip_fragment_r(tree, children[1], b, plane, material, source_primitive, planes, out);
            }
        }
    }
}

/// Runs side-clipping for both brushes and meshes and buckets the
/// surviving fragments by area index (`PutPrimitivesInAreas`,
/// `spec.md` §4.7).
pub fn put_primitives_in_areas(
    entity: &EntityInput,
    tree: &BspTree,
    planes: &PlaneRegistry,
    area_count: usize,
) -> Vec<Vec<PlacedFragment>> {
    let mut buckets: Vec<Vec<PlacedFragment>> = (0..area_count).map(|_| Vec::new()).collect();

    for fragment in clip_sides_by_tree(entity, tree, planes) {
        if fragment.area < buckets.len() {
            buckets[fragment.area].push(fragment);
        }
    }
    for fragment in clip_meshes_by_tree(entity, tree, planes) {
        if fragment.area < buckets.len() {
            buckets[fragment.area].push(fragment);
        }
    }

    buckets
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bsp::{BspLeaf, BspNode};
    use crate::portal::PortalGraph;
    use cgmath::Vector3;

    #[test]
    fn test_single_leaf_tree_keeps_whole_winding() {
        let mins = Vector3::new(-10.0, -10.0, -10.0);
        let maxs = Vector3::new(10.0, 10.0, 10.0);
        let tree = BspTree {
            nodes: vec![BspNode {
                bounds: (mins, maxs),
                kind: NodeKind::Leaf(BspLeaf {
                    area: 0,
                    opaque: false,
                    occupied: None,
                    brush_list: Vec::new(),
                    portals: None,
                    area_portal_tris: Vec::new(),
                    node_number: 0,
                }),
            }],
            root: 0,
            bounds: (mins, maxs),
            simple_bsp: false,
            portals: PortalGraph::new(),
            outside: 0,
        };
        let planes = PlaneRegistry::new();
        let mut out = Vec::new();
        let winding = Winding::new(vec![
            Vector3::new(-1.0, -1.0, 0.0),
            Vector3::new(1.0, -1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(-1.0, 1.0, 0.0),
        ]);
        clip_fragment_r(&tree, 0, winding, 0, 0, 0, &planes, &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].area, 0);
    }
}
