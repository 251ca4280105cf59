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

//! Brush and polygon-mesh input primitives (C3).

use cgmath::Vector3;

use crate::content::ContentFlags;
use crate::plane::{PlaneIndex, PlaneRegistry};
use crate::winding::Winding;

/// One face of a brush: a plane plus the winding obtained by intersecting
/// that plane's half-space against every other side of the brush.
#[derive(Clone, Debug)]
pub struct BrushSide {
    pub plane: PlaneIndex,
    pub winding: Option<Winding>,
    pub material: u32,
}

/// Convex intersection of half-spaces, materialised as a set of sides.
#[derive(Clone, Debug)]
pub struct Brush {
    pub sides: Vec<BrushSide>,
    pub content_flags: ContentFlags,
    pub subtractive: bool,
    pub simple_bsp: bool,
    pub entity_num: usize,
}

impl Brush {
    pub fn new(content_flags: ContentFlags, entity_num: usize) -> Brush {
        Brush {
            sides: Vec::new(),
            content_flags,
            subtractive: false,
            simple_bsp: false,
            entity_num,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.content_flags.is_opaque_for_bsp()
    }

    pub fn is_areaportal(&self) -> bool {
        self.content_flags.is_areaportal()
    }

    /// Materialises every side's winding by intersecting its plane against
    /// every other side's half-space, in the order the sides were added.
    /// Every side stores its plane with an outward-facing normal, so a
    /// point interior to the brush is *behind* every other side's plane;
    /// clipping therefore keeps the back half of each other plane (the
    /// front half of its opposite). Sides whose winding becomes
    /// degenerate are dropped; a brush that loses every side is "bad" and
    /// should be reported and skipped by the caller (`spec.md` §7, Bad
    /// Brush).
    pub fn materialize_windings(&mut self, planes: &PlaneRegistry) {
        let plane_indices: Vec<PlaneIndex> = self.sides.iter().map(|s| s.plane).collect();
        for i in 0..self.sides.len() {
            let plane = planes.get(plane_indices[i]);
            let mut winding = Some(Winding::base_for_plane(plane));

            for (j, &other_idx) in plane_indices.iter().enumerate() {
                if i == j {
                    continue;
                }
                let clip_plane = planes.get(other_idx).opposite();
                winding = match winding {
                    Some(w) => w.clip(&clip_plane, crate::math::CLIP_EPSILON),
                    None => None,
                };
                if winding.is_none() {
                    break;
                }
            }

            self.sides[i].winding = winding.filter(|w| !w.is_degenerate());
        }
    }

    pub fn is_well_formed(&self) -> bool {
        !self.sides.is_empty() && self.sides.iter().all(|s| s.winding.is_some())
    }

    pub fn bounds(&self, planes: &PlaneRegistry) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let _ = planes;
        let mut all_points = Vec::new();
        for side in &self.sides {
            if let Some(w) = &side.winding {
                all_points.extend_from_slice(w.points());
            }
        }
        if all_points.is_empty() {
            None
        } else {
            Some(crate::math::bounds(&all_points))
        }
    }
}

/// One triangle of a polygon-mesh primitive.
#[derive(Clone, Debug)]
pub struct MeshTriangle {
    pub vertices: [Vector3<f32>; 3],
    pub plane: PlaneIndex,
    pub material: u32,
}

/// Triangle soup used for worldspawn structural faces when brushes are
/// absent. Carries a back-pointer to the source mesh index (for
/// areaportal detection).
#[derive(Clone, Debug)]
pub struct MeshPrimitive {
    pub triangles: Vec<MeshTriangle>,
    pub content_flags: ContentFlags,
    pub source_mesh: usize,
    pub entity_num: usize,
}

impl MeshPrimitive {
    pub fn is_areaportal(&self) -> bool {
        self.content_flags.is_areaportal()
    }
}

/// A single input primitive: either a brush or a polygon mesh.
#[derive(Clone, Debug)]
pub enum Primitive {
    Brush(Brush),
    Mesh(MeshPrimitive),
}

impl Primitive {
    pub fn entity_num(&self) -> usize {
        match self {
            Primitive::Brush(b) => b.entity_num,
            Primitive::Mesh(m) => m.entity_num,
        }
    }

    pub fn is_areaportal(&self) -> bool {
        match self {
            Primitive::Brush(b) => b.is_areaportal(),
            Primitive::Mesh(m) => m.is_areaportal(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cgmath::Vector3;

    fn unit_cube(planes: &mut PlaneRegistry, content: ContentFlags) -> Brush {
        let mut brush = Brush::new(content, 0);
        let faces = [
            (Vector3::new(1.0, 0.0, 0.0), 1.0),
            (Vector3::new(-1.0, 0.0, 0.0), 1.0),
            (Vector3::new(0.0, 1.0, 0.0), 1.0),
            (Vector3::new(0.0, -1.0, 0.0), 1.0),
            (Vector3::new(0.0, 0.0, 1.0), 1.0),
            (Vector3::new(0.0, 0.0, -1.0), 1.0),
        ];
        for (normal, dist) in faces.iter() {
            let idx = planes.find_or_insert_oriented(*normal, *dist);
            brush.sides.push(BrushSide {
                plane: idx,
                winding: None,
                material: 0,
            });
        }
        brush
    }

    #[test]
    fn test_materialize_unit_cube_windings() {
        let mut planes = PlaneRegistry::new();
        let mut brush = unit_cube(&mut planes, ContentFlags::SOLID | ContentFlags::OPAQUE);
        brush.materialize_windings(&planes);
        assert!(brush.is_well_formed());
        for side in &brush.sides {
            let w = side.winding.as_ref().unwrap();
            assert!((w.area() - 4.0).abs() < 1e-3);
        }
    }
}
