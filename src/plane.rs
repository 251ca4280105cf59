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

//! Canonicalised, deduplicated plane registry (C2).
//!
//! The registry hands out even indices; the logical "opposite" plane is
//! always `index ^ 1`.

use std::collections::HashMap;

use cgmath::{InnerSpace, Vector3};
use num::FromPrimitive;

use crate::math::{snap_int, snap_zero, DIST_EPSILON, NORMAL_EPSILON};

pub type PlaneIndex = usize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum PlaneType {
    AxialX,
    AxialY,
    AxialZ,
    TrueAxial,
}

impl PlaneType {
    pub fn is_axial(&self) -> bool {
        *self != PlaneType::TrueAxial
    }

    /// Recovers a `PlaneType` from its discriminant, as stored in a
    /// serialized BSP (teacher-style `num::FromPrimitive` round trip).
    pub fn from_discriminant(d: u32) -> Option<PlaneType> {
        PlaneType::from_u32(d)
    }
}

/// An oriented plane in point-normal form.
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub dist: f32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaneSide {
    Front,
    Back,
    On,
}

impl Plane {
    pub fn new(normal: Vector3<f32>, dist: f32) -> Plane {
        Plane { normal, dist }
    }

    /// Classifies this plane's alignment per `spec.md` §3.
    pub fn plane_type(&self) -> PlaneType {
        const AXIAL_EPSILON: f32 = 0.001;
        if (self.normal.x.abs() - 1.0).abs() < AXIAL_EPSILON
            && self.normal.y.abs() < AXIAL_EPSILON
            && self.normal.z.abs() < AXIAL_EPSILON
        {
            PlaneType::AxialX
        } else if (self.normal.y.abs() - 1.0).abs() < AXIAL_EPSILON
            && self.normal.x.abs() < AXIAL_EPSILON
            && self.normal.z.abs() < AXIAL_EPSILON
        {
            PlaneType::AxialY
        } else if (self.normal.z.abs() - 1.0).abs() < AXIAL_EPSILON
            && self.normal.x.abs() < AXIAL_EPSILON
            && self.normal.y.abs() < AXIAL_EPSILON
        {
            PlaneType::AxialZ
        } else {
            PlaneType::TrueAxial
        }
    }

    pub fn is_axial(&self) -> bool {
        self.plane_type() != PlaneType::TrueAxial
    }

    /// Signed distance of `point` from this plane.
    pub fn point_dist(&self, point: Vector3<f32>) -> f32 {
        self.normal.dot(point) - self.dist
    }

    /// Classifies `point` against this plane within `CLIP_EPSILON`.
    pub fn point_side(&self, point: Vector3<f32>, epsilon: f32) -> PlaneSide {
        let d = self.point_dist(point);
        if d > epsilon {
            PlaneSide::Front
        } else if d < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }

    pub fn opposite(&self) -> Plane {
        Plane {
            normal: -self.normal,
            dist: -self.dist,
        }
    }
}

fn quantize_key(normal: Vector3<f32>, dist: f32) -> (i64, i64, i64, i64) {
    // quantise to a grid coarser than the matching epsilon so that
    // nearly-equal planes land in the same (or an adjacent) bucket.
    let q = |v: f32| (v / NORMAL_EPSILON).round() as i64;
    let qd = (dist / DIST_EPSILON).round() as i64;
    (q(normal.x), q(normal.y), q(normal.z), qd)
}

/// Canonicalised, deduplicated plane table.
///
/// `find_or_insert` always hands back an *even* index; `index ^ 1` is the
/// antiparallel plane, inserted alongside it at registration time.
#[derive(Debug, Default)]
pub struct PlaneRegistry {
    planes: Vec<Plane>,
    buckets: HashMap<(i64, i64, i64, i64), Vec<PlaneIndex>>,
}

impl PlaneRegistry {
    pub fn new() -> PlaneRegistry {
        PlaneRegistry {
            planes: Vec::new(),
            buckets: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn get(&self, index: PlaneIndex) -> &Plane {
        &self.planes[index]
    }

    /// Finds an existing plane within `(NORMAL_EPSILON, DIST_EPSILON)` of
    /// `plane`, or inserts `plane` and its opposite at consecutive
    /// even/odd indices. Always returns an even index; the caller XORs
    /// with 1 for the antiparallel orientation.
    pub fn find_or_insert(&mut self, normal: Vector3<f32>, dist: f32) -> PlaneIndex {
        let normal = Vector3::new(snap_zero(normal.x), snap_zero(normal.y), snap_zero(normal.z))
            .normalize();
        let dist = snap_int(dist);

        let key = quantize_key(normal, dist);
        // check this bucket and its 26 neighbours for a near-match, since
        // quantisation can place nearly-identical planes one cell apart.
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    for dd in -1..=1 {
                        let probe = (key.0 + dx, key.1 + dy, key.2 + dz, key.3 + dd);
                        if let Some(candidates) = self.buckets.get(&probe) {
                            for &idx in candidates {
                                let stored = &self.planes[idx];
                                if (stored.normal - normal).magnitude() < NORMAL_EPSILON * 10.0
                                    && (stored.dist - dist).abs() < DIST_EPSILON
                                {
                                    return idx & !1;
                                }
                                if (stored.normal + normal).magnitude() < NORMAL_EPSILON * 10.0
                                    && (stored.dist + dist).abs() < DIST_EPSILON
                                {
                                    return idx & !1;
                                }
                            }
                        }
                    }
                }
            }
        }

        let even = self.planes.len();
        debug_assert_eq!(even % 2, 0);
        let plane = Plane::new(normal, dist);
        let opposite = plane.opposite();

        self.planes.push(plane);
        self.planes.push(opposite);

        self.buckets.entry(key).or_default().push(even);
        let opp_key = quantize_key(opposite.normal, opposite.dist);
        self.buckets.entry(opp_key).or_default().push(even + 1);

        even
    }

    /// Like `find_or_insert`, but returns whichever of `index`/`index ^ 1`
    /// actually faces `normal` — convenient for callers (e.g. brush
    /// construction) that care about orientation rather than canonical
    /// storage order.
    pub fn find_or_insert_oriented(&mut self, normal: Vector3<f32>, dist: f32) -> PlaneIndex {
        let even = self.find_or_insert(normal, dist);
        let normal = normal.normalize();
        let stored = &self.planes[even];
        if stored.normal.dot(normal) >= 0.0 {
            even
        } else {
            even ^ 1
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cgmath::Zero;

    #[test]
    fn test_find_or_insert_idempotent() {
        let mut reg = PlaneRegistry::new();
        let a = reg.find_or_insert(Vector3::unit_x(), 10.0);
        let b = reg.find_or_insert(Vector3::unit_x(), 10.000_001);
        assert_eq!(a, b);
        assert_eq!(a % 2, 0);
    }

    #[test]
    fn test_opposite_is_xor_one() {
        let mut reg = PlaneRegistry::new();
        let even = reg.find_or_insert(Vector3::unit_x(), 5.0);
        let odd = even ^ 1;
        let p = reg.get(even);
        let op = reg.get(odd);
        assert_eq!(p.normal, -op.normal);
        assert_eq!(p.dist, -op.dist);
    }

    #[test]
    fn test_plane_type_from_discriminant_round_trips() {
        assert_eq!(PlaneType::from_discriminant(0), Some(PlaneType::AxialX));
        assert_eq!(PlaneType::from_discriminant(3), Some(PlaneType::TrueAxial));
        assert_eq!(PlaneType::from_discriminant(99), None);
    }

    #[test]
    fn test_distinct_planes_get_distinct_indices() {
        let mut reg = PlaneRegistry::new();
        let a = reg.find_or_insert(Vector3::unit_x(), 10.0);
        let b = reg.find_or_insert(Vector3::unit_y(), 10.0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_point_side() {
        let plane = Plane::new(Vector3::unit_x(), 1.0);
        assert_eq!(
            plane.point_side(Vector3::unit_x() * 2.0, 0.01),
            PlaneSide::Front
        );
        assert_eq!(
            plane.point_side(Vector3::zero(), 0.01),
            PlaneSide::Back
        );
        assert_eq!(
            plane.point_side(Vector3::unit_x(), 0.01),
            PlaneSide::On
        );
    }
}
