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

//! T-junction repair (C10): inserts vertices from neighbouring fragments
//! onto any edge that silently passes a foreign vertex, preventing the
//! visible cracks a renderer would otherwise draw along an unsnapped
//! edge-to-edge seam.

use cgmath::{InnerSpace, Vector3};

use crate::clip::PlacedFragment;
use crate::math::{point_on_segment, T_JUNC_EPSILON};
use crate::winding::Winding;

/// Repairs T-junctions within one area's fragment list in place. Run once
/// per area; cross-area repair is handled by `fix_global_tjunctions`.
pub fn fix_area_tjunctions(fragments: &mut [PlacedFragment]) {
    let all_points: Vec<Vector3<f32>> = fragments
        .iter()
        .flat_map(|f| f.winding.points().iter().cloned())
        .collect();

    for fragment in fragments.iter_mut() {
        fragment.winding = insert_tjunctions(&fragment.winding, &all_points);
    }
}

/// Repairs T-junctions across every area's fragment list, for seams that
/// fall on an areaportal boundary shared between two areas
/// (`FixGlobalTjunctions`, `spec.md` §4.8).
pub fn fix_global_tjunctions(area_primitives: &mut [Vec<PlacedFragment>]) {
    let all_points: Vec<Vector3<f32>> = area_primitives
        .iter()
        .flatten()
        .flat_map(|f| f.winding.points().iter().cloned())
        .collect();

    for fragments in area_primitives.iter_mut() {
        for fragment in fragments.iter_mut() {
            fragment.winding = insert_tjunctions(&fragment.winding, &all_points);
        }
    }
}

/// Walks each edge of `winding` and splices in any point from `all_points`
/// that lies strictly between the edge's endpoints within
/// `T_JUNC_EPSILON`, ordered by distance along the edge.
fn insert_tjunctions(winding: &Winding, all_points: &[Vector3<f32>]) -> Winding {
    let pts = winding.points();
    let n = pts.len();
    if n < 3 {
        return winding.clone();
    }

    let mut result = Vec::with_capacity(n);

    for i in 0..n {
        let a = pts[i];
        let b = pts[(i + 1) % n];
        result.push(a);

        let edge_len = (b - a).magnitude();
        if edge_len < T_JUNC_EPSILON {
            continue;
        }

        let mut extra: Vec<(f32, Vector3<f32>)> = all_points
            .iter()
            .filter(|&&p| {
                if (p - a).magnitude() < T_JUNC_EPSILON || (p - b).magnitude() < T_JUNC_EPSILON {
                    return false;
                }
                point_on_segment(p, a, b, T_JUNC_EPSILON)
            })
            .map(|&p| ((p - a).magnitude(), p))
            .collect();

        extra.sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap());
        extra.dedup_by(|x, y| (x.1 - y.1).magnitude() < T_JUNC_EPSILON);

        for (_, p) in extra {
            result.push(p);
        }
    }

    Winding::new(result)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_insert_tjunctions_splices_midpoint() {
        let winding = Winding::new(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(2.0, 2.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
        ]);
        let all_points = vec![Vector3::new(1.0, 0.0, 0.0)];
        let repaired = insert_tjunctions(&winding, &all_points);
        assert_eq!(repaired.len(), 5);
        assert!(repaired
            .points()
            .iter()
            .any(|p| (p - Vector3::new(1.0, 0.0, 0.0)).magnitude() < 1e-5));
    }

    #[test]
    fn test_insert_tjunctions_no_op_without_foreign_points() {
        let winding = Winding::new(vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(2.0, 2.0, 0.0),
            Vector3::new(0.0, 2.0, 0.0),
        ]);
        let repaired = insert_tjunctions(&winding, winding.points());
        assert_eq!(repaired.len(), 4);
    }
}
