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

//! Split-plane heuristic (C5): picks the face whose plane best partitions
//! the remaining face list, favouring few splits and many coincident
//! faces, with an axial bonus. Two scoring formulas are supported,
//! selected by `CompileOptions::alt_split_weights`.

use std::collections::HashMap;

use cgmath::Vector3;

use crate::bsp::BspFace;
use crate::math::CLIP_EPSILON;
use crate::plane::{PlaneIndex, PlaneRegistry};
use crate::winding::WindingSide;

/// Chooses the index (into `faces`) of the plane to split on, or `None`
/// if every remaining face should become a leaf.
///
/// `faces` consisting entirely of `simple_bsp`-flagged entries skip the
/// heuristic and split on the first face deterministically (`spec.md`
/// §4.3, simpleBSP path).
///
/// `split_counter` is the running `planeIndex -> timesUsedAsSplit` table
/// fed into the alternative formula's `planeCounter` term.
pub fn select_split_plane(
    faces: &[BspFace],
    planes: &PlaneRegistry,
    alt_weights: bool,
    split_counter: &HashMap<PlaneIndex, u32>,
) -> Option<usize> {
    if faces.is_empty() {
        return None;
    }

    if faces.iter().all(|f| f.simple_bsp) {
        return Some(0);
    }

    // Portal gating (`spec.md` §4.3 step 2): once any face in the list
    // carries the portal bit, only portal faces may be split candidates,
    // so areaportal planes are reliably chosen.
    let has_portals = faces.iter().any(|f| f.portal);

    let mut best: Option<(usize, f32)> = None;

    for (i, candidate) in faces.iter().enumerate() {
        if candidate.simple_bsp {
            continue;
        }
        if has_portals && !candidate.portal {
            continue;
        }

        let plane_idx = candidate.plane;
        let plane = planes.get(plane_idx);

        let mut front = 0i32;
        let mut back = 0i32;
        let mut splits = 0i32;
        let mut facing = 0i32;

        for other in faces {
            if other.plane == plane_idx || other.plane == (plane_idx ^ 1) {
                facing += 1;
                continue;
            }
            match other.winding.side(plane, CLIP_EPSILON) {
                WindingSide::Front => front += 1,
                WindingSide::Back => back += 1,
                WindingSide::Cross => splits += 1,
                WindingSide::On => facing += 1,
            }
        }

        let score = if alt_weights {
            // Community alternative (`spec.md` §4.3): favour planes used
            // by many faces and penalise reuse, imbalance and splits.
            let num_faces = faces.len() as f32;
            let plane_counter = *split_counter.get(&plane_idx).unwrap_or(&0) as f32;
            let size_bias = candidate.winding.area();
            10.0 * num_faces - (front - back).abs() as f32 - plane_counter - facing as f32
                - 5.0 * splits as f32
                + 10.0 * size_bias
        } else {
            // id Software's original formula (`facebsp.cpp::SelectSplitPlane`).
            let axial_bonus = if plane.is_axial() { 5.0 } else { 0.0 };
            5.0 * facing as f32 - 5.0 * splits as f32 + axial_bonus
        };

        best = match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((i, score)),
        };
    }

    best.map(|(i, _)| i)
}

/// Checks whether the node's bounds exceed `block_size` on some axis and,
/// if so, returns an axis-aligned `(normal, dist)` cut near the middle of
/// the box on the largest offending axis. Forced cuts take priority over
/// the heuristic so that outdoor maps stay tractable (`spec.md` §4.3).
pub fn forced_block_split(
    bounds: (Vector3<f32>, Vector3<f32>),
    block_size: Vector3<f32>,
) -> Option<(Vector3<f32>, f32)> {
    let (mins, maxs) = bounds;
    let size = maxs - mins;
    let axes: [(f32, f32, Vector3<f32>); 3] = [
        (size.x, block_size.x, Vector3::new(1.0, 0.0, 0.0)),
        (size.y, block_size.y, Vector3::new(0.0, 1.0, 0.0)),
        (size.z, block_size.z, Vector3::new(0.0, 0.0, 1.0)),
    ];

    let mut best: Option<(f32, Vector3<f32>, f32)> = None;
    for (extent, block, normal) in axes.iter() {
        if *block <= 0.0 || *extent <= *block {
            continue;
        }
        let axis_min = mins.x * normal.x + mins.y * normal.y + mins.z * normal.z;
        let axis_max = maxs.x * normal.x + maxs.y * normal.y + maxs.z * normal.z;
        let center = (axis_min + axis_max) * 0.5;
        let dist = (center / block).round() * block;
        if dist <= axis_min + 1.0 || dist >= axis_max - 1.0 {
            continue;
        }
        match best {
            Some((best_extent, ..)) if best_extent >= *extent => {}
            _ => best = Some((*extent, *normal, dist)),
        }
    }

    best.map(|(_, normal, dist)| (normal, dist))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::plane::PlaneRegistry;
    use crate::winding::Winding;

    fn face(plane: usize, planes: &PlaneRegistry) -> BspFace {
        BspFace {
            winding: Winding::base_for_plane(planes.get(plane)),
            plane,
            portal: false,
            simple_bsp: false,
            source_primitive: 0,
        }
    }

    #[test]
    fn test_all_simple_bsp_picks_first() {
        let mut planes = PlaneRegistry::new();
        let p0 = planes.find_or_insert(Vector3::new(1.0, 0.0, 0.0), 1.0);
        let mut f = face(p0, &planes);
        f.simple_bsp = true;
        assert_eq!(
            select_split_plane(&[f], &planes, false, &HashMap::new()),
            Some(0)
        );
    }

    #[test]
    fn test_forced_block_split_triggers_on_oversized_axis() {
        let bounds = (
            Vector3::new(-1500.0, -100.0, -100.0),
            Vector3::new(1500.0, 100.0, 100.0),
        );
        let block = Vector3::new(1024.0, 1024.0, 1024.0);
        let split = forced_block_split(bounds, block);
        assert!(split.is_some());
        let (normal, _) = split.unwrap();
        assert_eq!(normal, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_forced_block_split_absent_when_within_budget() {
        let bounds = (Vector3::new(-10.0, -10.0, -10.0), Vector3::new(10.0, 10.0, 10.0));
        let block = Vector3::new(1024.0, 1024.0, 1024.0);
        assert!(forced_block_split(bounds, block).is_none());
    }
}
