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

//! Convex polygon windings (C1).
//!
//! A winding is an ordered ring of at least 3 coplanar points. Splits never
//! throw: a fully degenerate result collapses to `None` and the caller
//! decides what that means (`spec.md` §7, "local operations never throw out").

use cgmath::{InnerSpace, Vector3};

use crate::math::bounds;
use crate::plane::{Plane, PlaneSide};

const HUGE_EXTENT: f32 = 1.0e5;

#[derive(Clone, Debug, PartialEq)]
pub struct Winding {
    points: Vec<Vector3<f32>>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WindingSide {
    Front,
    Back,
    Cross,
    On,
}

impl Winding {
    pub fn new(points: Vec<Vector3<f32>>) -> Winding {
        Winding { points }
    }

    pub fn points(&self) -> &[Vector3<f32>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3 || self.area() < 1e-6
    }

    /// Builds a large winding lying in `plane`, big enough to be clipped
    /// down to any brush side or node portal by subsequent half-space
    /// intersections. Mirrors the classic "base winding for plane" routine.
    pub fn base_for_plane(plane: &Plane) -> Winding {
        // find the component of the normal with the largest magnitude and
        // build two orthogonal axes from it.
        let normal = plane.normal;
        let mut up = if normal.x.abs() > normal.y.abs() && normal.x.abs() > normal.z.abs() {
            Vector3::new(0.0, 0.0, 1.0)
        } else {
            Vector3::new(1.0, 0.0, 0.0)
        };

        let v = up.dot(normal);
        up -= normal * v;
        let up = up.normalize() * HUGE_EXTENT;
        let right = normal.cross(up);

        let org = normal * plane.dist;

        Winding::new(vec![
            org - right + up,
            org + right + up,
            org + right - up,
            org - right - up,
        ])
    }

    pub fn area(&self) -> f32 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut total = Vector3::new(0.0, 0.0, 0.0);
        for i in 1..self.points.len() - 1 {
            let a = self.points[i] - self.points[0];
            let b = self.points[i + 1] - self.points[0];
            total += a.cross(b);
        }
        total.magnitude() * 0.5
    }

    pub fn bounds(&self) -> (Vector3<f32>, Vector3<f32>) {
        bounds(&self.points)
    }

    pub fn reverse(&self) -> Winding {
        let mut points = self.points.clone();
        points.reverse();
        Winding::new(points)
    }

    /// Classifies this winding against `plane` within `epsilon`.
    pub fn side(&self, plane: &Plane, epsilon: f32) -> WindingSide {
        let mut front = 0;
        let mut back = 0;
        for p in &self.points {
            match plane.point_side(*p, epsilon) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::On => (),
            }
        }

        match (front > 0, back > 0) {
            (false, false) => WindingSide::On,
            (true, false) => WindingSide::Front,
            (false, true) => WindingSide::Back,
            (true, true) => WindingSide::Cross,
        }
    }

    /// Splits this winding against `plane`, returning `(front, back)`.
    /// Either half may be `None` if the winding lies entirely on the other
    /// side. Splitting a winding by its own plane returns the input
    /// unchanged on the front half (ON classification, `spec.md` §8).
    pub fn split(&self, plane: &Plane, epsilon: f32) -> (Option<Winding>, Option<Winding>) {
        let n = self.points.len();
        let mut dists = Vec::with_capacity(n);
        let mut sides = Vec::with_capacity(n);

        let mut front_count = 0;
        let mut back_count = 0;

        for p in &self.points {
            let d = plane.point_dist(*p);
            dists.push(d);
            let side = if d > epsilon {
                front_count += 1;
                WindingSide::Front
            } else if d < -epsilon {
                back_count += 1;
                WindingSide::Back
            } else {
                WindingSide::On
            };
            sides.push(side);
        }

        if front_count == 0 && back_count == 0 {
            // entirely on-plane: treat as front, matching the convention
            // that a zero-distance point is on the positive side.
            return (Some(self.clone()), None);
        }
        if front_count == 0 {
            return (None, Some(self.clone()));
        }
        if back_count == 0 {
            return (Some(self.clone()), None);
        }

        let mut front_pts = Vec::with_capacity(n + 4);
        let mut back_pts = Vec::with_capacity(n + 4);

        for i in 0..n {
            let cur = self.points[i];
            let cur_side = sides[i];

            match cur_side {
                WindingSide::On => {
                    front_pts.push(cur);
                    back_pts.push(cur);
                    continue;
                }
                WindingSide::Front => front_pts.push(cur),
                WindingSide::Back => back_pts.push(cur),
                WindingSide::Cross => unreachable!(),
            }

            let next_i = (i + 1) % n;
            let next_side = sides[next_i];
            if next_side == WindingSide::On || next_side == cur_side {
                continue;
            }

            // edge crosses the plane: compute the intersection point.
            let next = self.points[next_i];
            let t = dists[i] / (dists[i] - dists[next_i]);
            let mid = cur + (next - cur) * t;
            front_pts.push(mid);
            back_pts.push(mid);
        }

        let front = if front_pts.len() >= 3 {
            Some(Winding::new(front_pts))
        } else {
            None
        };
        let back = if back_pts.len() >= 3 {
            Some(Winding::new(back_pts))
        } else {
            None
        };

        (front, back)
    }

    /// Clips this winding in place to the front half-space of `plane`.
    /// Returns `None` if nothing survives.
    pub fn clip(&self, plane: &Plane, epsilon: f32) -> Option<Winding> {
        self.split(plane, epsilon).0
    }
}
