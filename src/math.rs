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

//! Shared vector helpers used across the geometry pipeline.

use cgmath::{InnerSpace, Vector3};

/// Epsilon used when classifying a point against a plane.
pub const CLIP_EPSILON: f32 = 0.1;

/// Epsilon for plane-normal equality in the plane registry.
pub const NORMAL_EPSILON: f32 = 1e-5;

/// Epsilon for plane-distance equality in the plane registry.
pub const DIST_EPSILON: f32 = 0.01;

/// Epsilon used by T-junction collinearity scans.
pub const T_JUNC_EPSILON: f32 = 0.01;

// see https://github.com/id-Software/Quake/blob/master/WinQuake/gl_rsurf.c#L1544
const COLLINEAR_EPSILON: f32 = 0.001;

/// Determines if the given points are collinear.
///
/// Special cases:
/// - If `vs.len() < 2`, always returns `false`.
/// - If `vs.len() == 2`, always returns `true`.
pub fn collinear(vs: &[Vector3<f32>]) -> bool {
    match vs.len() {
        l if l < 2 => false,
        2 => true,
        _ => {
            let init = (vs[1] - vs[0]).normalize();
            for i in 2..vs.len() {
                let norm = (vs[i] - vs[i - 1]).normalize();
                if (norm[0] - init[0]).abs() > COLLINEAR_EPSILON
                    || (norm[1] - init[1]).abs() > COLLINEAR_EPSILON
                    || (norm[2] - init[2]).abs() > COLLINEAR_EPSILON
                {
                    return false;
                }
            }

            true
        }
    }
}

/// Returns true if `p` lies on the closed segment `a`-`b` within `epsilon`.
pub fn point_on_segment(p: Vector3<f32>, a: Vector3<f32>, b: Vector3<f32>, epsilon: f32) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.magnitude2();
    if len2 < epsilon * epsilon {
        return (p - a).magnitude() <= epsilon;
    }

    let t = ap.dot(ab) / len2;
    if t < -epsilon || t > 1.0 + epsilon {
        return false;
    }

    let closest = a + ab * t.max(0.0).min(1.0);
    (p - closest).magnitude() <= epsilon
}

/// Computes the axis-aligned bounding box of a point set.
pub fn bounds<'a, I>(points: I) -> (Vector3<f32>, Vector3<f32>)
where
    I: IntoIterator<Item = &'a Vector3<f32>>,
{
    let mut min = Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
    let mut max = Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in points.into_iter() {
        for c in 0..3 {
            min[c] = p[c].min(min[c]);
            max[c] = p[c].max(max[c]);
        }
    }
    (min, max)
}

/// Quantizes a near-zero component to exactly zero, within `NORMAL_EPSILON`.
pub fn snap_zero(v: f32) -> f32 {
    if v.abs() < NORMAL_EPSILON {
        0.0
    } else {
        v
    }
}

/// Snaps a near-integer distance to the nearest integer, within `DIST_EPSILON`.
pub fn snap_int(v: f32) -> f32 {
    let rounded = v.round();
    if (v - rounded).abs() < DIST_EPSILON {
        rounded
    } else {
        v
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cgmath::Zero;

    #[test]
    fn test_collinear() {
        assert!(!collinear(&[
            Vector3::unit_x(),
            Vector3::unit_y(),
            Vector3::unit_z()
        ]));
        assert!(collinear(&[
            Vector3::unit_x(),
            Vector3::unit_x() * 2.0,
            Vector3::unit_x() * 3.0
        ]));
    }

    #[test]
    fn test_point_on_segment() {
        let a = Vector3::zero();
        let b = Vector3::new(10.0, 0.0, 0.0);
        assert!(point_on_segment(Vector3::new(5.0, 0.0, 0.0), a, b, 0.01));
        assert!(!point_on_segment(Vector3::new(5.0, 1.0, 0.0), a, b, 0.01));
        assert!(!point_on_segment(Vector3::new(11.0, 0.0, 0.0), a, b, 0.01));
    }

    #[test]
    fn test_snap_zero_and_int() {
        assert_eq!(snap_zero(1e-7), 0.0);
        assert_eq!(snap_zero(0.5), 0.5);
        assert_eq!(snap_int(3.999_97), 4.0);
        assert_eq!(snap_int(3.9), 3.9);
    }

    #[test]
    fn test_bounds() {
        let pts = vec![
            Vector3::new(-1.0, 2.0, 0.0),
            Vector3::new(3.0, -2.0, 5.0),
        ];
        let (min, max) = bounds(&pts);
        assert_eq!(min, Vector3::new(-1.0, -2.0, 0.0));
        assert_eq!(max, Vector3::new(3.0, 2.0, 5.0));
    }
}
