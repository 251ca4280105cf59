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

//! Wavefront OBJ debug visual emission (`spec.md` §6). One `g` group per
//! area, coloured deterministically by hashing the area index, so a
//! leak or a mis-flooded area is easy to spot in a model viewer.

use std::fmt::Write as _;

use crate::entity::EntityOutput;

const PALETTE_SIZE: usize = 32;

lazy_static! {
    /// Fixed RGB palette shared by every debug OBJ export, so two runs
    /// over the same map colour corresponding areas identically.
    static ref PALETTE: Vec<(u8, u8, u8)> = (0..PALETTE_SIZE)
        .map(|i| {
            let h = (i as u32).wrapping_mul(2_654_435_761);
            (((h >> 16) & 0xff) as u8, ((h >> 8) & 0xff) as u8, (h & 0xff) as u8)
        })
        .collect();
}

/// Renders `output`'s per-area fragments as an OBJ document. Areas are
/// emitted as separate `g` groups in index order; each group's faces
/// share one comment line naming a deterministic palette index so a
/// viewer that colours by material sees a stable colour per area across
/// runs.
pub fn export_area_obj(output: &EntityOutput) -> String {
    let mut obj = String::new();
    let mut vertex_count = 0usize;

    writeln!(obj, "# entity {} debug area visualization", output.entity_num).unwrap();

    for (area_idx, fragments) in output.area_primitives.iter().enumerate() {
        writeln!(obj, "g area_{}", area_idx).unwrap();
        let (r, g, b) = PALETTE[palette_index(area_idx)];
        writeln!(obj, "# palette {} rgb({},{},{})", palette_index(area_idx), r, g, b).unwrap();

        for fragment in fragments {
            let points = fragment.winding.points();
            if points.len() < 3 {
                continue;
            }
            for p in points {
                writeln!(obj, "v {} {} {}", p.x, p.y, p.z).unwrap();
            }
            let base = vertex_count + 1;
            write!(obj, "f").unwrap();
            for i in 0..points.len() {
                write!(obj, " {}", base + i).unwrap();
            }
            writeln!(obj).unwrap();
            vertex_count += points.len();
        }
    }

    obj
}

/// Emits the leak-line trail (if any) as an OBJ polyline, so it can be
/// overlaid on the area visualization in the same viewer.
pub fn export_leak_line(trail: &[cgmath::Vector3<f32>]) -> String {
    let mut obj = String::new();
    if trail.is_empty() {
        return obj;
    }

    writeln!(obj, "g leak_line").unwrap();
    for p in trail {
        writeln!(obj, "v {} {} {}", p.x, p.y, p.z).unwrap();
    }
    write!(obj, "l").unwrap();
    for i in 1..=trail.len() {
        write!(obj, " {}", i).unwrap();
    }
    writeln!(obj).unwrap();

    obj
}

/// A small deterministic hash of the area index into a fixed palette
/// size, used purely to give viewers something stable to colour by.
fn palette_index(area: usize) -> usize {
    // Knuth multiplicative hash, truncated to usize's low bits.
    area.wrapping_mul(2_654_435_761) % PALETTE_SIZE
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_palette_index_is_deterministic() {
        assert_eq!(palette_index(5), palette_index(5));
    }

    #[test]
    fn test_palette_index_bounded() {
        for i in 0..100 {
            assert!(palette_index(i) < 32);
        }
    }

    #[test]
    fn test_export_leak_line_empty_trail_is_empty_string() {
        assert_eq!(export_leak_line(&[]), "");
    }
}
