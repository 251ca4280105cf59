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

//! Compile-time options, independent of any particular CLI surface.

use cgmath::Vector3;

/// Knobs controlling one `compile_map` invocation. The CLI binary builds
/// one of these from parsed arguments; library callers can construct it
/// directly.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    /// Emit a Wavefront OBJ of the flood/area classification for
    /// inspection in a model viewer.
    pub export_debug_visuals: bool,
    /// Emit an OBJ of the final per-area output geometry.
    pub export_obj: bool,
    /// Print the BSP tree structure as indented ASCII.
    pub ascii_tree: bool,
    pub verbose: bool,
    pub verbose_entities: bool,
    /// Interactively-style progress output (mirrors id Software's `-draw`).
    pub draw: bool,
    /// Use the alternative split-plane scoring formula.
    pub alt_split_weights: bool,
    pub block_size: Vector3<f32>,
    pub inline_statics: bool,
    pub no_merge: bool,
    pub no_flood: bool,
    pub no_light_carve: bool,
    pub light_carve: bool,
    pub no_optimize: bool,
    pub no_curves: bool,
    pub no_models: bool,
    pub no_clip_sides: bool,
    pub no_carve: bool,
    pub no_tjunc: bool,
    pub no_cm: bool,
    pub no_aas: bool,
    /// Restrict the compile to a `.reg` region file, if given.
    pub region: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> CompileOptions {
        CompileOptions {
            export_debug_visuals: false,
            export_obj: false,
            ascii_tree: false,
            verbose: false,
            verbose_entities: false,
            draw: false,
            alt_split_weights: false,
            block_size: Vector3::new(1024.0, 1024.0, 1024.0),
            inline_statics: false,
            no_merge: false,
            no_flood: false,
            no_light_carve: false,
            light_carve: false,
            no_optimize: false,
            no_curves: false,
            no_models: false,
            no_clip_sides: false,
            no_carve: false,
            no_tjunc: false,
            no_cm: false,
            no_aas: false,
            region: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_block_size_is_1024_cubed() {
        let opts = CompileOptions::default();
        assert_eq!(opts.block_size, Vector3::new(1024.0, 1024.0, 1024.0));
    }
}
