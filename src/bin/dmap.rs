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

//! `dmap` command-line front end: parses arguments into a `CompileOptions`
//! and hands off to the library's `compile_map`. Reading `.map`/`.proc`
//! source files is out of this core's scope; this binary wires up the
//! compile knobs and reports what it would have run.

extern crate cgmath;
extern crate dmap;
extern crate docopt;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate serde;
#[macro_use]
extern crate serde_derive;

use cgmath::Vector3;
use docopt::Docopt;

use dmap::{CompileOptions, DmapError, DmapErrorKind};

const USAGE: &str = "
dmap: BSP/portal/area map compiler.

Usage:
  dmap [options] <mapfile>
  dmap (-h | --help)

Options:
  -h --help             Show this screen.
  --glview              Export debug visuals (glview/OBJ).
  --obj                 Export final output geometry as OBJ.
  --asciiTree           Print the BSP tree as indented ASCII.
  -v --verbose          Verbose logging.
  --verboseentities     Verbose per-entity logging.
  --draw                Print progress as each stage runs.
  --altsplit            Use the alternative split-plane scoring formula.
  --blockSize=<n>       Cubical block size for forced splits [default: 1024].
  --inlineAll           Inline all static models.
  --noMerge             Skip face merging.
  --noFlood             Skip occupant flood/leak detection.
  --noLightCarve        Skip light-carve optimization.
  --lightCarve          Force light-carve optimization.
  --noOpt               Skip BSP optimization passes.
  --noCurves            Skip curve tesselation.
  --noModels            Skip inline model emission.
  --noClipSides         Skip side-clipping and primitive distribution.
  --noCarve             Skip brush carving.
  --noTjunc             Skip T-junction repair.
  --noCM                Skip collision-model generation.
  --noAAS               Skip AAS/nav-mesh generation.
  --region=<file>       Restrict the compile to a .reg region file.
";

#[derive(Debug, Deserialize)]
struct RawArgs {
    arg_mapfile: String,
    flag_glview: bool,
    flag_obj: bool,
    flag_asciiTree: bool,
    flag_verbose: bool,
    flag_verboseentities: bool,
    flag_draw: bool,
    flag_altsplit: bool,
    flag_blockSize: f32,
    flag_inlineAll: bool,
    flag_noMerge: bool,
    flag_noFlood: bool,
    flag_noLightCarve: bool,
    flag_lightCarve: bool,
    flag_noOpt: bool,
    flag_noCurves: bool,
    flag_noModels: bool,
    flag_noClipSides: bool,
    flag_noCarve: bool,
    flag_noTjunc: bool,
    flag_noCM: bool,
    flag_noAAS: bool,
    flag_region: Option<String>,
}

impl From<RawArgs> for CompileOptions {
    fn from(raw: RawArgs) -> CompileOptions {
        CompileOptions {
            export_debug_visuals: raw.flag_glview,
            export_obj: raw.flag_obj,
            ascii_tree: raw.flag_asciiTree,
            verbose: raw.flag_verbose,
            verbose_entities: raw.flag_verboseentities,
            draw: raw.flag_draw,
            alt_split_weights: raw.flag_altsplit,
            block_size: Vector3::new(raw.flag_blockSize, raw.flag_blockSize, raw.flag_blockSize),
            inline_statics: raw.flag_inlineAll,
            no_merge: raw.flag_noMerge,
            no_flood: raw.flag_noFlood,
            no_light_carve: raw.flag_noLightCarve,
            light_carve: raw.flag_lightCarve,
            no_optimize: raw.flag_noOpt,
            no_curves: raw.flag_noCurves,
            no_models: raw.flag_noModels,
            no_clip_sides: raw.flag_noClipSides,
            no_carve: raw.flag_noCarve,
            no_tjunc: raw.flag_noTjunc,
            no_cm: raw.flag_noCM,
            no_aas: raw.flag_noAAS,
            region: raw.flag_region,
        }
    }
}

/// Normalizes a bare map name the way id Software's compilers do: adds a
/// `maps/` prefix and a `.map`/`.reg` suffix if neither is already
/// present.
fn normalize_map_path(raw: &str) -> String {
    let with_suffix = if raw.ends_with(".map") || raw.ends_with(".reg") {
        raw.to_string()
    } else {
        format!("{}.map", raw)
    };

    if with_suffix.starts_with("maps/") {
        with_suffix
    } else {
        format!("maps/{}", with_suffix)
    }
}

fn run() -> Result<(), DmapError> {
    let raw: RawArgs = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .map_err(|e| DmapErrorKind::Usage(e.to_string()))?;

    let verbose = raw.flag_verbose;
    let mapfile = normalize_map_path(&raw.arg_mapfile);
    let options: CompileOptions = raw.into();

    if verbose {
        info!("compiling {} with options {:?}", mapfile, options);
    }

    // Reading entity/brush data from `mapfile` is outside this core's
    // scope; a front end that parses the map format would call
    // `dmap::compile_map` with the entities it loads.
    Err(DmapErrorKind::Usage(format!(
        "no map-format front end wired up; pass parsed entities to dmap::compile_map directly (requested: {})",
        mapfile
    ))
    .into())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}
