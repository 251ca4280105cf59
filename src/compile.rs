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

//! Compile context and the top-level per-entity pipeline (C11/C12):
//! `makeStructuralFaceList -> FaceBSP -> MakeTreePortals -> flood ->
//! FillOutside -> ClipSidesByTree -> FloodAreas -> PutPrimitivesInAreas ->
//! FixTjunctions`.

use std::collections::HashMap;

use crate::area::{flood_areas, mark_area_portal_leaves};
use crate::bsp::{face_bsp, BspFace};
use crate::clip::put_primitives_in_areas;
use crate::entity::{EntityInput, EntityOutput};
use crate::error::{DmapError, DmapErrorKind};
use crate::flood::{fill_outside, filter_brushes_into_tree, flood_entities};
use crate::math::bounds;
use crate::options::CompileOptions;
use crate::plane::{PlaneIndex, PlaneRegistry};
use crate::portal::make_tree_portals;
use crate::primitive::Primitive;
use crate::tjunc::fix_global_tjunctions;

/// Replaces id Tech 4's global `dmapGlobals`: every piece of mutable
/// compile state lives here instead, explicitly threaded through each
/// stage. The plane registry and the split-usage counter persist across
/// entities; everything else resets at an entity boundary.
pub struct CompileContext {
    pub options: CompileOptions,
    pub planes: PlaneRegistry,
    pub split_counter: HashMap<PlaneIndex, u32>,
    pub node_count: usize,
    pub leaf_count: usize,
    pub fatal: bool,
}

impl CompileContext {
    /// `planes` must be the same registry used to build every brush side
    /// plane index in the entities this context will compile — a map
    /// front end populates it via `PlaneRegistry::find_or_insert_oriented`
    /// while parsing brush definitions, then hands both to `compile_map`.
    pub fn new(options: CompileOptions, planes: PlaneRegistry) -> CompileContext {
        CompileContext {
            options,
            planes,
            split_counter: HashMap::new(),
            node_count: 0,
            leaf_count: 0,
            fatal: false,
        }
    }

    /// Resets the per-entity counters. The plane registry and
    /// split-usage counter are process-wide and are left untouched.
    pub fn begin_entity(&mut self) {
        self.node_count = 0;
        self.leaf_count = 0;
        self.fatal = false;
    }
}

/// Compiles every entity in `entities` into a `BspTree` plus per-area
/// output geometry. Entity 0 (worldspawn) is expected to be structural
/// and is flooded from every other entity's origin; later entities are
/// submodels flooded from their own origin.
///
/// `planes` must already contain every plane referenced by `entities`'
/// brush sides (see `CompileContext::new`).
pub fn compile_map(
    entities: Vec<EntityInput>,
    planes: PlaneRegistry,
    options: CompileOptions,
) -> Result<Vec<EntityOutput>, DmapError> {
    let mut ctx = CompileContext::new(options, planes);

    let occupant_origins: Vec<_> = entities
        .iter()
        .filter(|e| !e.is_worldspawn())
        .map(|e| e.epairs.origin())
        .collect();

    let mut outputs = Vec::with_capacity(entities.len());
    let started = chrono::Local::now();

    for entity in &entities {
        ctx.begin_entity();

        let own_origin = vec![entity.epairs.origin()];
        let occupants: &[cgmath::Vector3<f32>] = if entity.is_worldspawn() {
            &occupant_origins
        } else {
            &own_origin
        };

        if ctx.options.draw {
            info!("entity {}: starting compile", entity.entity_num);
        }
        let output = compile_entity(entity, occupants, &mut ctx)?;
        outputs.push(output);
    }

    if ctx.options.verbose {
        let elapsed = chrono::Local::now().signed_duration_since(started);
        info!("compiled {} entities in {} ms", outputs.len(), elapsed.num_milliseconds());
    }

    Ok(outputs)
}

fn compile_entity(
    entity: &EntityInput,
    occupant_origins: &[cgmath::Vector3<f32>],
    ctx: &mut CompileContext,
) -> Result<EntityOutput, DmapError> {
    let mut materialized = entity.clone();
    for (i, prim) in materialized.primitives.iter_mut().enumerate() {
        if let Primitive::Brush(b) = prim {
            b.materialize_windings(&ctx.planes);
            if !b.is_well_formed() {
                warn!(
                    "entity {} brush {} has no surviving sides after clipping, dropping it",
                    entity.entity_num, i
                );
            }
        }
    }

    let faces = make_structural_face_list(&materialized);
    if faces.is_empty() && !materialized.has_brushes() {
        debug!("entity {} has no structural geometry", entity.entity_num);
    }

    let tree_bounds = structural_bounds(&faces);
    let simple_bsp = !materialized.is_worldspawn();

    let mut tree = face_bsp(
        faces,
        tree_bounds,
        &mut ctx.planes,
        ctx.options.block_size,
        ctx.options.alt_split_weights,
        simple_bsp,
        &mut ctx.split_counter,
    );

    ctx.node_count = tree.nodes.len();
    ctx.leaf_count = tree.leaf_indices().len();

    filter_brushes_into_tree(&mut tree, &materialized, &ctx.planes);
    make_tree_portals(&mut tree, &mut ctx.planes);

    let flood = if ctx.options.no_flood {
        None
    } else {
        Some(flood_entities(&mut tree, &ctx.planes, occupant_origins))
    };

    let leaked = match &flood {
        Some(f) => f.leaked,
        None => false,
    };

    if leaked && materialized.is_worldspawn() {
        return Err(DmapErrorKind::Leak {
            entity: entity.entity_num,
        }
        .into());
    }

    if !ctx.options.no_flood && !leaked {
        fill_outside(&mut tree);
    }

    tree.number_leaves();

    // Leaves never reached by any occupant (or left entirely unflooded
    // under `no_flood`) still need an area so downstream stages have
    // somewhere to place their bordering geometry.
    assign_fallback_area(&mut tree);

    mark_area_portal_leaves(&mut tree, &materialized, &ctx.planes);
    let (inter_area_portals, invalid_sides) = flood_areas(&mut tree);

    for side in &invalid_sides {
        warn!(
            "entity {} areaportal brush {} does not separate exactly two areas",
            entity.entity_num, side
        );
    }

    let area_count = tree
        .leaf_indices()
        .iter()
        .filter_map(|&idx| tree.node(idx).leaf())
        .filter(|l| !l.opaque)
        .map(|l| l.area)
        .max()
        .map(|m| (m + 1) as usize)
        .unwrap_or(0);

    let area_primitives = if ctx.options.no_clip_sides {
        Vec::new()
    } else {
        let mut areas = put_primitives_in_areas(&materialized, &tree, &ctx.planes, area_count);
        if !ctx.options.no_tjunc {
            fix_global_tjunctions(&mut areas);
        }
        areas
    };

    Ok(EntityOutput {
        entity_num: entity.entity_num,
        tree,
        area_primitives,
        inter_area_portals,
        leaked,
    })
}

/// Leaves that never get reached by `flood_areas`' own traversal (because
/// they were marked opaque, or flooding was skipped) still need an area
/// so `PutPrimitivesInAreas` can place their bordering geometry somewhere
/// rather than silently dropping it.
fn assign_fallback_area(tree: &mut crate::bsp::BspTree) {
    for idx in tree.leaf_indices() {
        if let Some(leaf) = tree.node_mut(idx).leaf_mut() {
            if leaf.area < 0 && !leaf.opaque {
                leaf.area = 0;
            }
        }
    }
}

fn make_structural_face_list(entity: &EntityInput) -> Vec<BspFace> {
    let mut faces = Vec::new();

    for (i, prim) in entity.primitives.iter().enumerate() {
        match prim {
            Primitive::Brush(b) => {
                for side in &b.sides {
                    if let Some(winding) = &side.winding {
                        faces.push(BspFace {
                            winding: winding.clone(),
                            plane: side.plane,
                            portal: b.is_areaportal(),
                            simple_bsp: b.simple_bsp,
                            source_primitive: i,
                        });
                    }
                }
            }
            Primitive::Mesh(m) => {
                for tri in &m.triangles {
                    faces.push(BspFace {
                        winding: crate::winding::Winding::new(tri.vertices.to_vec()),
                        plane: tri.plane,
                        portal: m.is_areaportal(),
                        simple_bsp: false,
                        source_primitive: i,
                    });
                }
            }
        }
    }

    faces
}

fn structural_bounds(faces: &[BspFace]) -> (cgmath::Vector3<f32>, cgmath::Vector3<f32>) {
    if faces.is_empty() {
        return (
            cgmath::Vector3::new(-8192.0, -8192.0, -8192.0),
            cgmath::Vector3::new(8192.0, 8192.0, 8192.0),
        );
    }

    let all_points: Vec<_> = faces.iter().flat_map(|f| f.winding.points().iter().cloned()).collect();
    let (mins, maxs) = bounds(&all_points);
    // pad so boundary faces are strictly interior to the root volume.
    let pad = cgmath::Vector3::new(1.0, 1.0, 1.0);
    (mins - pad, maxs + pad)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::content::ContentFlags;
    use crate::entity::Epairs;
    use crate::primitive::{Brush, BrushSide};
    use cgmath::Vector3;

    fn cube_entity(entity_num: usize, content: ContentFlags, planes: &mut PlaneRegistry) -> EntityInput {
        let mut e = EntityInput::new(entity_num, Epairs::new());
        let mut brush = Brush::new(content, entity_num);
        let faces = [
            (Vector3::new(1.0, 0.0, 0.0), 16.0),
            (Vector3::new(-1.0, 0.0, 0.0), 16.0),
            (Vector3::new(0.0, 1.0, 0.0), 16.0),
            (Vector3::new(0.0, -1.0, 0.0), 16.0),
            (Vector3::new(0.0, 0.0, 1.0), 16.0),
            (Vector3::new(0.0, 0.0, -1.0), 16.0),
        ];
        for (normal, dist) in faces.iter() {
            let idx = planes.find_or_insert_oriented(*normal, *dist);
            brush.sides.push(BrushSide {
                plane: idx,
                winding: None,
                material: 0,
            });
        }
        e.primitives.push(Primitive::Brush(brush));
        e
    }

    #[test]
    fn test_compile_map_hollow_cube_worldspawn_no_occupants() {
        let mut planes = PlaneRegistry::new();
        let world = cube_entity(0, ContentFlags::SOLID | ContentFlags::OPAQUE, &mut planes);
        let result = compile_map(vec![world], planes, CompileOptions::default());
        assert!(result.is_ok());
        let outputs = result.unwrap();
        assert_eq!(outputs.len(), 1);
    }
}
