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

//! End-to-end compile scenarios exercising the whole pipeline
//! (`FaceBSP -> MakeTreePortals -> flood -> FloodAreas -> PutPrimitivesInAreas`)
//! against hand-built brush geometry, rather than any one stage in isolation.

extern crate cgmath;
extern crate dmap;

use cgmath::Vector3;

use dmap::content::ContentFlags;
use dmap::entity::{Epairs, EntityInput};
use dmap::error::DmapErrorKind;
use dmap::plane::PlaneRegistry;
use dmap::primitive::{Brush, BrushSide, Primitive};
use dmap::{compile_map, CompileOptions};

/// A solid, axis-aligned box as a single six-sided brush.
fn box_brush(
    mins: Vector3<f32>,
    maxs: Vector3<f32>,
    content: ContentFlags,
    entity_num: usize,
    planes: &mut PlaneRegistry,
) -> Brush {
    let mut brush = Brush::new(content, entity_num);
    let faces = [
        (Vector3::new(1.0, 0.0, 0.0), maxs.x),
        (Vector3::new(-1.0, 0.0, 0.0), -mins.x),
        (Vector3::new(0.0, 1.0, 0.0), maxs.y),
        (Vector3::new(0.0, -1.0, 0.0), -mins.y),
        (Vector3::new(0.0, 0.0, 1.0), maxs.z),
        (Vector3::new(0.0, 0.0, -1.0), -mins.z),
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

/// The six wall slabs of a hollow box enclosing `[inner_mins, inner_maxs]`
/// with `wall` thickness on every side, in -x/+x/-y/+y/-z/+z order.
fn shell_walls(
    inner_mins: Vector3<f32>,
    inner_maxs: Vector3<f32>,
    wall: f32,
    content: ContentFlags,
    entity_num: usize,
    planes: &mut PlaneRegistry,
) -> Vec<Brush> {
    let margin = Vector3::new(wall, wall, wall);
    let outer_mins = inner_mins - margin;
    let outer_maxs = inner_maxs + margin;

    vec![
        box_brush(
            outer_mins,
            Vector3::new(inner_mins.x, outer_maxs.y, outer_maxs.z),
            content,
            entity_num,
            planes,
        ),
        box_brush(
            Vector3::new(inner_maxs.x, outer_mins.y, outer_mins.z),
            outer_maxs,
            content,
            entity_num,
            planes,
        ),
        box_brush(
            outer_mins,
            Vector3::new(outer_maxs.x, inner_mins.y, outer_maxs.z),
            content,
            entity_num,
            planes,
        ),
        box_brush(
            Vector3::new(outer_mins.x, inner_maxs.y, outer_mins.z),
            outer_maxs,
            content,
            entity_num,
            planes,
        ),
        box_brush(
            outer_mins,
            Vector3::new(outer_maxs.x, outer_maxs.y, inner_mins.z),
            content,
            entity_num,
            planes,
        ),
        box_brush(
            Vector3::new(outer_mins.x, outer_mins.y, inner_maxs.z),
            outer_maxs,
            content,
            entity_num,
            planes,
        ),
    ]
}

fn solid() -> ContentFlags {
    ContentFlags::SOLID | ContentFlags::OPAQUE
}

fn point_entity(entity_num: usize, origin: Vector3<f32>) -> EntityInput {
    let mut epairs = Epairs::new();
    epairs.insert("origin", format!("{} {} {}", origin.x, origin.y, origin.z));
    EntityInput::new(entity_num, epairs)
}

/// Scenario 1: a single solid cube as worldspawn, no occupants. The
/// compile must succeed and produce exactly one entity output.
#[test]
fn scenario_unit_cube_worldspawn_compiles() {
    let mut planes = PlaneRegistry::new();
    let mut world = EntityInput::new(0, Epairs::new());
    world.primitives.push(Primitive::Brush(box_brush(
        Vector3::new(-16.0, -16.0, -16.0),
        Vector3::new(16.0, 16.0, 16.0),
        solid(),
        0,
        &mut planes,
    )));

    let outputs = compile_map(vec![world], planes, CompileOptions::default()).expect("compile should succeed");
    assert_eq!(outputs.len(), 1);
    assert!(!outputs[0].leaked);
}

/// Scenario 2: a fully-enclosed hollow room with an occupant inside it.
/// The flood must not leak and the occupied space must end up in some
/// area.
#[test]
fn scenario_hollow_room_with_occupant_does_not_leak() {
    let mut planes = PlaneRegistry::new();
    let mut world = EntityInput::new(0, Epairs::new());
    for wall in shell_walls(
        Vector3::new(-100.0, -100.0, -100.0),
        Vector3::new(100.0, 100.0, 100.0),
        16.0,
        solid(),
        0,
        &mut planes,
    ) {
        world.primitives.push(Primitive::Brush(wall));
    }

    let player_start = point_entity(1, Vector3::new(0.0, 0.0, 0.0));
    let outputs = compile_map(vec![world, player_start], planes, CompileOptions::default())
        .expect("an enclosed room with an occupant must not leak");

    let world_output = &outputs[0];
    assert!(!world_output.leaked);
    assert!(world_output.area_count() >= 1);
    assert!(world_output.area_primitives.iter().any(|frags| !frags.is_empty()));
}

/// Scenario 3: the same room with one wall missing leaks, and
/// `compile_map` reports it as a hard error for worldspawn rather than
/// silently continuing.
#[test]
fn scenario_hollow_room_missing_wall_leaks() {
    let mut planes = PlaneRegistry::new();
    let mut world = EntityInput::new(0, Epairs::new());
    let mut walls = shell_walls(
        Vector3::new(-100.0, -100.0, -100.0),
        Vector3::new(100.0, 100.0, 100.0),
        16.0,
        solid(),
        0,
        &mut planes,
    );
    walls.remove(0); // drop the -x wall, opening the room to the void
    for wall in walls {
        world.primitives.push(Primitive::Brush(wall));
    }

    let player_start = point_entity(1, Vector3::new(0.0, 0.0, 0.0));
    let err = compile_map(vec![world, player_start], planes, CompileOptions::default())
        .expect_err("a room missing a wall must leak");

    match err.kind() {
        DmapErrorKind::Leak { entity } => assert_eq!(entity, 0),
        other => panic!("expected a Leak error, got {:?}", other),
    }
}

/// Scenario 4: two rooms sharing a dividing wall with a doorway-sized
/// areaportal brush filling the gap. The compile must not leak (the
/// areaportal is passable to occupancy flood) and must produce at least
/// two distinct areas joined by an `InterAreaPortal`.
#[test]
fn scenario_two_rooms_joined_by_areaportal_produce_two_areas() {
    let mut planes = PlaneRegistry::new();
    let mut world = EntityInput::new(0, Epairs::new());

    let inner_mins = Vector3::new(-100.0, -50.0, -50.0);
    let inner_maxs = Vector3::new(100.0, 50.0, 50.0);
    for wall in shell_walls(inner_mins, inner_maxs, 8.0, solid(), 0, &mut planes) {
        world.primitives.push(Primitive::Brush(wall));
    }

    // Dividing wall at x in [-4, 4], with a doorway gap for y in [-15, 15].
    world.primitives.push(Primitive::Brush(box_brush(
        Vector3::new(-4.0, -50.0, -50.0),
        Vector3::new(4.0, -15.0, 50.0),
        solid(),
        0,
        &mut planes,
    )));
    world.primitives.push(Primitive::Brush(box_brush(
        Vector3::new(-4.0, 15.0, -50.0),
        Vector3::new(4.0, 50.0, 50.0),
        solid(),
        0,
        &mut planes,
    )));
    // Areaportal brush filling the doorway: passable, but an area boundary.
    world.primitives.push(Primitive::Brush(box_brush(
        Vector3::new(-4.0, -15.0, -50.0),
        Vector3::new(4.0, 15.0, 50.0),
        ContentFlags::AREAPORTAL,
        0,
        &mut planes,
    )));

    let occupant = point_entity(1, Vector3::new(-50.0, 0.0, 0.0));
    let outputs = compile_map(vec![world, occupant], planes, CompileOptions::default())
        .expect("two rooms joined by a doorway must not leak");

    let output = &outputs[0];
    assert!(!output.leaked);
    assert!(output.area_count() >= 2, "expected at least 2 areas, got {}", output.area_count());
    assert!(
        output
            .inter_area_portals
            .iter()
            .any(|p| p.area_a != p.area_b),
        "expected an InterAreaPortal connecting two distinct areas"
    );
}

/// Scenario 5: an oversized bar brush forces `FaceBSP` to perform cuts on
/// `CompileOptions::block_size` boundaries before the heuristic ever sees
/// a face, producing more than the two leaves a single convex brush would
/// otherwise need.
#[test]
fn scenario_oversized_bar_forces_block_splits() {
    let mut planes = PlaneRegistry::new();
    let mut world = EntityInput::new(0, Epairs::new());
    world.primitives.push(Primitive::Brush(box_brush(
        Vector3::new(-1500.0, -150.0, -150.0),
        Vector3::new(1500.0, 150.0, 150.0),
        solid(),
        0,
        &mut planes,
    )));

    let outputs = compile_map(vec![world], planes, CompileOptions::default()).expect("compile should succeed");
    let tree = &outputs[0].tree;
    assert!(
        tree.leaf_indices().len() > 2,
        "expected forced block splits to produce more than a trivial 2-leaf tree, got {}",
        tree.leaf_indices().len()
    );
}

/// Scenario 6: the alternative split-weight formula (`--altsplit`) must
/// still satisfy the universal invariants a sane compile relies on: the
/// same enclosed room compiles without leaking regardless of which
/// heuristic picked the splitting planes.
#[test]
fn scenario_altsplit_weights_preserve_universal_invariants() {
    let mut planes = PlaneRegistry::new();
    let mut world = EntityInput::new(0, Epairs::new());
    for wall in shell_walls(
        Vector3::new(-100.0, -100.0, -100.0),
        Vector3::new(100.0, 100.0, 100.0),
        16.0,
        solid(),
        0,
        &mut planes,
    ) {
        world.primitives.push(Primitive::Brush(wall));
    }

    let player_start = point_entity(1, Vector3::new(0.0, 0.0, 0.0));
    let mut options = CompileOptions::default();
    options.alt_split_weights = true;

    let outputs =
        compile_map(vec![world, player_start], planes, options).expect("altsplit must not change leak behavior");
    let output = &outputs[0];
    assert!(!output.leaked);
    for leaf_idx in output.tree.leaf_indices() {
        let leaf = output.tree.node(leaf_idx).leaf().unwrap();
        assert!(leaf.opaque || leaf.area >= 0, "every passable leaf must end up in some area");
    }
}
