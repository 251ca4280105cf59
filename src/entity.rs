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

//! The per-entity compilation unit (`uEntity` in `spec.md` §3).

use std::collections::HashMap;

use cgmath::Vector3;

use crate::area::InterAreaPortal;
use crate::bsp::BspTree;
use crate::primitive::{MeshPrimitive, Primitive};

/// Entity key/value dictionary.
#[derive(Clone, Debug, Default)]
pub struct Epairs {
    pairs: HashMap<String, String>,
}

impl Epairs {
    pub fn new() -> Epairs {
        Epairs {
            pairs: HashMap::new(),
        }
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.pairs.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs.get(key).map(String::as_str)
    }

    pub fn origin(&self) -> Vector3<f32> {
        match self.get("origin") {
            Some(s) => {
                let mut it = s.split_whitespace().filter_map(|t| t.parse::<f32>().ok());
                let x = it.next().unwrap_or(0.0);
                let y = it.next().unwrap_or(0.0);
                let z = it.next().unwrap_or(0.0);
                Vector3::new(x, y, z)
            }
            None => Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

/// Source primitives for one entity, plus its key/value dictionary.
/// Worldspawn (entity 0) is structural and flood-fills the whole level;
/// other entities are submodels, each flood-filled from its own center.
#[derive(Clone, Debug)]
pub struct EntityInput {
    pub entity_num: usize,
    pub epairs: Epairs,
    pub primitives: Vec<Primitive>,
}

impl EntityInput {
    pub fn new(entity_num: usize, epairs: Epairs) -> EntityInput {
        EntityInput {
            entity_num,
            epairs,
            primitives: Vec::new(),
        }
    }

    pub fn is_worldspawn(&self) -> bool {
        self.entity_num == 0
    }

    pub fn has_brushes(&self) -> bool {
        self.primitives
            .iter()
            .any(|p| matches!(p, Primitive::Brush(_)))
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshPrimitive> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Mesh(m) => Some(m),
            _ => None,
        })
    }
}

/// Produced tree plus per-area output primitive buckets for one entity.
#[derive(Debug)]
pub struct EntityOutput {
    pub entity_num: usize,
    pub tree: BspTree,
    /// `area_primitives[area_id]` is the set of surviving fragments
    /// (as windings on a brush-side or mesh-triangle plane) assigned to
    /// that area by `PutPrimitivesInAreas`.
    pub area_primitives: Vec<Vec<crate::clip::PlacedFragment>>,
    pub inter_area_portals: Vec<InterAreaPortal>,
    pub leaked: bool,
}

impl EntityOutput {
    pub fn area_count(&self) -> usize {
        self.area_primitives.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_epairs_origin_defaults_to_zero() {
        let e = Epairs::new();
        assert_eq!(e.origin(), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_epairs_origin_parses() {
        let mut e = Epairs::new();
        e.insert("origin", "1 2 3");
        assert_eq!(e.origin(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_worldspawn_is_entity_zero() {
        let e = EntityInput::new(0, Epairs::new());
        assert!(e.is_worldspawn());
        let e2 = EntityInput::new(1, Epairs::new());
        assert!(!e2.is_worldspawn());
    }
}
