// Copyright © 2018 Cormac O'Brien
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of this software
// and associated documentation files (the "Software"), to deal in the Software without
// restriction, including without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
// BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Map compiler core.
//!
//! Ingests brush and polygon-mesh primitives plus entity key/value data and
//! produces a partitioned, area-segmented BSP tree ready for a downstream
//! binary writer. See `compile::compile_map` for the orchestrator entry
//! point.

#[macro_use]
extern crate bitflags;
extern crate cgmath;
extern crate chrono;
extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
extern crate num;
#[macro_use]
extern crate num_derive;

pub mod area;
pub mod bsp;
pub mod clip;
pub mod compile;
pub mod content;
pub mod debugobj;
pub mod entity;
pub mod error;
pub mod flood;
pub mod math;
pub mod options;
pub mod plane;
pub mod portal;
pub mod primitive;
pub mod tjunc;
pub mod winding;

pub use crate::compile::{compile_map, CompileContext};
pub use crate::entity::{EntityInput, EntityOutput};
pub use crate::error::{DmapError, DmapErrorKind};
pub use crate::options::CompileOptions;
