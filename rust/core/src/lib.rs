// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-glTF Core
//!
//! The parser-facing half of the IFC to glTF converter. An IFC parser is
//! consumed through the [`IfcApi`] trait; this crate defines the records it
//! yields and owns the lifecycle around it.
//!
//! ## Overview
//!
//! - **Mesh records**: [`FlatMesh`] groups the [`PlacedGeometry`] instances of
//!   one product, each with a flat 4x4 transform and an RGBA [`Color`]
//! - **Initialization**: [`ParserContext`] runs the parser's one-time setup with
//!   an explicit [`InitState`], retrying after a failed attempt
//! - **Model lifetime**: [`ModelGuard`] closes an opened model exactly once,
//!   on every exit path
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_gltf_core::ParserContext;
//!
//! let context = ParserContext::new(my_parser);
//! let model = context.open(&bytes)?;
//! for flat_mesh in model.api().stream_all_meshes(model.id()) {
//!     for placed in &flat_mesh.geometries {
//!         println!("geometry #{} color {:?}", placed.geometry_id, placed.color);
//!     }
//! }
//! // model is closed when the guard drops
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for mesh records

pub mod api;
pub mod context;
pub mod error;

pub use api::{Color, FlatMesh, IfcApi, MeshStream, ModelId, PlacedGeometry, IDENTITY_TRANSFORM};
pub use context::{InitState, ModelGuard, ParserContext};
pub use error::{Error, Result};
