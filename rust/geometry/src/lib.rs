// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-glTF Geometry
//!
//! Turns parser mesh records into an in-memory scene: de-interleaved vertex
//! data, decomposed instance transforms (nalgebra) and color-keyed shared
//! materials.

pub mod error;
pub mod material;
pub mod scene;
pub mod transform;
pub mod vertex;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, UnitQuaternion, Vector3};

pub use error::{Error, Result};
pub use material::{MaterialCache, MaterialDefinition, MaterialId, MaterialKey, MATERIAL_ROUGHNESS};
pub use scene::{MeshNode, NodeId, SceneGraph, SceneStats, TransformNode};
pub use transform::Trs;
pub use vertex::{decode_vertex_buffer, DecodedGeometry, FLOATS_PER_VERTEX};
