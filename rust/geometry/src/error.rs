// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::material::MaterialId;
use crate::scene::NodeId;
use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a scene
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Malformed vertex buffer: {len} floats is not a multiple of 6")]
    MalformedVertexBuffer { len: usize },

    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("Non-finite vertex component at float {offset}")]
    NonFiniteVertex { offset: usize },

    #[error("Transform matrix has a non-finite element at {element}")]
    NonFiniteTransform { element: usize },

    #[error("Node {node:?} references unknown material {material:?}")]
    UnknownMaterial { node: NodeId, material: MaterialId },

    #[error("Node {node:?} is parented to {parent:?} instead of the root")]
    UnknownParent { node: NodeId, parent: NodeId },

    #[error("Node {node:?} has {positions} position and {normals} normal floats")]
    GeometryMismatch {
        node: NodeId,
        positions: usize,
        normals: usize,
    },
}
