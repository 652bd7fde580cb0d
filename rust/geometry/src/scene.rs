// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory scene graph handed to the encoder.
//!
//! The hierarchy is one level deep: a single root transform node with every
//! mesh node as a direct child. Nodes point at materials and at their parent
//! through ids, so the graph owns everything in plain vectors.

use crate::error::{Error, Result};
use crate::material::{MaterialCache, MaterialDefinition, MaterialId};
use crate::transform::Trs;
use crate::vertex::DecodedGeometry;
use ifc_gltf_core::Color;

/// Node handle; [`SceneGraph::ROOT`] is the root, mesh nodes follow from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Transform-only node
#[derive(Debug, Clone)]
pub struct TransformNode {
    pub name: String,
    pub transform: Trs,
}

/// One placed mesh instance
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub name: String,
    /// `None` when the parser had no usable buffers for this instance
    pub geometry: Option<DecodedGeometry>,
    pub material: MaterialId,
    /// Local transform relative to `parent`
    pub transform: Trs,
    pub parent: NodeId,
}

impl MeshNode {
    /// Node under the root with no geometry and identity transform
    pub fn new(name: impl Into<String>, material: MaterialId) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            material,
            transform: Trs::identity(),
            parent: SceneGraph::ROOT,
        }
    }

    /// Replace the local transform with the decomposition of a flat matrix.
    ///
    /// A matrix with a NaN or infinite element is rejected and the current
    /// transform is left in place.
    pub fn apply_flat_transform(&mut self, matrix: &[f64; 16]) -> Result<()> {
        if let Some(element) = matrix.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFiniteTransform { element });
        }
        self.transform = Trs::from_flat_matrix(matrix);
        Ok(())
    }

    /// Geometry with at least one triangle
    #[inline]
    pub fn drawable_geometry(&self) -> Option<&DecodedGeometry> {
        self.geometry.as_ref().filter(|g| !g.is_empty())
    }
}

/// Scene size summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneStats {
    pub nodes: usize,
    pub geometry_nodes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub materials: usize,
}

/// Root node, mesh nodes and their materials
#[derive(Debug, Clone)]
pub struct SceneGraph {
    root: TransformNode,
    nodes: Vec<MeshNode>,
    materials: MaterialCache,
    ready: bool,
}

impl SceneGraph {
    pub const ROOT: NodeId = NodeId(0);

    /// Empty scene with a named root
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: TransformNode {
                name: root_name.into(),
                transform: Trs::identity(),
            },
            nodes: Vec::new(),
            materials: MaterialCache::new(),
            ready: false,
        }
    }

    #[inline]
    pub fn root(&self) -> &TransformNode {
        &self.root
    }

    /// Shared material for `color`
    #[inline]
    pub fn material_for(&mut self, color: Color) -> MaterialId {
        self.materials.get_or_create(color)
    }

    #[inline]
    pub fn material(&self, id: MaterialId) -> Option<&MaterialDefinition> {
        self.materials.get(id)
    }

    #[inline]
    pub fn materials(&self) -> &MaterialCache {
        &self.materials
    }

    /// Attach a mesh node; the scene needs another [`when_ready`](Self::when_ready)
    pub fn add_mesh_node(&mut self, node: MeshNode) -> NodeId {
        self.ready = false;
        self.nodes.push(node);
        NodeId(self.nodes.len() as u32)
    }

    /// Mesh node by id (`ROOT` is not a mesh node)
    pub fn node(&self, id: NodeId) -> Option<&MeshNode> {
        (id.0 as usize)
            .checked_sub(1)
            .and_then(|index| self.nodes.get(index))
    }

    /// Mesh nodes with their ids, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &MeshNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32 + 1), node))
    }

    #[inline]
    pub fn mesh_count(&self) -> usize {
        self.nodes.len()
    }

    /// Mesh nodes parented directly under the root
    pub fn children_of_root(&self) -> impl Iterator<Item = (NodeId, &MeshNode)> {
        self.nodes().filter(|(_, node)| node.parent == Self::ROOT)
    }

    /// Readiness barrier before export.
    ///
    /// Every node must reference a material of this scene, hang under the
    /// root, and carry matching position and normal arrays. Nothing in the
    /// scene is finalized lazily, so this returns as soon as it has checked.
    pub fn when_ready(&mut self) -> Result<()> {
        for (id, node) in self.nodes() {
            if self.materials.get(node.material).is_none() {
                return Err(Error::UnknownMaterial {
                    node: id,
                    material: node.material,
                });
            }
            if node.parent != Self::ROOT {
                return Err(Error::UnknownParent {
                    node: id,
                    parent: node.parent,
                });
            }
            if let Some(geometry) = &node.geometry {
                if geometry.positions.len() != geometry.normals.len() {
                    return Err(Error::GeometryMismatch {
                        node: id,
                        positions: geometry.positions.len(),
                        normals: geometry.normals.len(),
                    });
                }
            }
        }

        self.ready = true;
        Ok(())
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn stats(&self) -> SceneStats {
        let mut stats = SceneStats {
            nodes: self.nodes.len(),
            materials: self.materials.len(),
            ..Default::default()
        };
        for geometry in self.nodes.iter().filter_map(MeshNode::drawable_geometry) {
            stats.geometry_nodes += 1;
            stats.vertices += geometry.vertex_count();
            stats.triangles += geometry.triangle_count();
        }
        stats
    }
}
