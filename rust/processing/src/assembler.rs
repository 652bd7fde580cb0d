// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene assembly: one mesh node per placed geometry of an opened model.

use ifc_gltf_core::{IfcApi, ModelId, PlacedGeometry};
use ifc_gltf_geometry::{decode_vertex_buffer, DecodedGeometry, MeshNode, SceneGraph};

/// Builds a [`SceneGraph`] from the parser's mesh stream.
///
/// Instances are independent of each other; a broken or missing geometry
/// only leaves its own node without geometry.
#[derive(Debug, Clone)]
pub struct SceneAssembler {
    root_name: String,
}

impl SceneAssembler {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
        }
    }

    /// Stream every mesh of `model` into a fresh scene
    pub fn assemble<P: IfcApi>(&self, api: &P, model: ModelId) -> SceneGraph {
        let mut scene = SceneGraph::new(self.root_name.as_str());
        let mut products = 0usize;
        let mut without_geometry = 0usize;

        for flat_mesh in api.stream_all_meshes(model) {
            products += 1;
            for placed in &flat_mesh.geometries {
                if !add_instance(api, model, &mut scene, placed) {
                    without_geometry += 1;
                }
            }
        }

        tracing::debug!(
            products = products,
            instances = scene.mesh_count(),
            without_geometry = without_geometry,
            materials = scene.materials().len(),
            "Scene assembled"
        );

        scene
    }
}

/// Add one node; returns whether it received geometry
fn add_instance<P: IfcApi>(
    api: &P,
    model: ModelId,
    scene: &mut SceneGraph,
    placed: &PlacedGeometry,
) -> bool {
    let material = scene.material_for(placed.color);
    let mut node = MeshNode::new(format!("id-{}", placed.geometry_id), material);
    node.geometry = load_geometry(api, model, placed.geometry_id);
    if let Err(e) = node.apply_flat_transform(&placed.transform) {
        tracing::warn!(
            geometry_id = placed.geometry_id,
            error = %e,
            "Ignoring unusable instance transform"
        );
    }

    let has_geometry = node.geometry.is_some();
    scene.add_mesh_node(node);
    has_geometry
}

/// Fetch and decode a geometry, `None` if it is missing, empty or malformed
fn load_geometry<P: IfcApi>(api: &P, model: ModelId, geometry_id: u32) -> Option<DecodedGeometry> {
    let Some(geometry) = api.get_geometry(model, geometry_id) else {
        tracing::debug!(geometry_id = geometry_id, "Geometry not found");
        return None;
    };

    let vertices = api.vertex_array(&geometry);
    let indices = api.index_array(&geometry);
    if vertices.is_empty() || indices.is_empty() {
        tracing::debug!(geometry_id = geometry_id, "Geometry has no vertex or index data");
        return None;
    }

    match decode_vertex_buffer(&vertices, indices) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(geometry_id = geometry_id, error = %e, "Skipping malformed geometry");
            None
        }
    }
}
