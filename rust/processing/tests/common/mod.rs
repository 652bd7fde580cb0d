// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory parser standing in for a real IFC runtime.

#![allow(dead_code)]

use ifc_gltf_core::{
    Color, Error, FlatMesh, IfcApi, MeshStream, ModelId, PlacedGeometry, Result,
    IDENTITY_TRANSFORM,
};
use std::cell::Cell;
use std::collections::HashMap;

/// Interleaved buffers of one geometry
#[derive(Debug, Clone)]
pub struct FakeGeometry {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

/// Parser serving a fixed model and counting lifecycle calls
#[derive(Default)]
pub struct FakeIfc {
    pub meshes: Vec<FlatMesh>,
    pub geometries: HashMap<u32, FakeGeometry>,
    pub reject_open: bool,
    pub init_failures_left: Cell<u32>,
    pub init_calls: Cell<u32>,
    pub open_calls: Cell<u32>,
    pub close_calls: Cell<u32>,
}

impl FakeIfc {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interleaved geometry under `geometry_id`
    pub fn with_geometry(mut self, geometry_id: u32, vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        self.geometries
            .insert(geometry_id, FakeGeometry { vertices, indices });
        self
    }

    /// Add a product with one placed geometry
    pub fn with_instance(mut self, geometry_id: u32, transform: [f64; 16], color: Color) -> Self {
        let express_id = self.meshes.len() as u32 + 1000;
        self.meshes.push(FlatMesh {
            express_id,
            geometries: vec![PlacedGeometry::new(geometry_id, transform, color)],
        });
        self
    }

    pub fn rejecting_open(mut self) -> Self {
        self.reject_open = true;
        self
    }

    pub fn failing_init(self, times: u32) -> Self {
        self.init_failures_left.set(times);
        self
    }
}

impl IfcApi for FakeIfc {
    type Geometry = FakeGeometry;

    fn init(&self) -> Result<()> {
        self.init_calls.set(self.init_calls.get() + 1);
        let left = self.init_failures_left.get();
        if left > 0 {
            self.init_failures_left.set(left - 1);
            return Err(Error::InitFailed("wasm runtime unavailable".into()));
        }
        Ok(())
    }

    fn open_model(&self, data: &[u8]) -> Result<ModelId> {
        self.open_calls.set(self.open_calls.get() + 1);
        if self.reject_open || !data.starts_with(b"ISO-10303-21") {
            return Err(Error::OpenFailed("not a STEP file".into()));
        }
        Ok(ModelId(self.open_calls.get()))
    }

    fn stream_all_meshes(&self, _model: ModelId) -> MeshStream<'_> {
        Box::new(self.meshes.iter().cloned())
    }

    fn get_geometry(&self, _model: ModelId, geometry_id: u32) -> Option<FakeGeometry> {
        self.geometries.get(&geometry_id).cloned()
    }

    fn vertex_array(&self, geometry: &FakeGeometry) -> Vec<f32> {
        geometry.vertices.clone()
    }

    fn index_array(&self, geometry: &FakeGeometry) -> Vec<u32> {
        geometry.indices.clone()
    }

    fn close_model(&self, _model: ModelId) {
        self.close_calls.set(self.close_calls.get() + 1);
    }
}

/// Minimal STEP payload accepted by [`FakeIfc`]
pub const IFC_BYTES: &[u8] = b"ISO-10303-21;\nHEADER;\nENDSEC;\nDATA;\nENDSEC;\nEND-ISO-10303-21;\n";

/// Interleaved unit cube: 8 corners, outward-ish normals, 12 triangles
pub fn unit_cube() -> (Vec<f32>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(8 * 6);
    for x in [0.0f32, 1.0] {
        for y in [0.0f32, 1.0] {
            for z in [0.0f32, 1.0] {
                let n = [x * 2.0 - 1.0, y * 2.0 - 1.0, z * 2.0 - 1.0];
                let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
                vertices.extend_from_slice(&[x, y, z, n[0] / len, n[1] / len, n[2] / len]);
            }
        }
    }
    let indices = vec![
        0, 1, 3, 0, 3, 2, // x = 0
        4, 6, 7, 4, 7, 5, // x = 1
        0, 4, 5, 0, 5, 1, // y = 0
        2, 3, 7, 2, 7, 6, // y = 1
        0, 2, 6, 0, 6, 4, // z = 0
        1, 5, 7, 1, 7, 3, // z = 1
    ];
    (vertices, indices)
}

/// Flat transform translating by `(x, y, z)`
pub fn translation(x: f64, y: f64, z: f64) -> [f64; 16] {
    let mut matrix = IDENTITY_TRANSFORM;
    matrix[12] = x;
    matrix[13] = y;
    matrix[14] = z;
    matrix
}
