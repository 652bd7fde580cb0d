// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene encoding into glTF 2.0 binary (GLB).
//!
//! Layout of the produced document:
//!
//! - one buffer (the GLB `BIN` chunk) holding every vertex and index array
//! - per distinct geometry/material pair: POSITION, NORMAL and index
//!   accessors and a single-primitive mesh
//! - one root node with every scene node as a direct child
//! - materials in [`MaterialCache`](ifc_gltf_geometry::MaterialCache) order,
//!   so material ids map 1:1 onto glTF material indices

use crate::error::{Error, Result};
use gltf::json;
use ifc_gltf_geometry::{DecodedGeometry, MaterialDefinition, MaterialId, SceneGraph, Trs};
use json::validation::Checked::Valid;
use json::validation::USize64;
use rustc_hash::{FxHashMap, FxHasher};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// GLB header plus the JSON chunk header
const GLB_PREAMBLE_LEN: usize = 12 + 8;
/// Header of the BIN chunk
const CHUNK_HEADER_LEN: usize = 8;
/// Transform components closer than this to identity are omitted
const IDENTITY_EPSILON: f64 = 1e-9;

/// Artifact file name for an export stem
pub fn glb_file_name(stem: &str) -> String {
    format!("{stem}.glb")
}

/// One encoder output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Binary(Vec<u8>),
    Text(String),
}

/// Named output files of one encoding run
#[derive(Debug, Clone, Default)]
pub struct ExportArtifacts {
    files: FxHashMap<String, Artifact>,
}

impl ExportArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, artifact: Artifact) {
        self.files.insert(name.into(), artifact);
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.files.get(name)
    }

    /// Remove and return an artifact
    pub fn take(&mut self, name: &str) -> Option<Artifact> {
        self.files.remove(name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

/// Serializes a ready scene into named artifacts
pub trait SceneEncoder {
    fn encode(&self, scene: &SceneGraph, file_stem: &str) -> Result<ExportArtifacts>;
}

/// glTF 2.0 binary encoder
#[derive(Debug, Clone)]
pub struct GlbEncoder {
    generator: String,
}

impl GlbEncoder {
    /// Encoder writing `generator` into `asset.generator`
    pub fn new(generator: impl Into<String>) -> Self {
        Self {
            generator: generator.into(),
        }
    }

    /// Encode a scene into GLB bytes
    pub fn encode_glb(&self, scene: &SceneGraph) -> Result<Vec<u8>> {
        if !scene.is_ready() {
            return Err(Error::SceneNotReady);
        }

        let mut builder = DocumentBuilder::new(&self.generator);
        for (_, material) in scene.materials().iter() {
            builder.push_material(material);
        }

        let mut children = Vec::with_capacity(scene.mesh_count());
        for (_, node) in scene.children_of_root() {
            let mesh = node
                .drawable_geometry()
                .map(|geometry| builder.mesh_for(geometry, node.material));
            let (translation, rotation, scale) = node_transform(&node.transform);
            children.push(builder.root.push(json::Node {
                mesh,
                name: Some(node.name.clone()),
                translation,
                rotation,
                scale,
                ..Default::default()
            }));
        }

        let root = scene.root();
        let (translation, rotation, scale) = node_transform(&root.transform);
        let root_node = builder.root.push(json::Node {
            // glTF forbids an empty children array
            children: (!children.is_empty()).then_some(children),
            name: Some(root.name.clone()),
            translation,
            rotation,
            scale,
            ..Default::default()
        });

        tracing::debug!(
            nodes = scene.mesh_count(),
            meshes = builder.root.meshes.len(),
            reused_meshes = builder.reused_meshes,
            materials = builder.root.materials.len(),
            bin_bytes = builder.bin.len(),
            "Encoding GLB"
        );

        builder.finish(root_node)
    }
}

impl SceneEncoder for GlbEncoder {
    fn encode(&self, scene: &SceneGraph, file_stem: &str) -> Result<ExportArtifacts> {
        let glb = self.encode_glb(scene)?;
        let mut artifacts = ExportArtifacts::new();
        artifacts.insert(glb_file_name(file_stem), Artifact::Binary(glb));
        Ok(artifacts)
    }
}

/// Accumulates the glTF document and its binary chunk
struct DocumentBuilder<'s> {
    root: json::Root,
    bin: Vec<u8>,
    buffer: Option<json::Index<json::Buffer>>,
    /// Key: (geometry content hash, material), Value: first geometry and its mesh
    mesh_cache: FxHashMap<(u64, MaterialId), (&'s DecodedGeometry, json::Index<json::Mesh>)>,
    reused_meshes: usize,
}

impl<'s> DocumentBuilder<'s> {
    fn new(generator: &str) -> Self {
        let mut root = json::Root::default();
        root.asset.generator = Some(generator.to_string());
        Self {
            root,
            bin: Vec::new(),
            buffer: None,
            mesh_cache: FxHashMap::default(),
            reused_meshes: 0,
        }
    }

    fn push_material(&mut self, material: &MaterialDefinition) {
        let [r, g, b] = material.base_color;
        let alpha_mode = if material.is_transparent() {
            json::material::AlphaMode::Blend
        } else {
            json::material::AlphaMode::Opaque
        };

        self.root.push(json::Material {
            name: Some(material.name.clone()),
            alpha_mode: Valid(alpha_mode),
            double_sided: material.double_sided,
            pbr_metallic_roughness: json::material::PbrMetallicRoughness {
                base_color_factor: json::material::PbrBaseColorFactor([
                    unit(r),
                    unit(g),
                    unit(b),
                    unit(material.opacity),
                ]),
                metallic_factor: json::material::StrengthFactor(0.0),
                roughness_factor: json::material::StrengthFactor(unit(material.roughness)),
                ..Default::default()
            },
            ..Default::default()
        });
    }

    /// Mesh for a geometry/material pair, shared when the pair repeats
    fn mesh_for(
        &mut self,
        geometry: &'s DecodedGeometry,
        material: MaterialId,
    ) -> json::Index<json::Mesh> {
        let key = (geometry_hash(geometry), material);
        if let Some((cached, mesh)) = self.mesh_cache.get(&key) {
            // Full comparison guards against hash collisions
            if *cached == geometry {
                self.reused_meshes += 1;
                return *mesh;
            }
        }

        let mesh = self.push_mesh(geometry, material);
        self.mesh_cache.entry(key).or_insert((geometry, mesh));
        mesh
    }

    fn push_mesh(
        &mut self,
        geometry: &DecodedGeometry,
        material: MaterialId,
    ) -> json::Index<json::Mesh> {
        let vertex_count = geometry.vertex_count();
        let (min, max) = geometry.bounds();

        let positions_view = self.push_view(
            geometry.positions.iter().flat_map(|v| v.to_le_bytes()),
            json::buffer::Target::ArrayBuffer,
        );
        let positions = self.push_accessor(
            positions_view,
            vertex_count,
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            Some((
                json::Value::from(vec![min.x, min.y, min.z]),
                json::Value::from(vec![max.x, max.y, max.z]),
            )),
        );

        let normals_view = self.push_view(
            geometry.normals.iter().flat_map(|v| v.to_le_bytes()),
            json::buffer::Target::ArrayBuffer,
        );
        let normals = self.push_accessor(
            normals_view,
            vertex_count,
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            None,
        );

        let indices_view = self.push_view(
            geometry.indices.iter().flat_map(|i| i.to_le_bytes()),
            json::buffer::Target::ElementArrayBuffer,
        );
        let indices = self.push_accessor(
            indices_view,
            geometry.indices.len(),
            json::accessor::ComponentType::U32,
            json::accessor::Type::Scalar,
            None,
        );

        let mut attributes = BTreeMap::new();
        attributes.insert(Valid(json::mesh::Semantic::Positions), positions);
        attributes.insert(Valid(json::mesh::Semantic::Normals), normals);

        let primitive = json::mesh::Primitive {
            attributes,
            extensions: Default::default(),
            extras: Default::default(),
            indices: Some(indices),
            material: Some(json::Index::new(material.0)),
            mode: Valid(json::mesh::Mode::Triangles),
            targets: None,
        };

        self.root.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            primitives: vec![primitive],
            weights: None,
        })
    }

    /// Append bytes to the BIN chunk as a new buffer view
    fn push_view(
        &mut self,
        bytes: impl Iterator<Item = u8>,
        target: json::buffer::Target,
    ) -> json::Index<json::buffer::View> {
        let buffer = match self.buffer {
            Some(buffer) => buffer,
            None => {
                let buffer = self.root.push(json::Buffer {
                    // Patched in finish()
                    byte_length: USize64(0),
                    extensions: Default::default(),
                    extras: Default::default(),
                    name: None,
                    uri: None,
                });
                self.buffer = Some(buffer);
                buffer
            }
        };

        // Every view starts on a 4-byte boundary
        pad_to_four(&mut self.bin, 0);
        let offset = self.bin.len();
        self.bin.extend(bytes);

        self.root.push(json::buffer::View {
            buffer,
            byte_length: USize64::from(self.bin.len() - offset),
            byte_offset: Some(USize64::from(offset)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(target)),
        })
    }

    fn push_accessor(
        &mut self,
        view: json::Index<json::buffer::View>,
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        bounds: Option<(json::Value, json::Value)>,
    ) -> json::Index<json::Accessor> {
        let (min, max) = match bounds {
            Some((min, max)) => (Some(min), Some(max)),
            None => (None, None),
        };

        self.root.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: Some(USize64(0)),
            count: USize64::from(count),
            component_type: Valid(json::accessor::GenericComponentType(component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        })
    }

    /// Write the JSON and BIN chunks into a GLB container
    fn finish(mut self, root_node: json::Index<json::Node>) -> Result<Vec<u8>> {
        let scene = self.root.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes: vec![root_node],
        });
        self.root.scene = Some(scene);

        pad_to_four(&mut self.bin, 0);
        if let Some(buffer) = self.buffer {
            self.root.buffers[buffer.value()].byte_length = USize64::from(self.bin.len());
        }

        let mut json_bytes = serde_json::to_vec(&self.root)?;
        pad_to_four(&mut json_bytes, b' ');

        let mut length = GLB_PREAMBLE_LEN + json_bytes.len();
        if !self.bin.is_empty() {
            length += CHUNK_HEADER_LEN + self.bin.len();
        }
        let length = u32::try_from(length).map_err(|_| Error::BufferTooLarge(length))?;

        let glb = gltf::binary::Glb {
            header: gltf::binary::Header {
                magic: *b"glTF",
                version: 2,
                length,
            },
            json: Cow::Owned(json_bytes),
            bin: (!self.bin.is_empty()).then_some(Cow::Owned(self.bin)),
        };
        Ok(glb.to_vec()?)
    }
}

/// Optional TRS fields of a glTF node; identity components are left out
fn node_transform(
    trs: &Trs,
) -> (
    Option<[f32; 3]>,
    Option<json::scene::UnitQuaternion>,
    Option<[f32; 3]>,
) {
    if trs.is_identity(IDENTITY_EPSILON) {
        return (None, None, None);
    }
    let translation =
        (trs.translation.norm() > IDENTITY_EPSILON).then(|| trs.translation_f32());
    let rotation = (trs.rotation.angle() > IDENTITY_EPSILON)
        .then(|| json::scene::UnitQuaternion(trs.rotation_f32()));
    let scale = (trs.scale.iter().any(|s| (s - 1.0).abs() > IDENTITY_EPSILON))
        .then(|| trs.scale_f32());
    (translation, rotation, scale)
}

/// Hash of geometry content, FxHasher since collisions are re-checked
fn geometry_hash(geometry: &DecodedGeometry) -> u64 {
    let mut hasher = FxHasher::default();

    // Lengths first for fast rejection
    geometry.positions.len().hash(&mut hasher);
    geometry.indices.len().hash(&mut hasher);

    for value in geometry.positions.iter().chain(&geometry.normals) {
        value.to_bits().hash(&mut hasher);
    }
    geometry.indices.hash(&mut hasher);

    hasher.finish()
}

/// Pad with `fill` up to the next multiple of four
#[inline]
fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    let padded = (bytes.len() + 3) & !3;
    bytes.resize(padded, fill);
}

/// Clamp into 0-1, NaN to 0
#[inline]
fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
