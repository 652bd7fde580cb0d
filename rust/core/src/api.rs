// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser seam and the mesh records it yields.

use crate::error::Result;

/// Identity matrix in the flat 16-element transform layout
pub const IDENTITY_TRANSFORM: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Handle of a model opened by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelId(pub u32);

/// RGBA color, channels in 0-1 range
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as `[r, g, b, a]`
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// One placed occurrence of a geometry.
///
/// The vertex and index buffers are not carried here; they are fetched from
/// the parser with [`IfcApi::get_geometry`] using `geometry_id`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedGeometry {
    /// Express ID of the geometry entity
    pub geometry_id: u32,
    /// Flat 4x4 matrix, translation in elements 12..15
    pub transform: [f64; 16],
    /// Surface color of this occurrence
    pub color: Color,
}

impl PlacedGeometry {
    pub fn new(geometry_id: u32, transform: [f64; 16], color: Color) -> Self {
        Self {
            geometry_id,
            transform,
            color,
        }
    }
}

/// All placed geometries of one product (wall, slab, ...)
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlatMesh {
    /// Express ID of the product
    pub express_id: u32,
    pub geometries: Vec<PlacedGeometry>,
}

/// Lazy, single-pass sequence of mesh records for one model
pub type MeshStream<'a> = Box<dyn Iterator<Item = FlatMesh> + 'a>;

/// The operations consumed from an IFC parser.
///
/// Implementations own their native state; methods take `&self` and use
/// interior mutability where needed, so one parser can back a shared
/// [`ParserContext`](crate::ParserContext).
pub trait IfcApi {
    /// Parser-side geometry handle
    type Geometry;

    /// Load the parser runtime. Called until it succeeds once.
    fn init(&self) -> Result<()>;

    /// Open a model from raw IFC bytes
    fn open_model(&self, data: &[u8]) -> Result<ModelId>;

    /// Stream every product of the model in parser order
    fn stream_all_meshes(&self, model: ModelId) -> MeshStream<'_>;

    /// Look up a geometry by express ID
    fn get_geometry(&self, model: ModelId, geometry_id: u32) -> Option<Self::Geometry>;

    /// Interleaved vertex data, 6 floats per vertex (position then normal)
    fn vertex_array(&self, geometry: &Self::Geometry) -> Vec<f32>;

    /// Triangle indices
    fn index_array(&self, geometry: &Self::Geometry) -> Vec<u32>;

    /// Release native resources of an opened model
    fn close_model(&self, model: ModelId);
}
