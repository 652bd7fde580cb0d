// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex buffer decoding
//!
//! The parser hands out one interleaved float buffer per geometry:
//!
//! ```text
//! | px py pz nx ny nz | px py pz nx ny nz | ...
//! ```
//!
//! Exporters want positions and normals as separate arrays.

use crate::error::{Error, Result};
use nalgebra::Point3;

/// Floats per interleaved vertex: 3 position + 3 normal
pub const FLOATS_PER_VERTEX: usize = 6;

/// De-interleaved triangle geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedGeometry {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

/// Split an interleaved buffer into positions and normals.
///
/// Fails without producing anything if `vertices` is not a whole number of
/// vertices, holds a NaN or infinity, or an index points past the last
/// vertex. `indices` is kept as is.
pub fn decode_vertex_buffer(vertices: &[f32], indices: Vec<u32>) -> Result<DecodedGeometry> {
    if vertices.len() % FLOATS_PER_VERTEX != 0 {
        return Err(Error::MalformedVertexBuffer {
            len: vertices.len(),
        });
    }

    if let Some(offset) = vertices.iter().position(|v| !v.is_finite()) {
        return Err(Error::NonFiniteVertex { offset });
    }

    let vertex_count = vertices.len() / FLOATS_PER_VERTEX;
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(Error::IndexOutOfRange {
            index,
            vertex_count,
        });
    }

    let mut positions = Vec::with_capacity(vertex_count * 3);
    let mut normals = Vec::with_capacity(vertex_count * 3);
    for vertex in vertices.chunks_exact(FLOATS_PER_VERTEX) {
        positions.extend_from_slice(&vertex[..3]);
        normals.extend_from_slice(&vertex[3..]);
    }

    Ok(DecodedGeometry {
        positions,
        normals,
        indices,
    })
}

impl DecodedGeometry {
    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// No vertices or no triangles to draw
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Component-wise min and max corner of the positions, origin when empty
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        let mut points = self
            .positions
            .chunks_exact(3)
            .map(|p| Point3::new(p[0], p[1], p[2]));

        match points.next() {
            Some(first) => points.fold((first, first), |(lo, hi), p| (lo.inf(&p), hi.sup(&p))),
            None => (Point3::origin(), Point3::origin()),
        }
    }
}
