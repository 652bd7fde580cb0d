// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the conversion pipeline.

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors. The public [`Converter::convert`](crate::Converter::convert)
/// turns every one of these into an absent result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Parser error: {0}")]
    Parser(#[from] ifc_gltf_core::Error),

    #[error("Scene error: {0}")]
    Scene(#[from] ifc_gltf_geometry::Error),

    #[error("Scene is not ready for export")]
    SceneNotReady,

    #[error("glTF JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GLB encoding failed: {0}")]
    Glb(#[from] gltf::Error),

    #[error("Binary buffer too large for GLB: {0} bytes")]
    BufferTooLarge(usize),

    #[error("Export artifact missing: {0}")]
    MissingArtifact(String),

    #[error("Export artifact is not binary: {0}")]
    NotBinary(String),
}
