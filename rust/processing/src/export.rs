// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export: run the encoder and pull out the single GLB artifact.

use crate::encoder::{glb_file_name, Artifact, SceneEncoder};
use crate::error::{Error, Result};
use ifc_gltf_geometry::SceneGraph;

/// Encode `scene` and return the bytes of `<file_stem>.glb`.
///
/// The artifact must exist and be binary; other artifacts are dropped.
pub fn export_scene<E: SceneEncoder + ?Sized>(
    scene: &SceneGraph,
    encoder: &E,
    file_stem: &str,
) -> Result<Vec<u8>> {
    let name = glb_file_name(file_stem);
    let mut artifacts = encoder.encode(scene, file_stem)?;

    if artifacts.len() > 1 {
        let names: Vec<&str> = artifacts.names().collect();
        tracing::debug!(
            artifacts = ?names,
            expected = %name,
            "Encoder produced extra artifacts"
        );
    }

    match artifacts.take(&name) {
        Some(Artifact::Binary(bytes)) => Ok(bytes),
        Some(Artifact::Text(_)) => Err(Error::NotBinary(name)),
        None => Err(Error::MissingArtifact(name)),
    }
}
