// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Converter configuration, optionally loaded from environment variables.

/// Converter configuration.
///
/// Fixed when the [`Converter`](crate::Converter) is built; a conversion
/// call takes no options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Stem of the exported artifact (`<stem>.glb`).
    pub file_stem: String,
    /// Name of the root node all mesh nodes hang under.
    pub root_name: String,
    /// `asset.generator` written into the glTF document.
    pub generator: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// - `IFC_GLTF_FILE_STEM` (default `file`)
    /// - `IFC_GLTF_ROOT_NAME` (default `module`)
    /// - `IFC_GLTF_GENERATOR` (default `ifc-gltf <version>`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            file_stem: env_or("IFC_GLTF_FILE_STEM", defaults.file_stem),
            root_name: env_or("IFC_GLTF_ROOT_NAME", defaults.root_name),
            generator: env_or("IFC_GLTF_GENERATOR", defaults.generator),
        }
    }

    /// File name of the artifact the export step extracts.
    pub fn artifact_name(&self) -> String {
        crate::encoder::glb_file_name(&self.file_stem)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file_stem: "file".into(),
            root_name: "module".into(),
            generator: concat!("ifc-gltf ", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// Non-blank environment value or the default
fn env_or(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
}
