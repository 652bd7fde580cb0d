// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The conversion entry point.

use crate::assembler::SceneAssembler;
use crate::config::Config;
use crate::encoder::{GlbEncoder, SceneEncoder};
use crate::error::Result;
use crate::export::export_scene;
use ifc_gltf_core::{IfcApi, ParserContext};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Size and timing of one successful conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    pub nodes: usize,
    pub geometry_nodes: usize,
    pub vertices: usize,
    pub triangles: usize,
    pub materials: usize,
    pub output_bytes: usize,
    pub assemble_time_ms: u64,
    pub export_time_ms: u64,
    pub total_time_ms: u64,
}

/// Converts IFC bytes into a GLB file.
///
/// Owns the parser context, so the parser is initialized at most once per
/// converter no matter how many models go through it.
pub struct Converter<P: IfcApi, E: SceneEncoder = GlbEncoder> {
    context: ParserContext<P>,
    encoder: E,
    config: Config,
}

impl<P: IfcApi> Converter<P> {
    /// Converter with default configuration and the GLB encoder
    pub fn new(api: P) -> Self {
        Self::with_config(api, Config::default())
    }

    pub fn with_config(api: P, config: Config) -> Self {
        let encoder = GlbEncoder::new(config.generator.as_str());
        Self::with_encoder(api, encoder, config)
    }
}

impl<P: IfcApi, E: SceneEncoder> Converter<P, E> {
    /// Converter with a custom encoder
    pub fn with_encoder(api: P, encoder: E, config: Config) -> Self {
        Self {
            context: ParserContext::new(api),
            encoder,
            config,
        }
    }

    #[inline]
    pub fn context(&self) -> &ParserContext<P> {
        &self.context
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert raw IFC bytes to GLB bytes, or nothing if any step fails
    pub fn convert(&self, data: &[u8]) -> Option<Vec<u8>> {
        self.convert_with_stats(data).map(|(glb, _)| glb)
    }

    /// [`convert`](Self::convert) plus statistics of the run
    pub fn convert_with_stats(&self, data: &[u8]) -> Option<(Vec<u8>, ConversionStats)> {
        match self.try_convert(data) {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::warn!(error = %e, "IFC to glTF conversion produced no output");
                None
            }
        }
    }

    fn try_convert(&self, data: &[u8]) -> Result<(Vec<u8>, ConversionStats)> {
        let total_start = Instant::now();
        tracing::info!(
            content_size = data.len(),
            artifact = %self.config.artifact_name(),
            "Starting IFC to glTF conversion"
        );

        // Closes the model on every return below
        let model = self.context.open(data)?;

        let assemble_start = Instant::now();
        let mut scene =
            SceneAssembler::new(self.config.root_name.as_str()).assemble(model.api(), model.id());
        scene.when_ready()?;
        let assemble_time = assemble_start.elapsed();

        let export_start = Instant::now();
        let exported = export_scene(&scene, &self.encoder, &self.config.file_stem);
        let export_time = export_start.elapsed();

        let scene_stats = scene.stats();
        drop(scene);
        model.close();
        let glb = exported?;

        let stats = ConversionStats {
            nodes: scene_stats.nodes,
            geometry_nodes: scene_stats.geometry_nodes,
            vertices: scene_stats.vertices,
            triangles: scene_stats.triangles,
            materials: scene_stats.materials,
            output_bytes: glb.len(),
            assemble_time_ms: assemble_time.as_millis() as u64,
            export_time_ms: export_time.as_millis() as u64,
            total_time_ms: total_start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            nodes = stats.nodes,
            geometry_nodes = stats.geometry_nodes,
            vertices = stats.vertices,
            triangles = stats.triangles,
            materials = stats.materials,
            output_bytes = stats.output_bytes,
            total_time_ms = stats.total_time_ms,
            "IFC to glTF conversion complete"
        );

        Ok((glb, stats))
    }
}
