// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC to GLB conversion pipeline.
//!
//! ```text
//! IFC bytes -> IfcApi (open, stream meshes) -> SceneAssembler -> SceneGraph
//!           -> SceneEncoder (GLB) -> named artifact -> bytes
//! ```
//!
//! [`Converter::convert`] is the single entry point. It yields the GLB bytes
//! or nothing; failures are logged through `tracing`, never returned.

pub mod assembler;
pub mod config;
pub mod converter;
pub mod encoder;
pub mod error;
pub mod export;

pub use assembler::SceneAssembler;
pub use config::Config;
pub use converter::{ConversionStats, Converter};
pub use encoder::{glb_file_name, Artifact, ExportArtifacts, GlbEncoder, SceneEncoder};
pub use error::{Error, Result};
pub use export::export_scene;
