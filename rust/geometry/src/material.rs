// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color-keyed material deduplication
//!
//! Large models place tens of thousands of instances but use a handful of
//! surface colors. Colors are quantized to 8 bits per channel and every
//! instance whose color lands on the same key shares one material.

use ifc_gltf_core::Color;
use rustc_hash::FxHashMap;

/// Roughness applied to every converted material
pub const MATERIAL_ROUGHNESS: f32 = 0.8;

/// Quantized RGBA color used as the deduplication key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialKey(pub [u8; 4]);

impl MaterialKey {
    /// `floor(channel * 256)` per channel, clamped into `0..=255`
    #[inline]
    pub fn from_color(color: Color) -> Self {
        Self(color.to_array().map(quantize_channel))
    }
}

#[inline]
fn quantize_channel(channel: f32) -> u8 {
    // 1.0 lands on 256; NaN survives the clamp and casts to 0
    (channel * 256.0).floor().clamp(0.0, 255.0) as u8
}

/// Round to two decimals with ties away from zero.
///
/// `{:.2}` alone rounds exact ties to even (0.125 -> "0.12").
#[inline]
fn hundredths(channel: f32) -> f64 {
    (f64::from(channel) * 100.0).round() / 100.0
}

/// Handle of a material inside its [`MaterialCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

impl MaterialId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Shared surface definition, immutable once created
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDefinition {
    /// `r-g-b-a` of the first color seen for this key, two decimals each
    pub name: String,
    pub base_color: [f32; 3],
    pub opacity: f32,
    pub roughness: f32,
    pub double_sided: bool,
}

impl MaterialDefinition {
    /// Build a material from an unquantized color
    pub fn from_color(color: Color) -> Self {
        Self {
            name: format!(
                "{:.2}-{:.2}-{:.2}-{:.2}",
                hundredths(color.r),
                hundredths(color.g),
                hundredths(color.b),
                hundredths(color.a)
            ),
            base_color: [color.r, color.g, color.b],
            opacity: color.a,
            roughness: MATERIAL_ROUGHNESS,
            double_sided: true,
        }
    }

    /// Needs alpha blending
    #[inline]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Materials of one scene, keyed by quantized color
#[derive(Debug, Clone, Default)]
pub struct MaterialCache {
    by_key: FxHashMap<MaterialKey, MaterialId>,
    materials: Vec<MaterialDefinition>,
}

impl MaterialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the material for `color`, creating it on first use.
    ///
    /// Colors with the same [`MaterialKey`] always get the same id.
    pub fn get_or_create(&mut self, color: Color) -> MaterialId {
        let key = MaterialKey::from_color(color);

        // Check cache first
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }

        // Cache miss - create and remember
        let id = MaterialId(self.materials.len() as u32);
        let material = MaterialDefinition::from_color(color);
        tracing::trace!(material = %material.name, key = ?key.0, "Created material");
        self.materials.push(material);
        self.by_key.insert(key, id);
        id
    }

    #[inline]
    pub fn get(&self, id: MaterialId) -> Option<&MaterialDefinition> {
        self.materials.get(id.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Materials in creation order
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &MaterialDefinition)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, material)| (MaterialId(i as u32), material))
    }
}
