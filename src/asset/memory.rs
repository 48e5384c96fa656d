//! In-memory asset pipeline used by the unit tests

use chrono::{DateTime, Utc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{AssetError, AssetPipeline, TextureImportSettings, TextureState};
use crate::color::{RawTexture, TextureFormat};
use crate::state::data::{ImageLibrary, ReferenceImage, TextureId};

struct MemoryTexture {
    name: String,
    width: u32,
    height: u32,
    natural: TextureFormat,
    /// Source pixels, RGBA32
    rgba: Vec<u8>,
}

#[derive(Default)]
pub struct MemoryAssets {
    libraries: Vec<(ImageLibrary, DateTime<Utc>)>,
    textures: HashMap<TextureId, MemoryTexture>,
    settings: RefCell<HashMap<TextureId, TextureImportSettings>>,
    applied: RefCell<HashMap<TextureId, usize>>,
    reads: Cell<usize>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a texture filled with a gradient so every image is distinct
    pub fn add_texture(&mut self, name: &str, width: u32, height: u32, natural: TextureFormat) -> TextureId {
        let seed = self.textures.len() as u8;
        let rgba = (0..width * height)
            .flat_map(|i| {
                let v = (i as u8).wrapping_mul(17).wrapping_add(seed.wrapping_mul(31));
                [v, v.wrapping_add(1), v.wrapping_add(2), 255]
            })
            .collect();
        self.add_texture_with_pixels(name, width, height, natural, rgba)
    }

    pub fn add_texture_with_pixels(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        natural: TextureFormat,
        rgba: Vec<u8>,
    ) -> TextureId {
        let id = TextureId(format!("textures/{name}.png"));
        self.textures.insert(
            id.clone(),
            MemoryTexture {
                name: name.to_string(),
                width,
                height,
                natural,
                rgba,
            },
        );
        id
    }

    pub fn add_library(&mut self, id: &str, name: &str, images: Vec<ReferenceImage>, timestamp: DateTime<Utc>) {
        self.libraries.push((
            ImageLibrary {
                id: id.to_string(),
                name: name.to_string(),
                images,
            },
            timestamp,
        ));
    }

    pub fn remove_library(&mut self, id: &str) {
        self.libraries.retain(|(library, _)| library.id != id);
    }

    pub fn touch_library(&mut self, id: &str, timestamp: DateTime<Utc>) {
        for (library, stamp) in &mut self.libraries {
            if library.id == id {
                *stamp = timestamp;
            }
        }
    }

    pub fn set_settings(&mut self, texture: &TextureId, settings: TextureImportSettings) {
        self.settings.borrow_mut().insert(texture.clone(), settings);
    }

    /// How many times import settings were applied to a texture
    pub fn applied(&self, texture: &TextureId) -> usize {
        self.applied.borrow().get(texture).copied().unwrap_or(0)
    }

    /// Total number of raw pixel reads
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    fn texture(&self, texture: &TextureId) -> Result<&MemoryTexture, AssetError> {
        self.textures
            .get(texture)
            .ok_or_else(|| AssetError::MissingTexture(texture.to_string()))
    }
}

impl AssetPipeline for MemoryAssets {
    fn libraries(&self) -> Result<Vec<ImageLibrary>, AssetError> {
        Ok(self.libraries.iter().map(|(library, _)| library.clone()).collect())
    }

    fn library_timestamp(&self, library: &ImageLibrary) -> Result<DateTime<Utc>, AssetError> {
        self.libraries
            .iter()
            .find(|(candidate, _)| candidate.id == library.id)
            .map(|(_, stamp)| *stamp)
            .ok_or_else(|| AssetError::MissingLibrary(library.id.clone()))
    }

    fn texture_name(&self, texture: &TextureId) -> String {
        self.textures
            .get(texture)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| texture.to_string())
    }

    fn texture_state(&self, texture: &TextureId) -> Result<TextureState, AssetError> {
        let source = self.texture(texture)?;
        let settings = self.import_settings(texture)?;
        Ok(TextureState {
            width: source.width,
            height: source.height,
            format: settings.format.unwrap_or(source.natural),
            readable: settings.readable,
            mip_count: if settings.mipmaps { 3 } else { 1 },
        })
    }

    fn import_settings(&self, texture: &TextureId) -> Result<TextureImportSettings, AssetError> {
        Ok(self.settings.borrow().get(texture).cloned().unwrap_or_default())
    }

    fn apply_import_settings(
        &self,
        texture: &TextureId,
        settings: &TextureImportSettings,
    ) -> Result<(), AssetError> {
        self.texture(texture)?;
        self.settings.borrow_mut().insert(texture.clone(), settings.clone());
        *self.applied.borrow_mut().entry(texture.clone()).or_default() += 1;
        Ok(())
    }

    fn raw_texture_data(&self, texture: &TextureId) -> Result<RawTexture, AssetError> {
        let state = self.texture_state(texture)?;
        if !state.readable {
            return Err(AssetError::NotReadable(texture.to_string()));
        }
        let source = self.texture(texture)?;
        let data = match state.format {
            TextureFormat::Rgba32 => source.rgba.clone(),
            TextureFormat::Rgb24 => source.rgba.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect(),
            TextureFormat::R8 => source.rgba.chunks_exact(4).map(|px| px[0]).collect(),
            format => {
                return Err(AssetError::UnsupportedFormat {
                    texture: texture.to_string(),
                    format,
                })
            }
        };
        self.reads.set(self.reads.get() + 1);
        Ok(RawTexture {
            width: source.width,
            height: source.height,
            format: state.format,
            data,
        })
    }
}
