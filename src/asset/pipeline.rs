use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AssetError;
use crate::color::{RawTexture, TextureFormat};
use crate::state::data::{ImageLibrary, TextureId};

/// Import configuration of a texture asset
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TextureImportSettings {
    /// CPU-side pixel data is kept after import
    pub readable: bool,
    /// A full mip chain is generated
    pub mipmaps: bool,
    /// Forced pixel format; `None` keeps the source's own layout
    pub format: Option<TextureFormat>,
}

impl Default for TextureImportSettings {
    fn default() -> Self {
        Self {
            readable: true,
            mipmaps: false,
            format: None,
        }
    }
}

impl TextureImportSettings {
    /// Settings under which any texture can be read back for conversion
    pub fn convertible() -> Self {
        Self {
            readable: true,
            mipmaps: false,
            format: Some(TextureFormat::Rgba32),
        }
    }
}

/// Imported state of a texture, as the build sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureState {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub readable: bool,
    pub mip_count: u32,
}

impl TextureState {
    /// Whether the raw data can be handed to the converter as-is
    pub fn is_convertible(&self) -> bool {
        self.readable && self.mip_count <= 1 && self.format.is_supported()
    }
}

/// What the database build needs from the project's asset pipeline
pub trait AssetPipeline {
    /// All reference image libraries in the project
    fn libraries(&self) -> Result<Vec<ImageLibrary>, AssetError>;

    /// Current modification time of a library asset
    fn library_timestamp(&self, library: &ImageLibrary) -> Result<DateTime<Utc>, AssetError>;

    /// Human-readable texture name for messages
    fn texture_name(&self, texture: &TextureId) -> String;

    fn texture_state(&self, texture: &TextureId) -> Result<TextureState, AssetError>;

    fn import_settings(&self, texture: &TextureId) -> Result<TextureImportSettings, AssetError>;

    /// Persist new import settings and reimport the texture
    fn apply_import_settings(
        &self,
        texture: &TextureId,
        settings: &TextureImportSettings,
    ) -> Result<(), AssetError>;

    /// Pixel data in the texture's current format; fails when not readable
    fn raw_texture_data(&self, texture: &TextureId) -> Result<RawTexture, AssetError>;
}
