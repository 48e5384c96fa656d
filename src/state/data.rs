/// Shared data structures for the build state
///
/// These structs represent the data model that flows between
/// the asset pipeline and the build orchestrator.

use serde::{Deserialize, Serialize};

/// Smallest accepted physical edge length, in meters
pub const MIN_PHYSICAL_SIZE: f32 = 0.00001;

/// Opaque identifier of a texture asset (a project-relative path for
/// filesystem projects)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TextureId(pub String);

impl TextureId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TextureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a single entry of a reference image library
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceImage {
    /// Source texture backing this entry
    pub texture: TextureId,
    /// Whether a physical size was specified in the inspector
    #[serde(default)]
    pub specify_size: bool,
    /// Physical size in meters (x, y)
    #[serde(default)]
    pub size: [f32; 2],
}

/// Why a reference image cannot be packed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSizeError {
    /// `specify_size` is off
    MissingSizeSpec,
    /// One of the dimensions is below `MIN_PHYSICAL_SIZE`
    InvalidSize,
}

impl ReferenceImage {
    /// Check that the image carries a usable physical size
    pub fn validate(&self) -> Result<(), ImageSizeError> {
        if !self.specify_size {
            return Err(ImageSizeError::MissingSizeSpec);
        }
        if self.size[0] < MIN_PHYSICAL_SIZE || self.size[1] < MIN_PHYSICAL_SIZE {
            return Err(ImageSizeError::InvalidSize);
        }
        Ok(())
    }
}

/// Represents a reference image library asset
#[derive(Debug, Clone, PartialEq)]
pub struct ImageLibrary {
    /// Stable asset identifier (GUID)
    pub id: String,
    /// Display name
    pub name: String,
    /// Entries in tracking order
    pub images: Vec<ReferenceImage>,
}

impl ImageLibrary {
    pub fn len(&self) -> usize {
        self.images.len()
    }
}
