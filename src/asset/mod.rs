/// Asset pipeline module
///
/// This module handles everything the build needs from the project's assets:
/// - The collaborator contract the build runs against (pipeline.rs)
/// - Temporary texture import overrides with guaranteed restore (import.rs)
/// - A filesystem-backed project implementing the contract (project.rs)

pub mod import;
pub mod pipeline;
pub mod project;

#[cfg(test)]
pub(crate) mod memory;

pub use pipeline::{AssetPipeline, TextureImportSettings, TextureState};

use std::path::PathBuf;
use thiserror::Error;

use crate::color::TextureFormat;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed asset {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode texture {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture '{0}' is not marked readable")]
    NotReadable(String),

    #[error("texture '{texture}' has no raw data in format {format}")]
    UnsupportedFormat { texture: String, format: TextureFormat },

    #[error("texture '{0}' does not exist")]
    MissingTexture(String),

    #[error("image library '{0}' does not exist")]
    MissingLibrary(String),

    #[error("image libraries {} and {} share the id '{id}'", .first.display(), .second.display())]
    DuplicateLibrary {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },
}
