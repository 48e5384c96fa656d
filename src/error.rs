use thiserror::Error;

use crate::asset::AssetError;
use crate::color::ConversionError;
use crate::state::data::ImageSizeError;

/// Everything that can abort a database build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{}", invalid_image_message(.library, .texture, .reason))]
    InvalidImage {
        library: String,
        texture: String,
        reason: ImageSizeError,
    },

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("failed to convert '{texture}': {source}")]
    Conversion {
        texture: String,
        #[source]
        source: ConversionError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed build config {}: {source}", .path.display())]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize library cache: {0}")]
    CacheWrite(#[from] serde_json::Error),

    #[error("image conversion task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("image {width}x{height} is too large for the database format")]
    DimensionOverflow { width: u32, height: u32 },
}

pub type Result<T, E = BuildError> = std::result::Result<T, E>;

fn invalid_image_message(library: &str, texture: &str, reason: &ImageSizeError) -> String {
    let hint = format!(
        "See '{library}'=>'{texture}'=>'Specify Size'=>'Physical Size (meters)' for more information."
    );
    match reason {
        ImageSizeError::MissingSizeSpec => format!(
            "Image '{texture}' that is a part of the Image Library at '{library}' is not specifying its physical size in meters (no physical size specified). \
             A non-zero size must be specified in order to track images appropriately. {hint}"
        ),
        ImageSizeError::InvalidSize => format!(
            "Image '{texture}' in Image Library '{library}' has an extremely small (sub 0.00001 meters) or zero physical size parameter (size too small or zero). \
             A non-zero size must be specified in order to track images appropriately. {hint}"
        ),
    }
}
