//! Packs reference image libraries into binary image-tracking databases.
//!
//! Each library's textures are reduced to 8-bit luminance and written, in
//! library order, to `<output>/<library id>.imgpak`. A JSON cache of library
//! modification times lets repeated builds skip unchanged libraries.

pub mod asset;
pub mod build;
pub mod color;
pub mod config;
pub mod error;
pub mod progress;
pub mod state;

pub use asset::project::ProjectAssets;
pub use asset::AssetPipeline;
pub use build::processor::{build_image_tracking_assets, BuildSummary};
pub use config::BuildConfig;
pub use error::BuildError;
pub use progress::BuildProgress;
