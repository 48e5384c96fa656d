/// Temporary texture import overrides
///
/// A texture that is not readable, carries mip levels, or uses a pixel
/// format the converter cannot handle gets reimported with convertible
/// settings just long enough to copy its pixels out. The original settings
/// are put back when the guard is restored or dropped, whichever comes first.

use super::{AssetError, AssetPipeline, TextureImportSettings};
use crate::color::RawTexture;
use crate::state::data::TextureId;

/// Holds a texture in its overridden import state
pub struct ImportOverride<'a, P: AssetPipeline + ?Sized> {
    pipeline: &'a P,
    texture: &'a TextureId,
    original: Option<TextureImportSettings>,
}

impl<'a, P: AssetPipeline + ?Sized> ImportOverride<'a, P> {
    /// Record the texture's current settings and reimport it as convertible
    pub fn apply(pipeline: &'a P, texture: &'a TextureId) -> Result<Self, AssetError> {
        let original = pipeline.import_settings(texture)?;
        pipeline.apply_import_settings(texture, &TextureImportSettings::convertible())?;
        log::debug!("Overrode import settings for {}", texture);

        Ok(Self {
            pipeline,
            texture,
            original: Some(original),
        })
    }

    /// Put the original settings back, reporting failure
    pub fn restore(mut self) -> Result<(), AssetError> {
        self.restore_inner()
    }

    fn restore_inner(&mut self) -> Result<(), AssetError> {
        match self.original.take() {
            Some(original) => {
                self.pipeline.apply_import_settings(self.texture, &original)?;
                log::debug!("Restored import settings for {}", self.texture);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<P: AssetPipeline + ?Sized> Drop for ImportOverride<'_, P> {
    fn drop(&mut self) {
        if let Err(e) = self.restore_inner() {
            log::error!("❌ Failed to restore import settings for {}: {}", self.texture, e);
        }
    }
}

/// Copy a texture's pixels out under convertible import settings
///
/// The override is undone as soon as the pixels are copied, before the
/// caller converts them.
pub fn read_with_override<P: AssetPipeline + ?Sized>(
    pipeline: &P,
    texture: &TextureId,
) -> Result<RawTexture, AssetError> {
    let guard = ImportOverride::apply(pipeline, texture)?;
    let raw = pipeline.raw_texture_data(texture)?;
    guard.restore()?;
    Ok(raw)
}
