/// Pixel format conversion utilities
///
/// This module reduces source texture buffers to the single-channel
/// luminance layout the tracking database stores:
/// - R8 (already single channel, copied through)
/// - RGB24 (3 bytes per pixel)
/// - RGBA32 (4 bytes per pixel, alpha ignored)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rec. 709 luma weights, scaled so that they sum to exactly `LUMA_SCALE`.
/// Integer math keeps the mapping exact: white stays 255, black stays 0.
const LUMA_R: u32 = 2126;
const LUMA_G: u32 = 7152;
const LUMA_B: u32 = 722;
const LUMA_SCALE: u32 = 10_000;

/// Pixel layout of a texture as reported by the asset pipeline
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TextureFormat {
    /// 8-bit single channel
    R8,
    /// 16-bit single channel
    R16,
    /// 8-bit luminance + 8-bit alpha
    Ra16,
    /// 8-bit RGB
    Rgb24,
    /// 16-bit RGB
    Rgb48,
    /// 8-bit RGBA
    Rgba32,
    /// 16-bit RGBA
    Rgba64,
    /// 32-bit float RGB
    RgbFloat,
    /// 32-bit float RGBA
    RgbaFloat,
}

impl TextureFormat {
    /// Whether the converter accepts this layout directly
    pub fn is_supported(self) -> bool {
        matches!(self, TextureFormat::R8 | TextureFormat::Rgb24 | TextureFormat::Rgba32)
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::R16 | TextureFormat::Ra16 => 2,
            TextureFormat::Rgb24 => 3,
            TextureFormat::Rgba32 => 4,
            TextureFormat::Rgb48 => 6,
            TextureFormat::Rgba64 => 8,
            TextureFormat::RgbFloat => 12,
            TextureFormat::RgbaFloat => 16,
        }
    }
}

impl std::fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TextureFormat::R8 => "R8",
            TextureFormat::R16 => "R16",
            TextureFormat::Ra16 => "RA16",
            TextureFormat::Rgb24 => "RGB24",
            TextureFormat::Rgb48 => "RGB48",
            TextureFormat::Rgba32 => "RGBA32",
            TextureFormat::Rgba64 => "RGBA64",
            TextureFormat::RgbFloat => "RGBFloat",
            TextureFormat::RgbaFloat => "RGBAFloat",
        };
        f.write_str(name)
    }
}

/// Raw pixel data fetched from a source texture (top mip level first)
#[derive(Debug, Clone, PartialEq)]
pub struct RawTexture {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
}

/// Single-channel luminance image ready to be written into a database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    pub width: u32,
    pub height: u32,
    /// `width * height` bytes, row-major
    pub data: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("texture format {0} cannot be converted to luminance")]
    UnsupportedFormat(TextureFormat),
    #[error("pixel buffer holds {actual} bytes but a {width}x{height} {format} image needs {expected}")]
    BufferTooSmall {
        width: u32,
        height: u32,
        format: TextureFormat,
        expected: usize,
        actual: usize,
    },
}

/// Luminance of one 8-bit RGB pixel
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = (LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32) / LUMA_SCALE;
    // Weights sum to LUMA_SCALE so y <= 255
    y as u8
}

/// Convert a raw texture buffer into a single-channel luminance image
///
/// The buffer is validated before anything is allocated, so a failed
/// conversion never yields a half-filled image. Bytes past the top mip
/// level are ignored.
pub fn to_luminance(texture: &RawTexture) -> Result<ConvertedImage, ConversionError> {
    let format = texture.format;
    if !format.is_supported() {
        return Err(ConversionError::UnsupportedFormat(format));
    }

    let pixel_count = texture.width as usize * texture.height as usize;
    let bpp = format.bytes_per_pixel();
    let expected = pixel_count * bpp;
    if texture.data.len() < expected {
        return Err(ConversionError::BufferTooSmall {
            width: texture.width,
            height: texture.height,
            format,
            expected,
            actual: texture.data.len(),
        });
    }

    let source = &texture.data[..expected];
    let data = match format {
        TextureFormat::R8 => source.to_vec(),
        // RGB24 and RGBA32 share the first three channels
        _ => source
            .chunks_exact(bpp)
            .map(|px| luminance(px[0], px[1], px[2]))
            .collect(),
    };

    Ok(ConvertedImage {
        width: texture.width,
        height: texture.height,
        data,
    })
}
