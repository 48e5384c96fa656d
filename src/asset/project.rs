/// Filesystem-backed asset project
///
/// Layout:
/// - `*.imagelib` files anywhere under the root are reference image
///   libraries (JSON manifests)
/// - textures are ordinary image files, referenced by root-relative path
/// - `<texture>.import` sidecars hold non-default import settings

use chrono::{DateTime, Utc};
use image::{ColorType, DynamicImage, ImageDecoder, ImageReader};
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{AssetError, AssetPipeline, TextureImportSettings, TextureState};
use crate::color::{RawTexture, TextureFormat};
use crate::state::data::{ImageLibrary, ReferenceImage, TextureId};

/// Extension of reference image library manifests
pub const LIBRARY_EXTENSION: &str = "imagelib";

/// Extension appended to a texture path for its import settings
pub const IMPORT_SETTINGS_EXTENSION: &str = "import";

/// On-disk shape of a `.imagelib` manifest
#[derive(Deserialize, Debug)]
struct LibraryManifest {
    guid: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    images: Vec<ReferenceImage>,
}

/// A project directory whose assets feed the database build
#[derive(Debug, Clone)]
pub struct ProjectAssets {
    root: PathBuf,
    /// Manifest path per library id, filled by `libraries()`
    manifests: RefCell<HashMap<String, PathBuf>>,
}

impl ProjectAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifests: RefCell::new(HashMap::new()),
        }
    }

    /// Absolute path of a texture asset
    pub fn texture_path(&self, texture: &TextureId) -> PathBuf {
        self.root.join(texture.as_str())
    }

    fn settings_path(&self, texture: &TextureId) -> PathBuf {
        let mut path = self.texture_path(texture).into_os_string();
        path.push(".");
        path.push(IMPORT_SETTINGS_EXTENSION);
        PathBuf::from(path)
    }

    /// Find every library manifest below the root, sorted by path
    fn library_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case(LIBRARY_EXTENSION))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();
        paths
    }

    fn load_library(&self, path: &Path) -> Result<ImageLibrary, AssetError> {
        let json = fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: LibraryManifest =
            serde_json::from_str(&json).map_err(|source| AssetError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let name = manifest.name.unwrap_or_else(|| {
            path.file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string()
        });

        Ok(ImageLibrary {
            id: manifest.guid,
            name,
            images: manifest.images,
        })
    }

    /// Open a texture, detecting its format from the file content
    fn reader(&self, texture: &TextureId) -> Result<(PathBuf, ImageReader<BufReader<File>>), AssetError> {
        let path = self.texture_path(texture);
        if !path.is_file() {
            return Err(AssetError::MissingTexture(texture.to_string()));
        }
        let reader = ImageReader::open(&path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| AssetError::Io { path: path.clone(), source })?;
        Ok((path, reader))
    }

    /// Read dimensions and colour type without decoding the pixels
    fn probe(&self, texture: &TextureId) -> Result<(u32, u32, ColorType), AssetError> {
        let (path, reader) = self.reader(texture)?;
        let decoder = reader
            .into_decoder()
            .map_err(|source| AssetError::Decode { path, source })?;
        let (width, height) = decoder.dimensions();
        Ok((width, height, decoder.color_type()))
    }

    fn decode(&self, texture: &TextureId) -> Result<DynamicImage, AssetError> {
        let (path, reader) = self.reader(texture)?;
        reader
            .decode()
            .map_err(|source| AssetError::Decode { path, source })
    }

    fn library_path(&self, library: &ImageLibrary) -> Result<PathBuf, AssetError> {
        if let Some(path) = self.manifests.borrow().get(&library.id) {
            return Ok(path.clone());
        }
        for path in self.library_paths() {
            if self.load_library(&path)?.id == library.id {
                return Ok(path);
            }
        }
        Err(AssetError::MissingLibrary(library.id.clone()))
    }
}

/// Pixel layout an image file decodes to
pub fn natural_format(color: ColorType) -> TextureFormat {
    match color {
        ColorType::L8 => TextureFormat::R8,
        ColorType::La8 => TextureFormat::Ra16,
        ColorType::Rgb8 => TextureFormat::Rgb24,
        ColorType::Rgba8 => TextureFormat::Rgba32,
        ColorType::L16 | ColorType::La16 => TextureFormat::R16,
        ColorType::Rgb16 => TextureFormat::Rgb48,
        ColorType::Rgba16 => TextureFormat::Rgba64,
        ColorType::Rgb32F => TextureFormat::RgbFloat,
        _ => TextureFormat::RgbaFloat,
    }
}

/// Number of levels in a full mip chain
fn mip_chain_len(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

impl AssetPipeline for ProjectAssets {
    fn libraries(&self) -> Result<Vec<ImageLibrary>, AssetError> {
        let mut libraries = Vec::new();
        let mut manifests = HashMap::new();
        for path in self.library_paths() {
            let library = self.load_library(&path)?;
            // Two manifests with one id would write to the same database
            if let Some(first) = manifests.insert(library.id.clone(), path.clone()) {
                return Err(AssetError::DuplicateLibrary {
                    id: library.id,
                    first,
                    second: path,
                });
            }
            libraries.push(library);
        }
        log::debug!("Found {} image libraries under {}", libraries.len(), self.root.display());
        *self.manifests.borrow_mut() = manifests;
        Ok(libraries)
    }

    fn library_timestamp(&self, library: &ImageLibrary) -> Result<DateTime<Utc>, AssetError> {
        let path = self.library_path(library)?;
        let modified = fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(|source| AssetError::Io { path, source })?;
        Ok(DateTime::<Utc>::from(modified))
    }

    fn texture_name(&self, texture: &TextureId) -> String {
        Path::new(texture.as_str())
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| texture.to_string())
    }

    fn texture_state(&self, texture: &TextureId) -> Result<TextureState, AssetError> {
        let settings = self.import_settings(texture)?;
        let (width, height, color) = self.probe(texture)?;
        let format = settings.format.unwrap_or_else(|| natural_format(color));

        Ok(TextureState {
            width,
            height,
            format,
            readable: settings.readable,
            mip_count: if settings.mipmaps { mip_chain_len(width, height) } else { 1 },
        })
    }

    fn import_settings(&self, texture: &TextureId) -> Result<TextureImportSettings, AssetError> {
        let path = self.settings_path(texture);
        match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| AssetError::Json { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TextureImportSettings::default()),
            Err(source) => Err(AssetError::Io { path, source }),
        }
    }

    /// Default settings are stored as the absence of a sidecar, so a
    /// restored texture leaves no file behind.
    fn apply_import_settings(
        &self,
        texture: &TextureId,
        settings: &TextureImportSettings,
    ) -> Result<(), AssetError> {
        let path = self.settings_path(texture);
        let result = if *settings == TextureImportSettings::default() {
            match fs::remove_file(&path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        } else {
            let json = serde_json::to_string_pretty(settings).map_err(|source| AssetError::Json {
                path: path.clone(),
                source,
            })?;
            fs::write(&path, json)
        };
        result.map_err(|source| AssetError::Io { path, source })
    }

    fn raw_texture_data(&self, texture: &TextureId) -> Result<RawTexture, AssetError> {
        let settings = self.import_settings(texture)?;
        if !settings.readable {
            return Err(AssetError::NotReadable(texture.to_string()));
        }

        let img = self.decode(texture)?;
        let format = settings.format.unwrap_or_else(|| natural_format(img.color()));
        let (width, height) = (img.width(), img.height());
        let data = match format {
            TextureFormat::R8 => img.into_luma8().into_raw(),
            TextureFormat::Rgb24 => img.into_rgb8().into_raw(),
            TextureFormat::Rgba32 => img.into_rgba8().into_raw(),
            format => {
                return Err(AssetError::UnsupportedFormat {
                    texture: texture.to_string(),
                    format,
                })
            }
        };

        Ok(RawTexture {
            width,
            height,
            format,
            data,
        })
    }
}
