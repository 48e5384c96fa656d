/// Build configuration
///
/// Paths default to the conventional project layout and can be changed with
/// an optional `image_tracking.json` at the project root:
///
/// ```json
/// { "outputDir": "StreamingAssets", "cachePath": "Library/ImageTracking/ImageLibraryDB.json" }
/// ```

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::build::database::DATABASE_EXTENSION;
use crate::error::{BuildError, Result};

/// Name of the optional per-project configuration file
pub const CONFIG_FILE_NAME: &str = "image_tracking.json";

const DEFAULT_OUTPUT_DIR: &str = "StreamingAssets";
const DEFAULT_CACHE_PATH: &str = "Library/ImageTracking/ImageLibraryDB.json";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", default)]
struct ConfigFile {
    output_dir: PathBuf,
    cache_path: PathBuf,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
        }
    }
}

/// Where a build reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub project_root: PathBuf,
    /// Directory receiving one database file per library
    pub output_dir: PathBuf,
    /// Shared JSON cache of library modification times
    pub cache_path: PathBuf,
}

impl BuildConfig {
    /// Default layout for a project, ignoring any config file
    pub fn for_project(root: impl Into<PathBuf>) -> Self {
        Self::from_file(root.into(), ConfigFile::default())
    }

    /// Load `image_tracking.json` from the project root if present
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let path = root.join(CONFIG_FILE_NAME);

        let file = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).map_err(|source| BuildError::Config {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigFile::default(),
            Err(e) => return Err(e.into()),
        };

        let config = Self::from_file(root, file);
        log::debug!("Build config: {:?}", config);
        Ok(config)
    }

    fn from_file(root: PathBuf, file: ConfigFile) -> Self {
        // Absolute paths replace the root when joined
        Self {
            output_dir: root.join(file.output_dir),
            cache_path: root.join(file.cache_path),
            project_root: root,
        }
    }

    /// Output file for a library
    pub fn database_path(&self, library_id: &str) -> PathBuf {
        self.output_dir
            .join(format!("{library_id}.{DATABASE_EXTENSION}"))
    }
}
