/// Build cache for image libraries
///
/// Stores, per library asset, the modification time seen by the last
/// successful build. It is serialized to JSON between runs so unchanged
/// libraries are not rebuilt every time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// 100ns ticks between 1601-01-01 and 1970-01-01
const FILETIME_UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Timestamp in 100ns ticks since 1601-01-01 UTC
///
/// This is the resolution the cache file stores, so comparisons happen
/// here rather than on nanosecond-precise `DateTime`s.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(transparent)]
pub struct FileTime(pub i64);

impl FileTime {
    pub fn from_datetime(time: DateTime<Utc>) -> Self {
        let ticks = time.timestamp() * TICKS_PER_SECOND
            + i64::from(time.timestamp_subsec_nanos() / 100)
            + FILETIME_UNIX_EPOCH_TICKS;
        Self(ticks)
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        let unix_ticks = self.0 - FILETIME_UNIX_EPOCH_TICKS;
        let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
        let nanos = (unix_ticks.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
        DateTime::from_timestamp(secs, nanos).unwrap_or_default()
    }
}

impl From<DateTime<Utc>> for FileTime {
    fn from(time: DateTime<Utc>) -> Self {
        Self::from_datetime(time)
    }
}

impl From<SystemTime> for FileTime {
    fn from(time: SystemTime) -> Self {
        Self::from_datetime(DateTime::<Utc>::from(time))
    }
}

/// One cached library: asset GUID + last built modification time
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageDatabaseEntry {
    #[serde(rename = "assetGuid")]
    pub asset_guid: String,
    #[serde(rename = "_timestamp")]
    timestamp: FileTime,
}

impl ImageDatabaseEntry {
    pub fn new(asset_guid: impl Into<String>, timestamp: FileTime) -> Self {
        Self {
            asset_guid: asset_guid.into(),
            timestamp,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp.to_datetime()
    }

    pub fn file_time(&self) -> FileTime {
        self.timestamp
    }
}

/// All cached libraries for one project
///
/// Owned by a single build invocation: loaded at the start, pruned,
/// consulted per library and saved at the end.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryCache {
    #[serde(rename = "m_LibraryCache", default)]
    entries: Vec<ImageDatabaseEntry>,
}

impl LibraryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache from disk
    ///
    /// A missing or unreadable file yields an empty cache; it only means
    /// every library gets rebuilt.
    pub fn load(path: &Path) -> Self {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No library cache at {}", path.display());
                return Self::new();
            }
            Err(e) => {
                log::warn!("⚠️  Could not read library cache {}: {}", path.display(), e);
                return Self::new();
            }
        };

        match Self::from_json(&json) {
            Ok(cache) => cache,
            Err(e) => {
                log::warn!("⚠️  Ignoring malformed library cache {}: {}", path.display(), e);
                Self::new()
            }
        }
    }

    /// Parse from JSON, collapsing duplicate asset ids onto their first entry
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut cache: Self = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        cache.entries.retain(|entry| seen.insert(entry.asset_guid.clone()));
        Ok(cache)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Overwrite the cache file, creating its directory if needed
    pub fn save(&self, path: &Path) -> Result<(), crate::error::BuildError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        fs::write(path, json)?;
        log::debug!("Saved library cache ({} entries) to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Drop entries for libraries that no longer exist
    ///
    /// Returns how many entries were removed.
    pub fn prune<S: AsRef<str>>(&mut self, known_ids: &[S]) -> usize {
        let known: HashSet<&str> = known_ids.iter().map(|id| id.as_ref()).collect();
        let before = self.entries.len();
        self.entries.retain(|entry| known.contains(entry.asset_guid.as_str()));
        before - self.entries.len()
    }

    /// Decide whether a library must be rebuilt, recording `current` if so
    ///
    /// - first sight: insert and rebuild
    /// - stored time not strictly older than `current`: up to date
    /// - otherwise: update and rebuild
    pub fn needs_rebuild(&mut self, asset_id: &str, current: DateTime<Utc>) -> bool {
        let current = FileTime::from(current);

        match self.entries.iter_mut().find(|entry| entry.asset_guid == asset_id) {
            None => {
                self.entries.push(ImageDatabaseEntry::new(asset_id, current));
                true
            }
            Some(entry) => {
                if !(entry.timestamp < current) {
                    return false;
                }
                entry.timestamp = current;
                true
            }
        }
    }

    /// Forget a library so its next build is unconditional
    pub fn invalidate(&mut self, asset_id: &str) {
        self.entries.retain(|entry| entry.asset_guid != asset_id);
    }

    pub fn entry(&self, asset_id: &str) -> Option<&ImageDatabaseEntry> {
        self.entries.iter().find(|entry| entry.asset_guid == asset_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
