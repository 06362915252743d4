//! On-disk cache of remote size lookups.
//!
//! Entries are keyed by `name@version` and stored as a single JSON file,
//! by default `~/.dep-hunter/cache.json`. A cache file that cannot be read
//! or parsed is logged and replaced by an empty cache.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::SizeError;

/// Directory under the home directory holding dep-hunter state
pub const CACHE_DIR_NAME: &str = ".dep-hunter";

/// Cache file name inside the cache directory
pub const CACHE_FILE_NAME: &str = "cache.json";

/// A remembered size lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSize {
    pub name: String,
    pub version: String,
    pub gzip: u64,
    pub size: u64,
    /// Seconds since the Unix epoch
    pub fetched_at: u64,
}

impl CachedSize {
    pub fn new(name: &str, version: &str, gzip: u64, size: u64) -> Self {
        let fetched_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            version: version.to_string(),
            gzip,
            size,
            fetched_at,
        }
    }

    /// Gzipped size when known, raw size otherwise.
    pub fn footprint(&self) -> u64 {
        if self.gzip > 0 {
            self.gzip
        } else {
            self.size
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheFile {
    entries: BTreeMap<String, CachedSize>,
}

/// Size lookups remembered across runs.
#[derive(Debug, Default)]
pub struct SizeCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, CachedSize>,
}

impl SizeCache {
    /// A cache that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// `~/.dep-hunter/cache.json`, if a home directory can be found.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
    }

    /// Cache file inside `dir`.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// Loads the cache at `path`, starting empty if the file is missing,
    /// unreadable, or corrupted.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = Self::read_entries(&path);
        debug!("Loaded {} cached sizes from {}", entries.len(), path.display());

        Self {
            path: Some(path),
            entries,
        }
    }

    fn read_entries(path: &Path) -> BTreeMap<String, CachedSize> {
        if !path.exists() {
            return BTreeMap::new();
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to read size cache, resetting: {}", e);
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<CacheFile>(&content) {
            Ok(file) => file.entries,
            Err(e) => {
                warn!("Size cache corrupted, resetting: {}", e);
                BTreeMap::new()
            }
        }
    }

    pub fn key(name: &str, version: &str) -> String {
        format!("{}@{}", name, version)
    }

    pub fn get(&self, name: &str, version: &str) -> Option<&CachedSize> {
        self.entries.get(&Self::key(name, version))
    }

    pub fn insert(&mut self, entry: CachedSize) {
        self.entries
            .insert(Self::key(&entry.name, &entry.version), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the cache back to its file. In-memory caches are a no-op.
    pub fn save(&self) -> Result<(), SizeError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = CacheFile {
            entries: self.entries.clone(),
        };
        fs::write(path, serde_json::to_string_pretty(&file)?)?;
        debug!("Saved {} cached sizes to {}", self.entries.len(), path.display());
        Ok(())
    }
}
