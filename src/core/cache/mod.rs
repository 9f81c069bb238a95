//! # Cache Module
//!
//! Persists fingerprints so unchanged files are hashed at most once.
//!
//! ## Identity
//! An entry is addressed by path but only served while the file's size and
//! modification time (second precision) still match, and only to runs using
//! the same algorithm and bit length. Anything else is a miss.
//!
//! ## Failure policy
//! A missing store loads as an empty cache. A corrupt store is logged and
//! also loads as an empty cache. Save failures are returned to the caller,
//! which logs them; the in-memory results of the run are unaffected.
//!
//! ## Stores
//! - `JsonFileStore` - default, human-readable
//! - `SqliteStore` - for very large libraries
//! - `InMemoryStore` - for testing

mod json;
mod memory;
mod sqlite;
mod traits;

pub use json::JsonFileStore;
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::CacheStore;

use crate::core::config::CacheLocation;
use crate::core::hasher::{Fingerprint, HashAlgorithmKind};
use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// A file as the cache sees it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity {
    /// Path as enumerated
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Modification time, seconds since the Unix epoch
    pub modified: u64,
}

impl FileIdentity {
    /// Build an identity from already-known metadata
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            size,
            modified: to_unix_secs(modified),
        }
    }

    /// Stat a file to build its identity
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;
        Ok(Self::new(
            path,
            metadata.len(),
            metadata.modified().unwrap_or(UNIX_EPOCH),
        ))
    }
}

fn to_unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// A cached fingerprint plus the file state it was computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// File size at time of hashing
    pub file_size: u64,
    /// File modification time at time of hashing (Unix seconds)
    pub file_modified: u64,
    /// The fingerprint
    pub fingerprint: Fingerprint,
}

impl CacheEntry {
    /// Check if this entry still describes the file and the run's hasher
    pub fn is_valid_for(
        &self,
        identity: &FileIdentity,
        algorithm: HashAlgorithmKind,
        bit_len: u32,
    ) -> bool {
        self.file_size == identity.size
            && self.file_modified == identity.modified
            && self.fingerprint.algorithm() == algorithm
            && self.fingerprint.bit_len() == bit_len
    }
}

/// Mapping from file path to fingerprint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl HashCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a store.
    ///
    /// Never fails: a missing store is an empty cache and a corrupt store is
    /// logged and replaced by an empty cache.
    pub fn load(store: &dyn CacheStore) -> Self {
        match store.load() {
            Ok(Some(cache)) => {
                debug!(store = %store.describe(), entries = cache.len(), "loaded fingerprint cache");
                cache
            }
            Ok(None) => {
                debug!(store = %store.describe(), "no fingerprint cache yet, starting fresh");
                Self::new()
            }
            Err(e) => {
                warn!(store = %store.describe(), error = %e, "unreadable fingerprint cache, starting fresh");
                Self::new()
            }
        }
    }

    /// Persist every entry, replacing whatever the store held.
    pub fn save(&self, store: &dyn CacheStore) -> Result<(), CacheError> {
        store.save(self)?;
        debug!(store = %store.describe(), entries = self.len(), "saved fingerprint cache");
        Ok(())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fingerprint for `identity`, if cached and still valid for the
    /// given algorithm and bit length
    pub fn get(
        &self,
        identity: &FileIdentity,
        algorithm: HashAlgorithmKind,
        bit_len: u32,
    ) -> Option<&Fingerprint> {
        self.entries
            .get(&identity.path)
            .filter(|entry| entry.is_valid_for(identity, algorithm, bit_len))
            .map(|entry| &entry.fingerprint)
    }

    /// Whether a valid entry exists for `identity`
    pub fn contains(
        &self,
        identity: &FileIdentity,
        algorithm: HashAlgorithmKind,
        bit_len: u32,
    ) -> bool {
        self.get(identity, algorithm, bit_len).is_some()
    }

    /// Raw entry for a path, valid or not
    pub fn entry(&self, path: &Path) -> Option<&CacheEntry> {
        self.entries.get(path)
    }

    /// Insert or replace an entry unconditionally.
    pub fn insert(&mut self, path: PathBuf, entry: CacheEntry) {
        self.entries.insert(path, entry);
    }

    /// Add newly computed fingerprints.
    ///
    /// An identity that already has a valid entry keeps it; the new value is
    /// dropped. Stale entries (file changed, other algorithm) are replaced.
    /// Returns the number of entries written.
    pub fn merge(
        &mut self,
        new_entries: impl IntoIterator<Item = (FileIdentity, Fingerprint)>,
    ) -> usize {
        let mut written = 0;
        for (identity, fingerprint) in new_entries {
            if self.contains(&identity, fingerprint.algorithm(), fingerprint.bit_len()) {
                continue;
            }
            self.entries.insert(
                identity.path,
                CacheEntry {
                    file_size: identity.size,
                    file_modified: identity.modified,
                    fingerprint,
                },
            );
            written += 1;
        }
        written
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &CacheEntry)> {
        self.entries.iter()
    }

    /// Remove entries for files that no longer exist
    ///
    /// Returns the number of entries removed.
    pub fn prune_missing(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|path, _| path.exists());
        before - self.entries.len()
    }
}

/// Open the store for a configured location, choosing SQLite for
/// `.db`/`.sqlite`/`.sqlite3` files and JSON otherwise.
pub fn open_store(location: &CacheLocation) -> Option<Box<dyn CacheStore>> {
    match location {
        CacheLocation::Disabled => None,
        CacheLocation::File(path) => {
            let is_sqlite = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| matches!(e.to_lowercase().as_str(), "db" | "sqlite" | "sqlite3"))
                .unwrap_or(false);

            if is_sqlite {
                Some(Box::new(SqliteStore::new(path)))
            } else {
                Some(Box::new(JsonFileStore::new(path)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fingerprint(byte: u8) -> Fingerprint {
        Fingerprint::from_bytes(&[byte; 8], HashAlgorithmKind::Average).unwrap()
    }

    fn identity(path: &str, size: u64, secs: u64) -> FileIdentity {
        FileIdentity::new(path, size, UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn get_returns_valid_entry() {
        let mut cache = HashCache::new();
        let id = identity("/a.jpg", 1000, 50);
        cache.merge([(id.clone(), fingerprint(0xAA))]);

        assert_eq!(
            cache.get(&id, HashAlgorithmKind::Average, 64),
            Some(&fingerprint(0xAA))
        );
    }

    #[test]
    fn changed_size_or_mtime_is_a_miss() {
        let mut cache = HashCache::new();
        cache.merge([(identity("/a.jpg", 1000, 50), fingerprint(0xAA))]);

        assert!(!cache.contains(&identity("/a.jpg", 2000, 50), HashAlgorithmKind::Average, 64));
        assert!(!cache.contains(&identity("/a.jpg", 1000, 51), HashAlgorithmKind::Average, 64));
    }

    #[test]
    fn other_algorithm_or_length_is_a_miss() {
        let mut cache = HashCache::new();
        let id = identity("/a.jpg", 1000, 50);
        cache.merge([(id.clone(), fingerprint(0xAA))]);

        assert!(!cache.contains(&id, HashAlgorithmKind::Perceptual, 64));
        assert!(!cache.contains(&id, HashAlgorithmKind::Average, 256));
    }

    #[test]
    fn merge_keeps_existing_valid_entry() {
        let mut cache = HashCache::new();
        let id = identity("/a.jpg", 1000, 50);

        assert_eq!(cache.merge([(id.clone(), fingerprint(0x01))]), 1);
        assert_eq!(cache.merge([(id.clone(), fingerprint(0x02))]), 0);

        assert_eq!(
            cache.get(&id, HashAlgorithmKind::Average, 64),
            Some(&fingerprint(0x01))
        );
    }

    #[test]
    fn merge_replaces_stale_entry() {
        let mut cache = HashCache::new();
        cache.merge([(identity("/a.jpg", 1000, 50), fingerprint(0x01))]);

        let changed = identity("/a.jpg", 1200, 90);
        assert_eq!(cache.merge([(changed.clone(), fingerprint(0x02))]), 1);

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get(&changed, HashAlgorithmKind::Average, 64),
            Some(&fingerprint(0x02))
        );
    }

    #[test]
    fn load_missing_store_is_empty() {
        let store = InMemoryStore::new();
        assert!(HashCache::load(&store).is_empty());
    }

    #[test]
    fn load_corrupt_store_is_empty() {
        let store = InMemoryStore::corrupted();
        assert!(HashCache::load(&store).is_empty());
    }

    #[test]
    fn prune_removes_missing_files() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let present = temp_dir.path().join("present.jpg");
        fs::write(&present, b"x").unwrap();

        let mut cache = HashCache::new();
        cache.merge([
            (FileIdentity::from_path(&present).unwrap(), fingerprint(0x01)),
            (identity("/nonexistent/gone.jpg", 1, 1), fingerprint(0x02)),
        ]);

        assert_eq!(cache.prune_missing(), 1);
        assert!(cache.entry(&present).is_some());
    }

    #[test]
    fn open_store_picks_backend_by_extension() {
        assert!(open_store(&CacheLocation::Disabled).is_none());

        let sqlite = open_store(&CacheLocation::File(PathBuf::from("/tmp/h.db"))).unwrap();
        assert!(sqlite.describe().starts_with("sqlite"));

        let json = open_store(&CacheLocation::File(PathBuf::from("/tmp/h.json"))).unwrap();
        assert!(json.describe().starts_with("json"));
    }
}
