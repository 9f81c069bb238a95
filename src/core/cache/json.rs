//! JSON file cache store.
//!
//! Layout:
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "/photos/a.jpg": {
//!       "file_size": 1024,
//!       "file_modified": 1700000000,
//!       "fingerprint": { "algorithm": "average", "bit_len": 64, "bits": "ffe0c0..." }
//!     }
//!   }
//! }
//! ```

use super::{CacheEntry, CacheStore, HashCache};
use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheDocument {
    version: u32,
    entries: BTreeMap<String, CacheEntry>,
}

/// Stores the cache as one pretty-printed JSON document
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupted(&self, reason: impl ToString) -> CacheError {
        CacheError::Corrupted {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }

    fn write_failed(&self, reason: impl ToString) -> CacheError {
        CacheError::WriteFailed {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> Result<Option<HashCache>, CacheError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CacheError::OpenFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let document: CacheDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| self.corrupted(e))?;

        if document.version != FORMAT_VERSION {
            return Err(self.corrupted(format!(
                "unsupported format version {}",
                document.version
            )));
        }

        let mut cache = HashCache::new();
        for (path, entry) in document.entries {
            cache.insert(PathBuf::from(path), entry);
        }
        Ok(Some(cache))
    }

    fn save(&self, cache: &HashCache) -> Result<(), CacheError> {
        // Keys are JSON strings, so paths that are not UTF-8 are left out
        let mut entries = BTreeMap::new();
        for (path, entry) in cache.iter() {
            match path.to_str() {
                Some(key) => {
                    entries.insert(key.to_string(), entry.clone());
                }
                None => debug!(path = %path.display(), "not caching non-UTF-8 path"),
            }
        }
        let document = CacheDocument {
            version: FORMAT_VERSION,
            entries,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.write_failed(e))?;

        // Write beside the target and rename so a crash never leaves half a file
        let temp = NamedTempFile::new_in(&dir).map_err(|e| self.write_failed(e))?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &document)
                .map_err(|e| CacheError::SerializationFailed(e.to_string()))?;
            writer.flush().map_err(|e| self.write_failed(e))?;
        }
        temp.persist(&self.path)
            .map_err(|e| self.write_failed(e.error))?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::FileIdentity;
    use crate::core::hasher::{Fingerprint, HashAlgorithmKind};
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::TempDir;

    fn sample_cache() -> HashCache {
        let mut cache = HashCache::new();
        cache.merge([
            (
                FileIdentity::new("/photos/a.jpg", 1024, UNIX_EPOCH + Duration::from_secs(10)),
                Fingerprint::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF, 0, 1, 2, 3], HashAlgorithmKind::Average)
                    .unwrap(),
            ),
            (
                FileIdentity::new("/photos/b.png", 2048, UNIX_EPOCH + Duration::from_secs(20)),
                Fingerprint::from_bytes(&[0x00; 8], HashAlgorithmKind::Average).unwrap(),
            ),
        ]);
        cache
    }

    #[test]
    fn missing_file_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("absent.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("hashes.json"));
        let cache = sample_cache();

        store.save(&cache).unwrap();

        assert_eq!(store.load().unwrap(), Some(cache));
    }

    #[test]
    fn empty_cache_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("hashes.json"));

        store.save(&HashCache::new()).unwrap();

        assert_eq!(store.load().unwrap(), Some(HashCache::new()));
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("hashes.json"));

        store.save(&sample_cache()).unwrap();
        store.save(&HashCache::new()).unwrap();

        assert!(store.load().unwrap().unwrap().is_empty());
    }

    #[test]
    fn garbage_file_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hashes.json");
        fs::write(&path, b"{ this is not json").unwrap();

        let result = JsonFileStore::new(&path).load();
        assert!(matches!(result, Err(CacheError::Corrupted { .. })));
    }

    #[test]
    fn unknown_version_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hashes.json");
        fs::write(&path, br#"{"version":99,"entries":{}}"#).unwrap();

        let result = JsonFileStore::new(&path).load();
        assert!(matches!(result, Err(CacheError::Corrupted { .. })));
    }

    #[test]
    fn file_stores_explicit_bits_and_algorithm() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hashes.json");
        JsonFileStore::new(&path).save(&sample_cache()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"algorithm\": \"average\""));
        assert!(text.contains("\"bits\": \"deadbeef00010203\""));
    }

    #[test]
    fn save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("hashes.json");

        JsonFileStore::new(&path).save(&sample_cache()).unwrap();

        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_paths_are_left_out() {
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("hashes.json"));
        let mut cache = sample_cache();
        let entry = cache.iter().next().unwrap().1.clone();
        let odd = PathBuf::from(std::ffi::OsStr::from_bytes(b"/photos/\xFF.jpg"));
        cache.insert(odd.clone(), entry);

        store.save(&cache).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded.len(), 2);
        assert!(loaded.entry(&odd).is_none());
    }
}
