//! In-memory cache store for testing.

use super::{CacheStore, HashCache};
use crate::error::CacheError;
use std::path::PathBuf;
use std::sync::RwLock;

/// In-memory cache store
///
/// Useful for testing and for runs where persistence isn't needed.
pub struct InMemoryStore {
    saved: RwLock<Option<HashCache>>,
    corrupted: bool,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            saved: RwLock::new(None),
            corrupted: false,
        }
    }

    /// A store holding a cache
    pub fn with_cache(cache: HashCache) -> Self {
        Self {
            saved: RwLock::new(Some(cache)),
            corrupted: false,
        }
    }

    /// A store whose contents can never be read back
    pub fn corrupted() -> Self {
        Self {
            saved: RwLock::new(None),
            corrupted: true,
        }
    }

    /// What the last `save` wrote, if anything
    pub fn saved(&self) -> Option<HashCache> {
        self.saved.read().ok().and_then(|saved| saved.clone())
    }

    fn poisoned() -> CacheError {
        CacheError::Corrupted {
            path: PathBuf::from("memory"),
            reason: "lock poisoned".to_string(),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for InMemoryStore {
    fn load(&self) -> Result<Option<HashCache>, CacheError> {
        if self.corrupted {
            return Err(CacheError::Corrupted {
                path: PathBuf::from("memory"),
                reason: "simulated corruption".to_string(),
            });
        }
        let saved = self.saved.read().map_err(|_| Self::poisoned())?;
        Ok(saved.clone())
    }

    fn save(&self, cache: &HashCache) -> Result<(), CacheError> {
        let mut saved = self.saved.write().map_err(|_| Self::poisoned())?;
        *saved = Some(cache.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
