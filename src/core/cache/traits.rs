//! Cache store trait definition.

use super::HashCache;
use crate::error::CacheError;

/// Trait for persistent homes of a `HashCache`
pub trait CacheStore: Send + Sync {
    /// Read the whole cache.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet, and an error
    /// when something exists but cannot be read back.
    fn load(&self) -> Result<Option<HashCache>, CacheError>;

    /// Write the whole cache, replacing any previous contents
    fn save(&self, cache: &HashCache) -> Result<(), CacheError>;

    /// Short description for log lines, e.g. `json:/photos/.image_hashes.json`
    fn describe(&self) -> String;
}
