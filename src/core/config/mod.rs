//! # Config Module
//!
//! Run-scoped settings shared by every stage. A `RunConfig` is built once,
//! validated before any file is touched, and passed by reference to the
//! scanner, dispatcher and comparators.

use crate::core::hasher::HashAlgorithmKind;
use crate::error::ConfigError;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Folder names skipped during enumeration unless overridden
pub const DEFAULT_BLACKLIST: &[&str] = &["$RECYCLE.BIN", ".Spotlight", ".fseventsd"];

/// Default file name of the search cache inside the searched folder
pub const DEFAULT_CACHE_FILE_NAME: &str = ".image_hashes.json";

/// A similarity threshold in percent, guaranteed to lie in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// Validate a percentage.
    pub fn new(percent: f64) -> Result<Self, ConfigError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(ConfigError::ThresholdOutOfRange { value: percent });
        }
        Ok(Self(percent))
    }

    /// The percentage value
    pub fn percent(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

/// Number of hashing workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concurrency(NonZeroUsize);

impl Concurrency {
    /// Zero or negative requests mean "one worker per logical CPU".
    pub fn new(requested: i64) -> Self {
        usize::try_from(requested)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .unwrap_or_else(Self::host)
    }

    /// One worker per logical CPU of this host
    pub fn host() -> Self {
        Self(std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN))
    }

    /// Exactly one worker: hashing runs in input order on the calling thread
    pub fn sequential() -> Self {
        Self(NonZeroUsize::MIN)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for Concurrency {
    fn default() -> Self {
        Self::host()
    }
}

/// Where fingerprints persist between runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    /// Do not load or save anything
    Disabled,
    /// JSON file, or SQLite when the extension is `.db`/`.sqlite`/`.sqlite3`
    File(PathBuf),
}

/// Settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Hash algorithm used for every fingerprint in the run
    pub algorithm: HashAlgorithmKind,
    /// Fingerprint grid size (bits = hash_size²)
    pub hash_size: u32,
    /// Minimum similarity for a match
    pub threshold: Threshold,
    /// Hashing workers
    pub concurrency: Concurrency,
    /// Path substrings that exclude a file or folder
    pub blacklist: Vec<String>,
    /// Image extensions to enumerate (None = built-in list)
    pub extensions: Option<Vec<String>>,
    /// Descend into symlinked folders
    pub follow_symlinks: bool,
    /// Deepest folder level to enumerate, roots being 0 (None = unlimited)
    pub max_depth: Option<usize>,
    /// Whether to include hidden files and folders
    pub include_hidden: bool,
    /// Fingerprint cache
    pub cache: CacheLocation,
    /// Drop cache entries whose file no longer exists before saving
    pub prune_cache: bool,
}

impl RunConfig {
    /// Defaults of the folder-to-folder duplicate scan
    pub fn dedup_defaults() -> Self {
        Self {
            algorithm: HashAlgorithmKind::Average,
            hash_size: 8,
            threshold: Threshold(96.0),
            concurrency: Concurrency::host(),
            blacklist: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
            extensions: None,
            follow_symlinks: false,
            max_depth: None,
            include_hidden: false,
            cache: CacheLocation::Disabled,
            prune_cache: false,
        }
    }

    /// Defaults of the single-image search
    pub fn search_defaults() -> Self {
        Self {
            algorithm: HashAlgorithmKind::Perceptual,
            threshold: Threshold(90.0),
            ..Self::dedup_defaults()
        }
    }
}
