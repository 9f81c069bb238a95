//! # Error Module
//!
//! Error types for the similar photo finder.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, values, what went wrong
//! - **Most failures are local** - a broken image or a corrupt cache is
//!   logged and skipped; only configuration problems stop a run

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Output error: {0}")]
    Sink(#[from] SinkError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SimilarityError {
    /// Process exit status for this error.
    ///
    /// `0` and `1` are reserved for "match found" and "no match".
    pub fn exit_code(&self) -> u8 {
        match self {
            SimilarityError::Config(_) => exit_code::CONFIG_ERROR,
            _ => exit_code::IO_ERROR,
        }
    }
}

/// Process exit statuses used by the CLI
pub mod exit_code {
    /// Run completed; for `search` a match was found
    pub const SUCCESS: u8 = 0;
    /// `search` scanned every candidate without a match
    pub const NO_MATCH: u8 = 1;
    /// Invalid arguments, rejected before any work started
    pub const CONFIG_ERROR: u8 = 2;
    /// Filesystem or output failure
    pub const IO_ERROR: u8 = 3;
}

/// Errors that occur during photo scanning
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur during image hashing
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty or corrupted: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Hash computation failed: {0}")]
    ComputationFailed(String),

    #[error("Unsupported hash size {size} (must be 2-64)")]
    UnsupportedHashSize { size: u32 },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while comparing fingerprints
#[derive(Error, Debug)]
pub enum CompareError {
    #[error(
        "Cannot compare a {left_algorithm} fingerprint of {left_bits} bits \
         with a {right_algorithm} fingerprint of {right_bits} bits"
    )]
    IncompatibleFingerprints {
        left_algorithm: String,
        left_bits: u32,
        right_algorithm: String,
        right_bits: u32,
    },
}

/// Errors that occur with the hash cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to open cache at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Cache corruption detected at {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("Failed to write cache to {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Failed to serialize hash data: {0}")]
    SerializationFailed(String),
}

/// Errors that occur while writing results
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to create output file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write result row: {0}")]
    Write(#[from] csv::Error),

    #[error("Failed to flush output: {0}")]
    Flush(#[from] std::io::Error),
}

/// Invalid run configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Similarity threshold must be between 0 and 100, got {value}")]
    ThresholdOutOfRange { value: f64 },

    #[error("Input image not found or is a directory: {path}")]
    InvalidInputImage { path: PathBuf },

    #[error("Folder not found or is not a directory: {path}")]
    InvalidFolder { path: PathBuf },

    #[error("Could not compute a fingerprint for the input image: {path}")]
    UnhashableInput { path: PathBuf },

    #[error("{0}")]
    Invalid(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, SimilarityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_includes_path() {
        let error = ScanError::DirectoryNotFound {
            path: PathBuf::from("/photos/vacation"),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/vacation"));
    }

    #[test]
    fn hash_error_includes_path() {
        let error = HashError::DecodeError {
            path: PathBuf::from("/photos/broken.jpg"),
            reason: "invalid JPEG".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/photos/broken.jpg"));
        assert!(message.contains("invalid JPEG"));
    }

    #[test]
    fn threshold_error_reports_value() {
        let error = ConfigError::ThresholdOutOfRange { value: 120.5 };
        assert!(error.to_string().contains("120.5"));
    }

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let error: SimilarityError = ConfigError::ThresholdOutOfRange { value: -1.0 }.into();
        assert_eq!(error.exit_code(), exit_code::CONFIG_ERROR);
    }

    #[test]
    fn scan_errors_map_to_io_exit_code() {
        let error: SimilarityError = ScanError::DirectoryNotFound {
            path: PathBuf::from("/missing"),
        }
        .into();
        assert_eq!(error.exit_code(), exit_code::IO_ERROR);
    }
}
