//! # Scanner Module
//!
//! Enumerates candidate image files under one or more roots.
//!
//! ## Rules
//! - Case-insensitive extensions: jpg, jpeg, png, gif, bmp, tif, tiff, webp
//! - Any path containing a blacklist entry is skipped, and blacklisted
//!   directories are not descended into
//! - Hidden files and directories are skipped unless enabled
//! - Output order is stable: roots in the order given, entries sorted by
//!   file name within each directory
//!
//! Unreadable entries are collected as non-fatal errors.
//!
//! ## Example
//! ```rust,ignore
//! use similar_photo_finder::core::scanner::{ImageScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let result = scanner.scan(&["/Users/me/Pictures".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::core::cache::FileIdentity;
use crate::error::ScanError;
use crate::events::EventSender;
use std::path::PathBuf;

/// Result of a scan operation
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered image files, in enumeration order
    pub files: Vec<FileIdentity>,
    /// Errors that occurred during scanning (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for file enumerators
pub trait ImageScanner: Send + Sync {
    /// Scan directories and return discovered image files
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError>;
}
