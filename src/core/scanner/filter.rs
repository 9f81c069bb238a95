//! File filtering logic for the scanner.

use std::collections::HashSet;
use std::path::Path;

/// Extensions decoded by the hashers
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp"];

/// Decides which paths the scanner reports and which directories it enters
#[derive(Debug, Clone)]
pub struct ImageFilter {
    /// Lowercase file extensions to include
    extensions: HashSet<String>,
    /// Path substrings that exclude a file or directory
    blacklist: Vec<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl ImageFilter {
    /// Default extensions, no blacklist, hidden files skipped
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            blacklist: Vec::new(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Skip any path containing one of these substrings
    pub fn with_blacklist(mut self, blacklist: Vec<String>) -> Self {
        self.blacklist = blacklist.into_iter().filter(|b| !b.is_empty()).collect();
        self
    }

    /// Whether the path contains a blacklisted substring
    pub fn is_blacklisted(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.blacklist.iter().any(|item| text.contains(item.as_str()))
    }

    fn is_hidden(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
    }

    /// Whether the scanner should descend into a directory
    pub fn should_enter(&self, dir: &Path) -> bool {
        if !self.include_hidden && Self::is_hidden(dir) {
            return false;
        }
        !self.is_blacklisted(dir)
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden && Self::is_hidden(path) {
            return false;
        }
        if self.is_blacklisted(path) {
            return false;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}
