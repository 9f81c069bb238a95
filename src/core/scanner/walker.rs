//! Directory walking implementation using walkdir.

use super::{filter::ImageFilter, ImageScanner, ScanResult};
use crate::core::cache::FileIdentity;
use crate::core::config::RunConfig;
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent, ScanProgress};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Maximum directory depth (None = unlimited)
    pub max_depth: Option<usize>,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
    /// Path substrings to skip
    pub blacklist: Vec<String>,
}

impl ScanConfig {
    /// Enumeration settings of a run
    pub fn from_run(config: &RunConfig) -> Self {
        Self {
            include_hidden: config.include_hidden,
            blacklist: config.blacklist.clone(),
            extensions: config.extensions.clone(),
            follow_symlinks: config.follow_symlinks,
            max_depth: config.max_depth,
        }
    }
}

/// Scanner implementation using the walkdir crate
///
/// One sequential iterator per root; directory fan-out never spawns work.
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new()
            .with_hidden(config.include_hidden)
            .with_blacklist(config.blacklist.clone());

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }

    /// Scan a single root
    fn scan_directory(
        &self,
        root: &Path,
        events: &EventSender,
        result: &mut ScanResult,
    ) -> Result<(), ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let mut directories_scanned = 0;

        let mut walker = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        if let Some(depth) = self.config.max_depth {
            walker = walker.max_depth(depth);
        }

        let filter = &self.filter;
        let entries = walker.into_iter().filter_entry(|entry| {
            entry.depth() == 0 || !entry.file_type().is_dir() || filter.should_enter(entry.path())
        });

        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    let error = if e.io_error().map(|io| io.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    result.errors.push(error);
                    continue;
                }
            };

            let path = entry.path();

            if entry.file_type().is_dir() {
                directories_scanned += 1;
                events.send(Event::Scan(ScanEvent::Progress(ScanProgress {
                    directories_scanned,
                    files_found: result.files.len(),
                    current_path: path.to_path_buf(),
                })));
                continue;
            }

            if !filter.should_include(path) {
                continue;
            }

            match entry.metadata() {
                Ok(metadata) if metadata.is_file() => {
                    result.files.push(FileIdentity::new(
                        path,
                        metadata.len(),
                        metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                    ));
                }
                Ok(_) => {}
                Err(e) => {
                    let error = ScanError::ReadDirectory {
                        path: path.to_path_buf(),
                        source: std::io::Error::other(e.to_string()),
                    };
                    events.send(Event::Scan(ScanEvent::Error {
                        path: path.to_path_buf(),
                        message: error.to_string(),
                    }));
                    result.errors.push(error);
                }
            }
        }

        Ok(())
    }
}

impl ImageScanner for WalkDirScanner {
    fn scan(&self, paths: &[PathBuf]) -> Result<ScanResult, ScanError> {
        self.scan_with_events(paths, &null_sender())
    }

    fn scan_with_events(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            paths: paths.to_vec(),
        }));

        let mut result = ScanResult::default();
        for path in paths {
            if let Err(e) = self.scan_directory(path, events, &mut result) {
                events.send(Event::Scan(ScanEvent::Error {
                    path: path.clone(),
                    message: e.to_string(),
                }));
                result.errors.push(e);
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_files: result.files.len(),
        }));

        Ok(result)
    }
}
