//! Incremental cross-folder de-duplication with folder-pair gating.

use super::traits::{ComparisonStrategy, ThresholdStrategy};
use super::ComparisonResult;
use crate::core::config::Threshold;
use crate::core::hasher::Fingerprint;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Set of unordered directory pairs that already produced a match.
///
/// Once a pair is in the gate no file from one directory is compared with
/// a file from the other again.
#[derive(Debug, Clone, Default)]
pub struct FolderPairGate {
    pairs: HashSet<(PathBuf, PathBuf)>,
}

impl FolderPairGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &Path, b: &Path) -> (PathBuf, PathBuf) {
        if a <= b {
            (a.to_path_buf(), b.to_path_buf())
        } else {
            (b.to_path_buf(), a.to_path_buf())
        }
    }

    /// Whether `{a, b}` is gated, in either order
    pub fn contains(&self, a: &Path, b: &Path) -> bool {
        self.pairs.contains(&Self::key(a, b))
    }

    /// Gate `{a, b}`. Returns false if it was already gated.
    pub fn insert(&mut self, a: &Path, b: &Path) -> bool {
        self.pairs.insert(Self::key(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Counters for one de-duplication run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Fingerprints accepted into the processed set
    pub files_processed: usize,
    /// Hamming distances actually computed
    pub comparisons: usize,
    /// Pairs skipped because both files share a directory
    pub skipped_same_folder: usize,
    /// Pairs skipped because their directory pair was already reported
    pub skipped_by_gate: usize,
    /// Pairs skipped because the fingerprints had different shapes
    pub incompatible: usize,
    /// Results emitted
    pub matches: usize,
}

struct Processed {
    path: PathBuf,
    dir: PathBuf,
    fingerprint: Fingerprint,
}

/// Serial consumer of `(path, fingerprint)` pairs.
///
/// Owns the processed set and the folder-pair gate. Feed it with
/// [`offer`](Self::offer) in whatever order fingerprints become available;
/// at most one result is emitted per unordered directory pair.
pub struct DedupComparator {
    strategy: Box<dyn ComparisonStrategy>,
    processed: Vec<Processed>,
    seen: HashSet<PathBuf>,
    gate: FolderPairGate,
    stats: DedupStats,
}

impl DedupComparator {
    /// Comparator reporting pairs at least `threshold` similar
    pub fn new(threshold: Threshold) -> Self {
        Self::with_strategy(Box::new(ThresholdStrategy::new(threshold)))
    }

    pub fn with_strategy(strategy: Box<dyn ComparisonStrategy>) -> Self {
        Self {
            strategy,
            processed: Vec::new(),
            seen: HashSet::new(),
            gate: FolderPairGate::new(),
            stats: DedupStats::default(),
        }
    }

    /// Compare a new fingerprint against everything processed so far, then
    /// add it to the processed set.
    ///
    /// A path offered a second time is ignored.
    pub fn offer(&mut self, path: PathBuf, fingerprint: Fingerprint) -> Vec<ComparisonResult> {
        if !self.seen.insert(path.clone()) {
            debug!(path = %path.display(), "already compared, ignoring repeat");
            return Vec::new();
        }

        let dir = parent_dir(&path);
        let mut results = Vec::new();

        for old in &self.processed {
            if old.dir == dir {
                self.stats.skipped_same_folder += 1;
                continue;
            }
            if self.gate.contains(&old.dir, &dir) {
                self.stats.skipped_by_gate += 1;
                continue;
            }

            let distance = match fingerprint.distance(&old.fingerprint) {
                Ok(distance) => distance,
                Err(e) => {
                    warn!(
                        a = %old.path.display(),
                        b = %path.display(),
                        error = %e,
                        "skipping comparison"
                    );
                    self.stats.incompatible += 1;
                    continue;
                }
            };
            self.stats.comparisons += 1;

            if let Some(similarity) = self.strategy.accept(distance, fingerprint.bit_len()) {
                debug!(
                    a = %old.path.display(),
                    b = %path.display(),
                    distance,
                    similarity,
                    "folder pair matched"
                );
                self.gate.insert(&old.dir, &dir);
                results.push(ComparisonResult {
                    path_a: old.path.clone(),
                    path_b: path.clone(),
                    distance,
                    similarity_percent: similarity,
                });
            }
        }

        self.stats.matches += results.len();
        self.stats.files_processed += 1;
        self.processed.push(Processed {
            path,
            dir,
            fingerprint,
        });

        results
    }

    /// Offer many fingerprints in order, collecting every result
    pub fn offer_all(
        &mut self,
        items: impl IntoIterator<Item = (PathBuf, Fingerprint)>,
    ) -> Vec<ComparisonResult> {
        items
            .into_iter()
            .flat_map(|(path, fingerprint)| self.offer(path, fingerprint))
            .collect()
    }

    pub fn stats(&self) -> DedupStats {
        self.stats
    }

    pub fn gate(&self) -> &FolderPairGate {
        &self.gate
    }

    /// Number of fingerprints processed
    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
