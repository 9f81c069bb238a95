//! First-match search of one query fingerprint against a corpus.

use super::traits::{ComparisonStrategy, ThresholdStrategy};
use crate::core::config::Threshold;
use crate::core::hasher::Fingerprint;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A candidate close enough to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch {
    pub query_path: PathBuf,
    pub match_path: PathBuf,
    pub distance: u32,
    pub similarity_percent: f64,
    /// Candidates examined up to and including the match
    pub scanned: usize,
}

/// Result of a search. `NotFound` is a normal outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    Match(SearchMatch),
    NotFound { scanned: usize },
}

impl SearchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, SearchOutcome::Match(_))
    }

    pub fn scanned(&self) -> usize {
        match self {
            SearchOutcome::Match(m) => m.scanned,
            SearchOutcome::NotFound { scanned } => *scanned,
        }
    }
}

/// Absolute form of a path, following symlinks when the file exists
fn resolve(path: &Path) -> std::io::Result<PathBuf> {
    fs::canonicalize(path).or_else(|_| std::path::absolute(path))
}

/// Scan `candidates` in the order given and return the first one within
/// `threshold` of `query`.
///
/// The query itself is skipped by comparing resolved absolute paths, so a
/// relative query path still excludes its absolute twin. Candidates
/// without a fingerprint and candidates of another fingerprint shape are
/// skipped. This is the first acceptable match, not the closest.
pub fn find_first_match<'a, I>(
    query: &Fingerprint,
    query_path: &Path,
    candidates: I,
    threshold: Threshold,
) -> SearchOutcome
where
    I: IntoIterator<Item = (&'a Path, Option<&'a Fingerprint>)>,
{
    let strategy = ThresholdStrategy::new(threshold);
    let query_resolved = resolve(query_path).unwrap_or_else(|_| query_path.to_path_buf());
    debug!(
        query = %query_resolved.display(),
        max_distance = strategy.max_distance(query.bit_len()),
        "searching"
    );

    let mut scanned = 0;
    for (path, fingerprint) in candidates {
        scanned += 1;

        let Some(fingerprint) = fingerprint else {
            continue;
        };

        match resolve(path) {
            Ok(resolved) if resolved == query_resolved => continue,
            Ok(_) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot resolve candidate path, skipping");
                continue;
            }
        }

        let distance = match query.distance(fingerprint) {
            Ok(distance) => distance,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping candidate");
                continue;
            }
        };

        if let Some(similarity) = strategy.accept(distance, query.bit_len()) {
            return SearchOutcome::Match(SearchMatch {
                query_path: query_path.to_path_buf(),
                match_path: path.to_path_buf(),
                distance,
                similarity_percent: similarity,
                scanned,
            });
        }
    }

    SearchOutcome::NotFound { scanned }
}
