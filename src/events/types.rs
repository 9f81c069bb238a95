//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the matching pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Enumeration events
    Scan(ScanEvent),
    /// Fingerprinting events
    Hash(HashEvent),
    /// Folder-to-folder comparison events
    Compare(CompareEvent),
    /// Single-image search events
    Search(SearchEvent),
    /// Fingerprint cache events
    Cache(CacheEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Scanning has started
    Started { paths: Vec<PathBuf> },
    /// Progress update during scanning
    Progress(ScanProgress),
    /// An error occurred but scanning continues
    Error { path: PathBuf, message: String },
    /// Scanning completed
    Completed { total_files: usize },
}

/// Progress information during scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanProgress {
    /// Number of directories entered so far
    pub directories_scanned: usize,
    /// Number of image files found so far
    pub files_found: usize,
    /// Directory being scanned
    pub current_path: PathBuf,
}

/// Events during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Fingerprinting has started
    Started {
        /// Files that need computing
        to_compute: usize,
        /// Files served from the cache
        cache_hits: usize,
    },
    /// A file was fingerprinted (or given up on)
    Progress(HashProgress),
    /// A file produced no fingerprint
    NoHash { path: PathBuf },
    /// A file could not be read
    Error { path: PathBuf, message: String },
    /// Every worker has finished
    Completed {
        computed: usize,
        no_hash: usize,
        errors: usize,
    },
}

/// Progress information during fingerprinting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Files finished so far, successful or not
    pub completed: usize,
    /// Files to fingerprint in total
    pub total: usize,
    /// The file just finished
    pub current_path: PathBuf,
}

/// Events during folder-to-folder comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompareEvent {
    /// A near-duplicate pair was reported
    MatchFound {
        path_a: PathBuf,
        path_b: PathBuf,
        similarity_percent: f64,
    },
    /// Comparison completed
    Completed {
        files_compared: usize,
        comparisons: usize,
        skipped_by_gate: usize,
        matches: usize,
    },
}

/// Events during single-image search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchEvent {
    /// The corpus scan has started
    Started { query: PathBuf, candidates: usize },
    /// The scan ended, with or without a match
    Completed {
        matched: Option<PathBuf>,
        scanned: usize,
    },
}

/// Fingerprint cache events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CacheEvent {
    /// Cache loaded (possibly empty)
    Loaded { store: String, entries: usize },
    /// Entries removed because their files are gone
    Pruned { removed: usize },
    /// Cache written
    Saved { store: String, entries: usize },
    /// Cache could not be written; this run's results are unaffected
    SaveFailed { store: String, message: String },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Hashing,
    Comparing,
    Searching,
    Saving,
}

/// Summary of a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Image files enumerated
    pub total_files: usize,
    /// Fingerprints served from the cache
    pub cache_hits: usize,
    /// Fingerprints computed in this run
    pub computed: usize,
    /// Files that produced no fingerprint
    pub no_hash: usize,
    /// Files that could not be read
    pub errors: usize,
    /// Pairs or search matches reported
    pub matches: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Hashing => write!(f, "Hashing"),
            PipelinePhase::Comparing => write!(f, "Comparing"),
            PipelinePhase::Searching => write!(f, "Searching"),
            PipelinePhase::Saving => write!(f, "Saving"),
        }
    }
}
