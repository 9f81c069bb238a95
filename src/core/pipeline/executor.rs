//! Pipeline execution implementation.

use super::dispatcher::{merge_outcomes, summarize, DispatchReport, Dispatcher};
use crate::core::cache::{open_store, CacheStore, FileIdentity, HashCache};
use crate::core::comparator::{
    find_first_match, ComparisonResult, DedupComparator, DedupStats, SearchOutcome,
};
use crate::core::config::{RunConfig, Threshold};
use crate::core::hasher::{fingerprint_file, HashAlgorithm, HasherConfig};
use crate::core::scanner::{ImageScanner, ScanConfig, WalkDirScanner};
use crate::core::sink::ResultSink;
use crate::error::{ConfigError, SimilarityError, SinkError};
use crate::events::{
    null_sender, CacheEvent, CompareEvent, Event, EventSender, HashEvent, PipelineEvent,
    PipelinePhase, PipelineSummary, SearchEvent,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Result of a folder-to-folder duplicate scan
#[derive(Debug, Serialize)]
pub struct DedupReport {
    /// Every reported pair, in report order
    pub results: Vec<ComparisonResult>,
    /// Image files enumerated
    pub total_files: usize,
    /// Fingerprints served from the cache
    pub cache_hits: usize,
    /// Fingerprints computed in this run
    pub computed: usize,
    /// Files that produced no fingerprint
    pub no_hash: usize,
    /// Comparator counters
    pub comparisons: DedupStats,
    /// Non-fatal errors (scan and read failures)
    pub errors: Vec<String>,
    /// Whether the cache was written
    pub cache_saved: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Result of a single-image search
#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    /// Image files enumerated in the folder
    pub total_files: usize,
    pub cache_hits: usize,
    pub computed: usize,
    pub no_hash: usize,
    pub errors: Vec<String>,
    pub cache_saved: bool,
    pub duration_ms: u64,
}

/// Steps shared by both pipelines
struct RunContext<'a> {
    config: &'a RunConfig,
    store: Option<Box<dyn CacheStore>>,
    events: &'a EventSender,
}

impl<'a> RunContext<'a> {
    fn new(
        config: &'a RunConfig,
        store: Option<Box<dyn CacheStore>>,
        events: &'a EventSender,
    ) -> Self {
        let store = store.or_else(|| open_store(&config.cache));
        Self {
            config,
            store,
            events,
        }
    }

    fn phase(&self, phase: PipelinePhase) {
        self.events
            .send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }

    fn build_hasher(&self) -> Result<Box<dyn HashAlgorithm>, ConfigError> {
        build_hasher(self.config)
    }

    fn load_cache(&self) -> HashCache {
        match &self.store {
            Some(store) => {
                let cache = HashCache::load(store.as_ref());
                self.events.send(Event::Cache(CacheEvent::Loaded {
                    store: store.describe(),
                    entries: cache.len(),
                }));
                cache
            }
            None => HashCache::new(),
        }
    }

    fn scan(
        &self,
        roots: &[PathBuf],
        errors: &mut Vec<String>,
    ) -> Result<Vec<FileIdentity>, SimilarityError> {
        self.phase(PipelinePhase::Scanning);
        let scanner = WalkDirScanner::new(ScanConfig::from_run(self.config));
        let result = scanner.scan_with_events(roots, self.events)?;
        errors.extend(result.errors.iter().map(|e| e.to_string()));

        // Nested roots reach the same file twice
        let mut seen = HashSet::new();
        let mut files = result.files;
        files.retain(|identity| seen.insert(identity.path.clone()));
        Ok(files)
    }

    /// Prune if asked, then save. Failures are logged, never returned.
    fn finish_cache(&self, cache: &mut HashCache) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        self.phase(PipelinePhase::Saving);

        if self.config.prune_cache {
            let removed = cache.prune_missing();
            self.events.send(Event::Cache(CacheEvent::Pruned { removed }));
        }

        match cache.save(store.as_ref()) {
            Ok(()) => {
                self.events.send(Event::Cache(CacheEvent::Saved {
                    store: store.describe(),
                    entries: cache.len(),
                }));
                true
            }
            Err(e) => {
                warn!(store = %store.describe(), error = %e, "failed to save fingerprint cache");
                self.events.send(Event::Cache(CacheEvent::SaveFailed {
                    store: store.describe(),
                    message: e.to_string(),
                }));
                false
            }
        }
    }
}

fn build_hasher(config: &RunConfig) -> Result<Box<dyn HashAlgorithm>, ConfigError> {
    HasherConfig::new()
        .algorithm(config.algorithm)
        .hash_size(config.hash_size)
        .build()
        .map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Absolute, symlink-free form of an existing folder
///
/// Cache keys and folder pairs are built from scanned paths, so roots are
/// resolved once here and every path below them is absolute.
fn require_folder(path: &Path) -> Result<PathBuf, ConfigError> {
    let invalid = || ConfigError::InvalidFolder {
        path: path.to_path_buf(),
    };
    if !path.is_dir() {
        return Err(invalid());
    }
    fs::canonicalize(path).map_err(|_| invalid())
}

/// Builder for the de-duplication pipeline
pub struct DedupPipelineBuilder {
    roots: Vec<PathBuf>,
    config: RunConfig,
    threshold: Option<f64>,
    store: Option<Box<dyn CacheStore>>,
}

impl DedupPipelineBuilder {
    pub fn new() -> Self {
        Self {
            roots: Vec::new(),
            config: RunConfig::dedup_defaults(),
            threshold: None,
            store: None,
        }
    }

    /// Directories to scan
    pub fn paths(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = roots;
        self
    }

    /// Replace every run setting
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Similarity threshold in percent, validated by `build`
    pub fn threshold(mut self, percent: f64) -> Self {
        self.threshold = Some(percent);
        self
    }

    /// Use this store instead of the configured cache location
    pub fn cache_store(mut self, store: Box<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Validate and build. Nothing touches the disk before this succeeds.
    pub fn build(mut self) -> Result<DedupPipeline, ConfigError> {
        if let Some(percent) = self.threshold {
            self.config.threshold = Threshold::new(percent)?;
        }
        build_hasher(&self.config)?;
        if self.roots.is_empty() {
            return Err(ConfigError::Invalid("no folder to scan".to_string()));
        }
        let mut roots: Vec<PathBuf> = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let root = require_folder(root)?;
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        Ok(DedupPipeline {
            roots,
            config: self.config,
            store: self.store,
        })
    }
}

impl Default for DedupPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan folders and report near-duplicates across folders
pub struct DedupPipeline {
    roots: Vec<PathBuf>,
    config: RunConfig,
    store: Option<Box<dyn CacheStore>>,
}

impl DedupPipeline {
    pub fn builder() -> DedupPipelineBuilder {
        DedupPipelineBuilder::new()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run without events
    pub fn run(self, sink: &mut dyn ResultSink) -> Result<DedupReport, SimilarityError> {
        self.run_with_events(sink, &null_sender())
    }

    /// Run with event reporting.
    ///
    /// Cache hits are compared first, in enumeration order; computed
    /// fingerprints follow in completion order. Results reach `sink` as
    /// soon as they are found.
    pub fn run_with_events(
        self,
        sink: &mut dyn ResultSink,
        events: &EventSender,
    ) -> Result<DedupReport, SimilarityError> {
        let start_time = Instant::now();
        let ctx = RunContext::new(&self.config, self.store, events);
        let hasher = ctx.build_hasher()?;
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));
        let mut cache = ctx.load_cache();
        let files = ctx.scan(&self.roots, &mut errors)?;

        ctx.phase(PipelinePhase::Hashing);
        let dispatcher = Dispatcher::new(hasher.as_ref(), self.config.concurrency);
        let (hits, misses) = dispatcher.partition(&files, &cache);
        events.send(Event::Hash(HashEvent::Started {
            to_compute: misses.len(),
            cache_hits: hits.len(),
        }));

        let mut comparator = DedupComparator::new(self.config.threshold);
        let mut results = Vec::new();
        let mut sink_error: Option<SinkError> = None;
        let mut emit = |found: Vec<ComparisonResult>| {
            for result in found {
                events.send(Event::Compare(CompareEvent::MatchFound {
                    path_a: result.path_a.clone(),
                    path_b: result.path_b.clone(),
                    similarity_percent: result.similarity_percent,
                }));
                if sink_error.is_none() {
                    if let Err(e) = sink.record(&result) {
                        sink_error = Some(e);
                    }
                }
                results.push(result);
            }
        };

        let cache_hits = hits.len();
        for (identity, fingerprint) in hits {
            emit(comparator.offer(identity.path, fingerprint));
        }

        let outcomes = dispatcher.run(misses, events, |outcome| {
            if let Some(fingerprint) = outcome.fingerprint() {
                emit(comparator.offer(outcome.identity.path.clone(), fingerprint.clone()));
            }
        });

        // All workers have joined: the cache is ours again
        let DispatchReport {
            computed,
            no_hash,
            errors: hash_errors,
            ..
        } = summarize(&outcomes);
        events.send(Event::Hash(HashEvent::Completed {
            computed,
            no_hash,
            errors: hash_errors.len(),
        }));
        errors.extend(
            hash_errors
                .into_iter()
                .map(|(path, message)| format!("{}: {}", path.display(), message)),
        );
        merge_outcomes(&mut cache, outcomes);

        let stats = comparator.stats();
        events.send(Event::Compare(CompareEvent::Completed {
            files_compared: stats.files_processed,
            comparisons: stats.comparisons,
            skipped_by_gate: stats.skipped_by_gate,
            matches: stats.matches,
        }));

        let cache_saved = ctx.finish_cache(&mut cache);

        if let Some(e) = sink_error {
            return Err(e.into());
        }
        sink.finish()?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            files = files.len(),
            cache_hits,
            computed,
            matches = results.len(),
            comparisons = stats.comparisons,
            skipped_by_gate = stats.skipped_by_gate,
            duration_ms,
            "dedup finished"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files: files.len(),
                cache_hits,
                computed,
                no_hash,
                errors: errors.len(),
                matches: results.len(),
                duration_ms,
            },
        }));

        Ok(DedupReport {
            results,
            total_files: files.len(),
            cache_hits,
            computed,
            no_hash,
            comparisons: stats,
            errors,
            cache_saved,
            duration_ms,
        })
    }
}

/// Builder for the single-image search pipeline
pub struct SearchPipelineBuilder {
    query: Option<PathBuf>,
    folder: Option<PathBuf>,
    config: RunConfig,
    threshold: Option<f64>,
    store: Option<Box<dyn CacheStore>>,
}

impl SearchPipelineBuilder {
    pub fn new() -> Self {
        Self {
            query: None,
            folder: None,
            config: RunConfig::search_defaults(),
            threshold: None,
            store: None,
        }
    }

    /// The image to look for
    pub fn query(mut self, path: impl Into<PathBuf>) -> Self {
        self.query = Some(path.into());
        self
    }

    /// The folder to search
    pub fn folder(mut self, path: impl Into<PathBuf>) -> Self {
        self.folder = Some(path.into());
        self
    }

    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn threshold(mut self, percent: f64) -> Self {
        self.threshold = Some(percent);
        self
    }

    pub fn cache_store(mut self, store: Box<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Validate and build. Nothing touches the disk before this succeeds.
    pub fn build(mut self) -> Result<SearchPipeline, ConfigError> {
        if let Some(percent) = self.threshold {
            self.config.threshold = Threshold::new(percent)?;
        }
        build_hasher(&self.config)?;
        let query = self
            .query
            .ok_or_else(|| ConfigError::Invalid("no query image given".to_string()))?;
        if !query.is_file() {
            return Err(ConfigError::InvalidInputImage { path: query });
        }
        let query = fs::canonicalize(&query)
            .map_err(|_| ConfigError::InvalidInputImage { path: query })?;
        let folder = self
            .folder
            .ok_or_else(|| ConfigError::Invalid("no folder to search".to_string()))?;
        let folder = require_folder(&folder)?;

        Ok(SearchPipeline {
            query,
            folder,
            config: self.config,
            store: self.store,
        })
    }
}

impl Default for SearchPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the first image in a folder that looks like a query image
pub struct SearchPipeline {
    query: PathBuf,
    folder: PathBuf,
    config: RunConfig,
    store: Option<Box<dyn CacheStore>>,
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("query", &self.query)
            .field("folder", &self.folder)
            .field("config", &self.config)
            .field("store", &self.store.is_some())
            .finish()
    }
}

impl SearchPipeline {
    pub fn builder() -> SearchPipelineBuilder {
        SearchPipelineBuilder::new()
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run(self) -> Result<SearchReport, SimilarityError> {
        self.run_with_events(&null_sender())
    }

    /// Run with event reporting.
    ///
    /// The query is fingerprinted before the folder is scanned, so an
    /// unusable query fails without any other work.
    pub fn run_with_events(self, events: &EventSender) -> Result<SearchReport, SimilarityError> {
        let start_time = Instant::now();
        let ctx = RunContext::new(&self.config, self.store, events);
        let hasher = ctx.build_hasher()?;
        let (kind, bit_len) = (hasher.kind(), hasher.bit_len());
        let mut errors = Vec::new();

        events.send(Event::Pipeline(PipelineEvent::Started));
        let mut cache = ctx.load_cache();

        let query_fingerprint = {
            let cached = FileIdentity::from_path(&self.query)
                .ok()
                .and_then(|identity| cache.get(&identity, kind, bit_len).cloned());
            match cached {
                Some(fingerprint) => fingerprint,
                None => fingerprint_file(hasher.as_ref(), &self.query)?.ok_or_else(|| {
                    ConfigError::UnhashableInput {
                        path: self.query.clone(),
                    }
                })?,
            }
        };

        let files = ctx.scan(std::slice::from_ref(&self.folder), &mut errors)?;

        ctx.phase(PipelinePhase::Hashing);
        let dispatcher = Dispatcher::new(hasher.as_ref(), self.config.concurrency);
        let report = dispatcher.compute_missing(&files, &mut cache, events);
        errors.extend(
            report
                .errors
                .iter()
                .map(|(path, message)| format!("{}: {}", path.display(), message)),
        );

        ctx.phase(PipelinePhase::Searching);
        events.send(Event::Search(SearchEvent::Started {
            query: self.query.clone(),
            candidates: files.len(),
        }));
        let candidates = files
            .iter()
            .map(|identity| (identity.path.as_path(), cache.get(identity, kind, bit_len)));
        let outcome = find_first_match(
            &query_fingerprint,
            &self.query,
            candidates,
            self.config.threshold,
        );
        events.send(Event::Search(SearchEvent::Completed {
            matched: match &outcome {
                SearchOutcome::Match(m) => Some(m.match_path.clone()),
                SearchOutcome::NotFound { .. } => None,
            },
            scanned: outcome.scanned(),
        }));

        let cache_saved = ctx.finish_cache(&mut cache);

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            files = files.len(),
            cache_hits = report.cache_hits,
            computed = report.computed,
            matched = outcome.is_match(),
            duration_ms,
            "search finished"
        );

        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_files: files.len(),
                cache_hits: report.cache_hits,
                computed: report.computed,
                no_hash: report.no_hash,
                errors: errors.len(),
                matches: usize::from(outcome.is_match()),
                duration_ms,
            },
        }));

        Ok(SearchReport {
            outcome,
            total_files: files.len(),
            cache_hits: report.cache_hits,
            computed: report.computed,
            no_hash: report.no_hash,
            errors,
            cache_saved,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{InMemoryStore, JsonFileStore};
    use crate::core::config::{CacheLocation, Concurrency};
    use crate::core::sink::MemorySink;
    use image::{DynamicImage, ImageBuffer, Rgb};
    use tempfile::TempDir;

    fn pattern(seed: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_fn(64, 64, |x, y| {
            let v = if ((x / 8) * seed + (y / 8)) % 3 == 0 { 255u8 } else { 0 };
            Rgb([v, v, v])
        }))
    }

    fn save(dir: &Path, name: &str, image: &DynamicImage) -> PathBuf {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn builder_rejects_bad_threshold_before_any_work() {
        let temp_dir = TempDir::new().unwrap();
        let result = DedupPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .threshold(101.0)
            .build();

        assert!(matches!(result, Err(ConfigError::ThresholdOutOfRange { .. })));
    }

    #[test]
    fn builder_rejects_missing_folder() {
        let result = DedupPipeline::builder()
            .paths(vec![PathBuf::from("/nonexistent/photos")])
            .build();

        assert!(matches!(result, Err(ConfigError::InvalidFolder { .. })));
    }

    #[test]
    fn dedup_handles_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut sink = MemorySink::new();

        let report = DedupPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .build()
            .unwrap()
            .run(&mut sink)
            .unwrap();

        assert_eq!(report.total_files, 0);
        assert!(report.results.is_empty());
        assert!(!report.cache_saved);
    }

    #[test]
    fn dedup_reports_cross_folder_copy_once() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        save(root, "x/a.png", &pattern(1));
        save(root, "x/b.png", &pattern(1));
        save(root, "y/c.png", &pattern(1));

        let mut sink = MemorySink::new();
        let report = DedupPipeline::builder()
            .paths(vec![root.to_path_buf()])
            .build()
            .unwrap()
            .run(&mut sink)
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(sink.results().len(), 1);
        assert_eq!(report.results[0].similarity_percent, 100.0);
    }

    #[test]
    fn second_run_is_served_from_cache() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("photos");
        save(&root, "x/a.png", &pattern(1));
        save(&root, "y/a.png", &pattern(1));
        let store = std::sync::Arc::new(InMemoryStore::new());

        struct Shared(std::sync::Arc<InMemoryStore>);
        impl CacheStore for Shared {
            fn load(&self) -> Result<Option<HashCache>, crate::error::CacheError> {
                self.0.load()
            }
            fn save(&self, cache: &HashCache) -> Result<(), crate::error::CacheError> {
                self.0.save(cache)
            }
            fn describe(&self) -> String {
                self.0.describe()
            }
        }

        let run = || {
            DedupPipeline::builder()
                .paths(vec![root.clone()])
                .cache_store(Box::new(Shared(store.clone())))
                .build()
                .unwrap()
                .run(&mut MemorySink::new())
                .unwrap()
        };

        let first = run();
        let second = run();

        assert_eq!(first.computed, 2);
        assert!(first.cache_saved);
        assert_eq!(second.cache_hits, 2);
        assert_eq!(second.computed, 0);
        assert_eq!(second.results.len(), 1);
    }

    #[test]
    fn search_finds_copy_and_skips_itself() {
        let temp_dir = TempDir::new().unwrap();
        let folder = temp_dir.path().join("library");
        let query = save(&folder, "query.png", &pattern(1));
        save(&folder, "other.png", &pattern(5));
        let copy = save(&folder, "sub/copy.png", &pattern(1));

        let config = RunConfig {
            concurrency: Concurrency::new(2),
            ..RunConfig::search_defaults()
        };
        let report = SearchPipeline::builder()
            .query(&query)
            .folder(&folder)
            .config(config)
            .build()
            .unwrap()
            .run()
            .unwrap();

        match report.outcome {
            SearchOutcome::Match(m) => assert_eq!(m.match_path, copy.canonicalize().unwrap()),
            other => panic!("expected a match, got {:?}", other),
        }
        assert_eq!(report.total_files, 3);
    }

    #[test]
    fn search_with_unhashable_query_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let query = temp_dir.path().join("query.png");
        std::fs::write(&query, b"not a png").unwrap();

        let result = SearchPipeline::builder()
            .query(&query)
            .folder(temp_dir.path())
            .build()
            .unwrap()
            .run();

        match result {
            Err(e @ SimilarityError::Config(ConfigError::UnhashableInput { .. })) => {
                assert_eq!(e.exit_code(), crate::error::exit_code::CONFIG_ERROR);
            }
            other => panic!("expected a configuration error, got {:?}", other.map(|r| r.outcome)),
        }
    }

    #[test]
    fn search_builder_requires_existing_query() {
        let temp_dir = TempDir::new().unwrap();
        let result = SearchPipeline::builder()
            .query(temp_dir.path().join("missing.png"))
            .folder(temp_dir.path())
            .build();

        assert!(matches!(result, Err(ConfigError::InvalidInputImage { .. })));
    }

    #[test]
    fn builders_reject_unsupported_hash_size() {
        let temp_dir = TempDir::new().unwrap();
        let query = save(temp_dir.path(), "query.png", &pattern(1));
        let config = RunConfig {
            hash_size: 1,
            ..RunConfig::dedup_defaults()
        };

        let dedup = DedupPipeline::builder()
            .paths(vec![temp_dir.path().to_path_buf()])
            .config(config.clone())
            .build();
        assert!(matches!(dedup, Err(ConfigError::Invalid(_))));

        let search = SearchPipeline::builder()
            .query(&query)
            .folder(temp_dir.path())
            .config(config)
            .build();
        assert!(matches!(search, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn relative_and_absolute_roots_name_the_same_files() {
        let cwd = std::env::current_dir().unwrap();
        let temp_dir = TempDir::new_in(&cwd).unwrap();
        let absolute = temp_dir.path().to_path_buf();
        let relative = absolute.strip_prefix(&cwd).unwrap().to_path_buf();
        assert!(relative.is_relative());
        save(&absolute, "x/a.png", &pattern(1));
        let cache_path = absolute.join("hashes.json");

        let config = RunConfig {
            cache: CacheLocation::File(cache_path.clone()),
            ..RunConfig::dedup_defaults()
        };
        let report = DedupPipeline::builder()
            .paths(vec![relative, absolute])
            .config(config)
            .build()
            .unwrap()
            .run(&mut MemorySink::new())
            .unwrap();

        assert!(report.results.is_empty());
        assert_eq!(report.total_files, 1);
        assert_eq!(report.computed, 1);

        let cache = JsonFileStore::new(&cache_path).load().unwrap().unwrap();
        let keys: Vec<_> = cache.iter().map(|(path, _)| path.clone()).collect();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].is_absolute());
    }

    #[test]
    fn search_query_reached_by_relative_path_is_not_its_own_match() {
        let cwd = std::env::current_dir().unwrap();
        let temp_dir = TempDir::new_in(&cwd).unwrap();
        let query = save(temp_dir.path(), "query.png", &pattern(1));
        let relative_query = query.strip_prefix(&cwd).unwrap().to_path_buf();

        let report = SearchPipeline::builder()
            .query(relative_query)
            .folder(temp_dir.path())
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(report.outcome, SearchOutcome::NotFound { scanned: 1 });
    }
}
