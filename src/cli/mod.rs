//! # CLI Module
//!
//! Command-line interface for the similar photo finder.
//!
//! ## Usage
//! ```bash
//! # Report near-duplicates between folders into results.csv
//! photo-similar dedup ~/Photos
//!
//! # Stricter threshold, JSON summary on stdout
//! photo-similar dedup ~/Photos ~/Backup --threshold 98 --format json
//!
//! # Is this image already somewhere in my library?
//! photo-similar search ~/Downloads/img.jpg ~/Photos
//! ```
//!
//! ## Exit status
//! 0 success or match found, 1 no match, 2 configuration error, 3 I/O error.

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use similar_photo_finder::core::comparator::SearchOutcome;
use similar_photo_finder::core::config::{
    CacheLocation, Concurrency, RunConfig, DEFAULT_CACHE_FILE_NAME,
};
use similar_photo_finder::core::hasher::HashAlgorithmKind;
use similar_photo_finder::core::pipeline::{DedupPipeline, DedupReport, SearchPipeline, SearchReport};
use similar_photo_finder::core::sink::{format_similarity, CsvSink};
use similar_photo_finder::error::{exit_code, Result};
use similar_photo_finder::events::{
    CacheEvent, CompareEvent, Event, EventChannel, EventReceiver, HashEvent, PipelineEvent,
    ScanEvent,
};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::warn;

/// Similar Photo Finder - perceptual near-duplicate detection
#[derive(Parser, Debug)]
#[command(name = "photo-similar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by both subcommands
#[derive(clap::Args, Debug)]
struct CommonArgs {
    /// Hashing workers (0 or negative = one per CPU)
    #[arg(short = 'j', long, default_value_t = 0, allow_negative_numbers = true)]
    concurrency: i64,

    /// Fingerprint grid size (bits = size x size)
    #[arg(long, default_value_t = 8)]
    hash_size: u32,

    /// Fingerprint cache file (.json, or .db/.sqlite for SQLite)
    #[arg(long, conflicts_with = "no_cache")]
    cache: Option<PathBuf>,

    /// Neither read nor write the fingerprint cache
    #[arg(long)]
    no_cache: bool,

    /// Drop cache entries for files that no longer exist
    #[arg(long)]
    prune: bool,

    /// Skip paths containing this text (repeatable; replaces the defaults)
    #[arg(long = "blacklist")]
    blacklist: Vec<String>,

    /// Only scan these extensions (repeatable, e.g. --ext jpg --ext png)
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Include hidden files and folders
    #[arg(long)]
    include_hidden: bool,

    /// Descend into symlinked folders
    #[arg(long)]
    follow_symlinks: bool,

    /// Deepest folder level to scan (the given folder is level 0)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report near-duplicate images that live in different folders
    Dedup {
        /// Directories to scan
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Minimum similarity in percent (0-100)
        #[arg(short, long, default_value_t = 96.0)]
        threshold: f64,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "average")]
        algorithm: Algorithm,

        /// CSV report path
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Find the first image in a folder that looks like the given one
    Search {
        /// The image to look for
        image: PathBuf,

        /// Folder to search
        folder: PathBuf,

        /// Minimum similarity in percent (0-100)
        #[arg(short, long, default_value_t = 90.0)]
        threshold: f64,

        /// Hash algorithm to use
        #[arg(short, long, default_value = "perceptual")]
        algorithm: Algorithm,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Average Hash - Fast, good for exact duplicates
    Average,
    /// Difference Hash - Compares neighbouring pixels
    Difference,
    /// Perceptual Hash - Most robust to edits
    Perceptual,
}

impl From<Algorithm> for HashAlgorithmKind {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Average => HashAlgorithmKind::Average,
            Algorithm::Difference => HashAlgorithmKind::Difference,
            Algorithm::Perceptual => HashAlgorithmKind::Perceptual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

impl CommonArgs {
    /// Overlay the flags on a subcommand's defaults
    fn apply(&self, mut config: RunConfig, default_cache: Option<PathBuf>) -> RunConfig {
        config.concurrency = Concurrency::new(self.concurrency);
        config.hash_size = self.hash_size;
        config.include_hidden = self.include_hidden;
        config.follow_symlinks = self.follow_symlinks;
        config.max_depth = self.max_depth;
        config.prune_cache = self.prune;
        if !self.blacklist.is_empty() {
            config.blacklist = self.blacklist.clone();
        }
        if !self.extensions.is_empty() {
            config.extensions = Some(self.extensions.clone());
        }
        config.cache = match (&self.cache, self.no_cache) {
            (_, true) => CacheLocation::Disabled,
            (Some(path), false) => CacheLocation::File(path.clone()),
            (None, false) => default_cache
                .map(CacheLocation::File)
                .unwrap_or(CacheLocation::Disabled),
        };
        config
    }
}

/// Run the CLI and return the process exit status
pub fn run() -> u8 {
    let cli = Cli::parse();
    let term = Term::stderr();

    let result = match cli.command {
        Commands::Dedup {
            paths,
            threshold,
            algorithm,
            output,
            common,
        } => run_dedup(&term, paths, threshold, algorithm.into(), output, common),
        Commands::Search {
            image,
            folder,
            threshold,
            algorithm,
            common,
        } => run_search(&term, image, folder, threshold, algorithm.into(), common),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            term.write_line(&format!("{} {}", style("error:").red().bold(), e))
                .ok();
            e.exit_code()
        }
    }
}

/// Shared cache for dedup runs, under the user's cache directory
fn default_dedup_cache() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("similar-photo-finder").join("fingerprints.json"))
}

fn run_dedup(
    term: &Term,
    paths: Vec<PathBuf>,
    threshold: f64,
    algorithm: HashAlgorithmKind,
    output: PathBuf,
    common: CommonArgs,
) -> Result<u8> {
    let mut config = common.apply(RunConfig::dedup_defaults(), default_dedup_cache());
    config.algorithm = algorithm;

    // Validate everything before the report file is created
    let pipeline = DedupPipeline::builder()
        .paths(paths)
        .config(config)
        .threshold(threshold)
        .build()?;

    if common.format == OutputFormat::Pretty {
        print_header(term, "Duplicates across folders", pipeline.config());
    }

    let mut sink = CsvSink::create(&output)?;
    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_progress(receiver, common.format, common.verbose);

    let result = pipeline.run_with_events(&mut sink, &sender);

    drop(sender);
    event_thread.join().ok();
    let report = result?;

    match common.format {
        OutputFormat::Pretty => print_dedup_pretty(term, &report, &output, common.verbose),
        OutputFormat::Json => print_json(&report),
        OutputFormat::Minimal => {
            for r in &report.results {
                println!("{}\t{}", r.path_a.display(), r.path_b.display());
            }
        }
    }

    Ok(exit_code::SUCCESS)
}

fn run_search(
    term: &Term,
    image: PathBuf,
    folder: PathBuf,
    threshold: f64,
    algorithm: HashAlgorithmKind,
    common: CommonArgs,
) -> Result<u8> {
    let mut config = common.apply(
        RunConfig::search_defaults(),
        Some(folder.join(DEFAULT_CACHE_FILE_NAME)),
    );
    config.algorithm = algorithm;

    let pipeline = SearchPipeline::builder()
        .query(image)
        .folder(folder)
        .config(config)
        .threshold(threshold)
        .build()?;

    if common.format == OutputFormat::Pretty {
        print_header(term, "Single image search", pipeline.config());
    }

    let (sender, receiver) = EventChannel::new();
    let event_thread = spawn_progress(receiver, common.format, common.verbose);

    let result = pipeline.run_with_events(&sender);

    drop(sender);
    event_thread.join().ok();
    let report = result?;

    match common.format {
        OutputFormat::Pretty => print_search_pretty(term, &report),
        OutputFormat::Json => print_json(&report),
        OutputFormat::Minimal => {
            if let SearchOutcome::Match(m) = &report.outcome {
                println!("{}", m.match_path.display());
            }
        }
    }

    Ok(if report.outcome.is_match() {
        exit_code::SUCCESS
    } else {
        exit_code::NO_MATCH
    })
}

fn print_header(term: &Term, title: &str, config: &RunConfig) {
    term.write_line(&format!(
        "{} {}",
        style("Similar Photo Finder").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} - {}, threshold {}, {} workers",
        style(title).bold(),
        config.algorithm,
        config.threshold,
        config.concurrency.get()
    ))
    .ok();
    term.write_line("").ok();
}

/// Render events as a progress bar on stderr
fn spawn_progress(
    receiver: EventReceiver,
    format: OutputFormat,
    verbose: bool,
) -> thread::JoinHandle<()> {
    let progress = (format == OutputFormat::Pretty).then(|| {
        let pb = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    });

    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress.as_ref() else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(phase.to_string());
                }
                Event::Scan(ScanEvent::Completed { total_files }) => {
                    pb.set_message(format!("{} images found", total_files));
                }
                Event::Hash(HashEvent::Started { to_compute, .. }) => {
                    pb.set_length(to_compute as u64);
                    pb.set_position(0);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Compare(CompareEvent::MatchFound {
                    path_a,
                    path_b,
                    similarity_percent,
                }) if verbose => {
                    pb.println(format!(
                        "  {} {} ~ {}",
                        style(format_similarity(similarity_percent)).yellow(),
                        display_path(&path_a),
                        display_path(&path_b)
                    ));
                }
                Event::Cache(CacheEvent::SaveFailed { store, message }) => {
                    pb.println(format!(
                        "  {} could not save cache {}: {}",
                        style("warning:").yellow().bold(),
                        store,
                        message
                    ));
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
    })
}

fn print_dedup_pretty(term: &Term, report: &DedupReport, output: &Path, verbose: bool) {
    term.write_line(&format!("{} Scan Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} images scanned in {:.1}s",
        style(report.total_files).cyan(),
        report.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} fingerprints computed, {} from cache",
        style(report.computed).cyan(),
        style(report.cache_hits).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} comparisons, {} skipped by folder pairs already matched",
        style(report.comparisons.comparisons).cyan(),
        style(report.comparisons.skipped_by_gate).dim()
    ))
    .ok();
    if report.no_hash > 0 || !report.errors.is_empty() {
        term.write_line(&format!(
            "  {} unreadable images, {} errors",
            style(report.no_hash).yellow(),
            style(report.errors.len()).yellow()
        ))
        .ok();
    }
    term.write_line("").ok();

    if report.results.is_empty() {
        term.write_line("  No near-duplicates across folders.").ok();
    } else {
        term.write_line(&format!(
            "  {} folder pairs with near-duplicates, written to {}",
            style(report.results.len()).green().bold(),
            output.display()
        ))
        .ok();
        for r in &report.results {
            term.write_line(&format!(
                "    {} {}",
                style(format_similarity(r.similarity_percent)).yellow(),
                display_path(&r.path_a)
            ))
            .ok();
            term.write_line(&format!("         {}", display_path(&r.path_b)))
                .ok();
        }
    }

    if verbose {
        for error in &report.errors {
            term.write_line(&format!("  {} {}", style("!").red(), error))
                .ok();
        }
    }
}

fn print_search_pretty(term: &Term, report: &SearchReport) {
    match &report.outcome {
        SearchOutcome::Match(m) => {
            term.write_line(&format!(
                "{} Match found after {} candidates",
                style("✓").green().bold(),
                m.scanned
            ))
            .ok();
            term.write_line(&format!(
                "  {} (similarity {:.2}%, distance {})",
                style(display_path(&m.match_path)).bold(),
                m.similarity_percent,
                m.distance
            ))
            .ok();
        }
        SearchOutcome::NotFound { scanned } => {
            term.write_line(&format!(
                "{} No match among {} candidates",
                style("✗").red().bold(),
                scanned
            ))
            .ok();
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!(error = %e, "cannot render JSON output"),
    }
}

/// Shorten paths under the home directory to `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("photo-similar").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn dedup_defaults_match_the_folder_scan() {
        match parse(&["dedup", "/photos"]).command {
            Commands::Dedup {
                threshold,
                algorithm,
                output,
                common,
                ..
            } => {
                assert_eq!(threshold, 96.0);
                assert!(matches!(algorithm, Algorithm::Average));
                assert_eq!(output, PathBuf::from("results.csv"));
                assert_eq!(common.concurrency, 0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn search_defaults_to_a_cache_in_the_folder() {
        let Commands::Search { common, folder, .. } = parse(&["search", "q.jpg", "/lib"]).command
        else {
            panic!("expected search");
        };
        let config = common.apply(
            RunConfig::search_defaults(),
            Some(folder.join(DEFAULT_CACHE_FILE_NAME)),
        );

        assert!(matches!(
            config.cache,
            CacheLocation::File(ref p) if p == Path::new("/lib/.image_hashes.json")
        ));
        assert_eq!(config.algorithm, HashAlgorithmKind::Perceptual);
    }

    #[test]
    fn no_cache_wins_over_the_default_location() {
        let Commands::Search { common, .. } =
            parse(&["search", "q.jpg", "/lib", "--no-cache"]).command
        else {
            panic!("expected search");
        };
        let config = common.apply(RunConfig::search_defaults(), Some(PathBuf::from("x.json")));

        assert!(matches!(config.cache, CacheLocation::Disabled));
    }

    #[test]
    fn negative_concurrency_means_host_workers() {
        let Commands::Dedup { common, .. } = parse(&["dedup", "/p", "-j", "-1"]).command else {
            panic!("expected dedup");
        };
        let config = common.apply(RunConfig::dedup_defaults(), None);

        assert_eq!(config.concurrency.get(), Concurrency::host().get());
    }

    #[test]
    fn blacklist_and_extension_flags_override_defaults() {
        let Commands::Dedup { common, .. } = parse(&[
            "dedup", "/p", "--blacklist", "Trash", "--ext", "png", "--prune",
        ])
        .command
        else {
            panic!("expected dedup");
        };
        let config = common.apply(RunConfig::dedup_defaults(), None);

        assert_eq!(config.blacklist, vec!["Trash".to_string()]);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.extensions, Some(vec!["png".to_string()]));
        assert!(config.prune_cache);
    }

    #[test]
    fn traversal_flags_reach_the_run_config() {
        let Commands::Dedup { common, .. } =
            parse(&["dedup", "/p", "--max-depth", "3", "--follow-symlinks"]).command
        else {
            panic!("expected dedup");
        };
        let config = common.apply(RunConfig::dedup_defaults(), None);

        assert_eq!(config.max_depth, Some(3));
        assert!(config.follow_symlinks);
    }

    #[test]
    fn cache_and_no_cache_conflict() {
        let result =
            Cli::try_parse_from(["photo-similar", "dedup", "/p", "--cache", "c.json", "--no-cache"]);
        assert!(result.is_err());
    }
}
