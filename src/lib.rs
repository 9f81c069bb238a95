//! # Similar Photo Finder
//!
//! Perceptual near-duplicate image matching.
//!
//! ## What it does
//! - **Dedup** - Walk a tree and report, once per pair of folders, images
//!   that look the same but live in different folders
//! - **Search** - Find the first image in a folder that looks like a
//!   given image
//!
//! Fingerprints are cached across runs keyed by path, size and
//! modification time, so unchanged files are hashed once.
//!
//! ## Architecture
//! - `core` - The matching engine
//! - `events` - Progress reporting over channels
//! - `error` - Error types and exit statuses

pub mod core;
pub mod error;
pub mod events;

pub use error::{Result, SimilarityError};

/// Initialize tracing for the library
///
/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`). Calling
/// this more than once keeps the first subscriber.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
