//! # Core Module
//!
//! The matching engine.
//!
//! ## Modules
//! - `config` - Run-scoped settings
//! - `scanner` - Enumerates image files
//! - `hasher` - Computes perceptual fingerprints
//! - `cache` - Persists fingerprints between runs
//! - `comparator` - Dedup and search strategies
//! - `pipeline` - Worker pool and full runs
//! - `sink` - Where reported pairs go

pub mod cache;
pub mod comparator;
pub mod config;
pub mod hasher;
pub mod pipeline;
pub mod scanner;
pub mod sink;

pub use cache::{FileIdentity, HashCache};
pub use comparator::{ComparisonResult, SearchOutcome};
pub use config::{RunConfig, Threshold};
pub use hasher::{Fingerprint, HashAlgorithmKind};
