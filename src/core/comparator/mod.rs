//! # Comparator Module
//!
//! Turns fingerprints into matches.
//!
//! ## Strategies
//! - [`DedupComparator`] - incremental cross-folder de-duplication. Each new
//!   fingerprint is compared against everything seen so far, skipping files
//!   in the same directory and directory pairs that already produced a match.
//! - [`find_first_match`] - linear scan of a corpus for the first candidate
//!   close enough to one query image. First match in enumeration order, not
//!   the closest one.
//!
//! ## Similarity
//! For a fingerprint of `L` bits and Hamming distance `d`:
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | similarity | `100 * (L - clamp(d, 0, L)) / L` |
//! | max distance for threshold `t` | `floor(L * (1 - t / 100))` |

mod dedup;
mod search;
mod traits;

pub use dedup::{DedupComparator, DedupStats, FolderPairGate};
pub use search::{find_first_match, SearchMatch, SearchOutcome};
pub use traits::{ComparisonStrategy, ThresholdStrategy};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One reported near-duplicate pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// The file that was already processed
    pub path_a: PathBuf,
    /// The newly offered file
    pub path_b: PathBuf,
    /// Hamming distance between the fingerprints
    pub distance: u32,
    /// Similarity as a percentage (0-100)
    pub similarity_percent: f64,
}

/// Similarity percentage for a Hamming distance over `bit_len` bits.
///
/// Distances above `bit_len` clamp to 0%. A zero-length fingerprint is
/// never produced, but would report 0%.
pub fn similarity_percent(distance: u32, bit_len: u32) -> f64 {
    if bit_len == 0 {
        return 0.0;
    }
    let d = distance.min(bit_len);
    100.0 * f64::from(bit_len - d) / f64::from(bit_len)
}

/// Largest Hamming distance a threshold (percent) can admit.
pub fn max_distance_for(threshold_percent: f64, bit_len: u32) -> u32 {
    let raw = (f64::from(bit_len) * (1.0 - threshold_percent / 100.0)).floor();
    if raw <= 0.0 {
        0
    } else {
        (raw as u32).min(bit_len)
    }
}
