//! # Hasher Module
//!
//! Computes perceptual fingerprints for images.
//!
//! ## Supported Algorithms
//! - **aHash (Average Hash)** - Fastest, good for exact duplicates
//! - **dHash (Difference Hash)** - Compares neighbouring pixels
//! - **pHash (Perceptual Hash)** - DCT-based, handles edits well
//!
//! Every fingerprint carries its algorithm tag and bit length. A run uses
//! one algorithm and one hash size throughout, so fingerprints of different
//! shapes never meet in a comparison.
//!
//! ## NoHash
//! Files that cannot be read as images produce no fingerprint. That is an
//! expected outcome (`Ok(None)`), not an error.
//!
//! ## Example
//! ```rust,ignore
//! use similar_photo_finder::core::hasher::{HasherConfig, HashAlgorithmKind};
//!
//! let hasher = HasherConfig::new()
//!     .algorithm(HashAlgorithmKind::Perceptual)
//!     .hash_size(8)
//!     .build()?;
//!
//! let fingerprint = fingerprint_file(hasher.as_ref(), &path)?;
//! ```

mod algorithms;
pub mod decode;
pub mod fast_resize;
mod traits;

pub use algorithms::{AverageHasher, DifferenceHasher, PerceptualHasher};
pub use decode::ImageDecoder;
pub use traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind};

use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

/// Smallest and largest supported grid sizes
const MIN_HASH_SIZE: u32 = 2;
const MAX_HASH_SIZE: u32 = 64;

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Grid size; fingerprints have `hash_size * hash_size` bits
    hash_size: u32,
    /// Algorithm to use
    algorithm: HashAlgorithmKind,
}

impl HasherConfig {
    /// Create a new hasher configuration with defaults (aHash, 64 bits)
    pub fn new() -> Self {
        Self {
            hash_size: 8,
            algorithm: HashAlgorithmKind::Average,
        }
    }

    /// Set the hash size
    ///
    /// - 8: 64 bits, fast, good for most uses
    /// - 16: 256 bits, more accurate
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    /// Set the hash algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithmKind) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Result<Box<dyn HashAlgorithm>, HashError> {
        if !(MIN_HASH_SIZE..=MAX_HASH_SIZE).contains(&self.hash_size) {
            return Err(HashError::UnsupportedHashSize {
                size: self.hash_size,
            });
        }

        Ok(match self.algorithm {
            HashAlgorithmKind::Average => Box::new(AverageHasher::new(self.hash_size)),
            HashAlgorithmKind::Difference => Box::new(DifferenceHasher::new(self.hash_size)),
            HashAlgorithmKind::Perceptual => Box::new(PerceptualHasher::new(self.hash_size)),
        })
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fingerprint a decoded image, or `None` if the algorithm fails.
pub fn compute_fingerprint(hasher: &dyn HashAlgorithm, image: &DynamicImage) -> Option<Fingerprint> {
    match hasher.hash_image(image) {
        Ok(fingerprint) => Some(fingerprint),
        Err(e) => {
            debug!(error = %e, "no fingerprint for decoded image");
            None
        }
    }
}

/// Fingerprint encoded image bytes, or `None` if they are not an image.
pub fn fingerprint_bytes(hasher: &dyn HashAlgorithm, bytes: &[u8]) -> Option<Fingerprint> {
    match ImageDecoder::decode_bytes(bytes) {
        Ok(image) => compute_fingerprint(hasher, &image),
        Err(e) => {
            debug!(error = %e, "bytes are not a decodable image");
            None
        }
    }
}

/// Fingerprint a file.
///
/// Undecodable content yields `Ok(None)`; only a failure to read the file
/// at all is an error.
pub fn fingerprint_file(
    hasher: &dyn HashAlgorithm,
    path: &Path,
) -> Result<Option<Fingerprint>, HashError> {
    match hasher.hash_file(path) {
        Ok(fingerprint) => Ok(Some(fingerprint)),
        Err(e @ HashError::IoError { .. }) => Err(e),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "skipping file without fingerprint");
            Ok(None)
        }
    }
}
