//! Average Hash (aHash) implementation.
//!
//! aHash works by:
//! 1. Resizing the image to hash_size x hash_size grayscale
//! 2. Computing the mean brightness
//! 3. For each pixel: if brighter than the mean, set bit to 1, else 0
//!
//! This is the fastest hash but less robust to edits.

use super::super::fast_resize::{grayscale_thumbnail, pack_bits};
use super::super::traits::{Fingerprint, HashAlgorithm, HashAlgorithmKind};
use crate::error::HashError;
use image::DynamicImage;

/// Average Hash (aHash) implementation
pub struct AverageHasher {
    /// Size of the hash (width and height)
    hash_size: u32,
}

impl AverageHasher {
    /// Create a new aHash hasher
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }
}

impl HashAlgorithm for AverageHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let gray = grayscale_thumbnail(image, self.hash_size, self.hash_size)?;

        let count = gray.pixels().len() as u64;
        let total: u64 = gray.pixels().map(|p| p[0] as u64).sum();
        let mean = total / count.max(1);

        let bytes = pack_bits(gray.pixels().map(|p| p[0] as u64 > mean));
        Fingerprint::new(bytes, self.bit_len(), HashAlgorithmKind::Average)
    }

    fn kind(&self) -> HashAlgorithmKind {
        HashAlgorithmKind::Average
    }

    fn bit_len(&self) -> u32 {
        self.hash_size * self.hash_size
    }
}
