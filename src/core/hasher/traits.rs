//! Fingerprint value type and hash algorithm trait.

use super::decode::ImageDecoder;
use crate::core::comparator::similarity_percent;
use crate::error::{CompareError, HashError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Available hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithmKind {
    /// Average Hash (aHash) - Fast, good for exact duplicates
    Average,
    /// Difference Hash (dHash) - Good balance of speed and accuracy
    Difference,
    /// Perceptual Hash (pHash) - DCT-based, handles edits well
    Perceptual,
}

impl HashAlgorithmKind {
    /// Stable tag written to the cache
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Average => "average",
            HashAlgorithmKind::Difference => "difference",
            HashAlgorithmKind::Perceptual => "perceptual",
        }
    }

    /// Get a human-readable description of the algorithm
    pub fn description(&self) -> &'static str {
        match self {
            HashAlgorithmKind::Average => {
                "Average Hash (aHash) - Fast comparison based on average brightness"
            }
            HashAlgorithmKind::Difference => {
                "Difference Hash (dHash) - Compares brightness gradients between pixels"
            }
            HashAlgorithmKind::Perceptual => {
                "Perceptual Hash (pHash) - DCT-based, robust to edits and transformations"
            }
        }
    }
}

impl FromStr for HashAlgorithmKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(HashAlgorithmKind::Average),
            "difference" => Ok(HashAlgorithmKind::Difference),
            "perceptual" => Ok(HashAlgorithmKind::Perceptual),
            other => Err(format!("unknown hash algorithm tag '{}'", other)),
        }
    }
}

impl std::fmt::Display for HashAlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashAlgorithmKind::Average => write!(f, "aHash"),
            HashAlgorithmKind::Difference => write!(f, "dHash"),
            HashAlgorithmKind::Perceptual => write!(f, "pHash"),
        }
    }
}

/// Trait for hash algorithm implementations
pub trait HashAlgorithm: Send + Sync {
    /// Compute a fingerprint from an already-decoded image
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError>;

    /// Decode a file and compute its fingerprint.
    ///
    /// JPEGs go through zune-jpeg, everything else through the image crate.
    fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let image = ImageDecoder::decode(path)?;
        self.hash_image(&image)
    }

    /// Get the algorithm kind
    fn kind(&self) -> HashAlgorithmKind;

    /// Number of bits in every fingerprint this hasher produces
    fn bit_len(&self) -> u32;
}

/// A perceptual fingerprint: a fixed-length bit vector tagged with the
/// algorithm that produced it.
///
/// Bits are packed most-significant-first; unused bits of the last byte
/// are zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FingerprintRecord", into = "FingerprintRecord")]
pub struct Fingerprint {
    bytes: Vec<u8>,
    bit_len: u32,
    algorithm: HashAlgorithmKind,
}

impl Fingerprint {
    /// Create a fingerprint of `bit_len` bits from packed bytes.
    pub fn new(
        bytes: Vec<u8>,
        bit_len: u32,
        algorithm: HashAlgorithmKind,
    ) -> Result<Self, HashError> {
        let expected = bit_len.div_ceil(8) as usize;
        if bit_len == 0 || bytes.len() != expected {
            return Err(HashError::ComputationFailed(format!(
                "{} bytes cannot hold a {}-bit fingerprint",
                bytes.len(),
                bit_len
            )));
        }
        Ok(Self {
            bytes,
            bit_len,
            algorithm,
        })
    }

    /// Create a fingerprint whose bit length is the full byte length
    pub fn from_bytes(bytes: &[u8], algorithm: HashAlgorithmKind) -> Result<Self, HashError> {
        Self::new(bytes.to_vec(), (bytes.len() * 8) as u32, algorithm)
    }

    /// Get the algorithm that produced this fingerprint
    pub fn algorithm(&self) -> HashAlgorithmKind {
        self.algorithm
    }

    /// Number of meaningful bits
    pub fn bit_len(&self) -> u32 {
        self.bit_len
    }

    /// Get the raw packed bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Get the fingerprint as a hexadecimal string
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Same algorithm and same length
    pub fn is_comparable_with(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.bit_len == other.bit_len
    }

    /// Hamming distance: the number of differing bit positions.
    pub fn distance(&self, other: &Self) -> Result<u32, CompareError> {
        if !self.is_comparable_with(other) {
            return Err(CompareError::IncompatibleFingerprints {
                left_algorithm: self.algorithm.to_string(),
                left_bits: self.bit_len,
                right_algorithm: other.algorithm.to_string(),
                right_bits: other.bit_len,
            });
        }

        Ok(self
            .bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Similarity as a percentage (0-100)
    pub fn similarity(&self, other: &Self) -> Result<f64, CompareError> {
        let distance = self.distance(other)?;
        Ok(similarity_percent(distance, self.bit_len))
    }
}

/// On-disk shape of a fingerprint. Kept independent of any hashing
/// library so caches stay readable across versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FingerprintRecord {
    algorithm: HashAlgorithmKind,
    bit_len: u32,
    bits: String,
}

impl From<Fingerprint> for FingerprintRecord {
    fn from(fingerprint: Fingerprint) -> Self {
        Self {
            algorithm: fingerprint.algorithm,
            bit_len: fingerprint.bit_len,
            bits: fingerprint.to_hex(),
        }
    }
}

impl TryFrom<FingerprintRecord> for Fingerprint {
    type Error = String;

    fn try_from(record: FingerprintRecord) -> Result<Self, Self::Error> {
        let bytes = decode_hex(&record.bits)?;
        Fingerprint::new(bytes, record.bit_len, record.algorithm).map_err(|e| e.to_string())
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 {
        return Err(format!("odd-length hex string '{}'", hex));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex digits in '{}'", hex))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_hash(bytes: &[u8]) -> Fingerprint {
        Fingerprint::from_bytes(bytes, HashAlgorithmKind::Average).unwrap()
    }

    #[test]
    fn distance_to_self_is_zero() {
        let hash = create_test_hash(&[0xFF, 0x00, 0xAA, 0x55]);
        assert_eq!(hash.distance(&hash).unwrap(), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let hash_a = create_test_hash(&[0xFF, 0x00]);
        let hash_b = create_test_hash(&[0x0F, 0xFF]);

        assert_eq!(
            hash_a.distance(&hash_b).unwrap(),
            hash_b.distance(&hash_a).unwrap()
        );
    }

    #[test]
    fn distance_counts_differing_bits() {
        let hash_a = create_test_hash(&[0b11111111]);
        let hash_b = create_test_hash(&[0b00000000]);

        assert_eq!(hash_a.distance(&hash_b).unwrap(), 8);
    }

    #[test]
    fn different_algorithms_are_not_compared() {
        let average = create_test_hash(&[0xFF]);
        let perceptual = Fingerprint::from_bytes(&[0xFF], HashAlgorithmKind::Perceptual).unwrap();

        assert!(matches!(
            average.distance(&perceptual),
            Err(CompareError::IncompatibleFingerprints { .. })
        ));
    }

    #[test]
    fn different_lengths_are_not_compared() {
        let short = create_test_hash(&[0xFF]);
        let long = create_test_hash(&[0xFF, 0xFF]);

        assert!(short.distance(&long).is_err());
    }

    #[test]
    fn similarity_is_100_for_identical() {
        let hash = create_test_hash(&[0xFF, 0x00]);
        assert_eq!(hash.similarity(&hash).unwrap(), 100.0);
    }

    #[test]
    fn similarity_is_0_for_opposite() {
        let hash_a = create_test_hash(&[0xFF]);
        let hash_b = create_test_hash(&[0x00]);

        assert_eq!(hash_a.similarity(&hash_b).unwrap(), 0.0);
    }

    #[test]
    fn new_rejects_wrong_byte_count() {
        assert!(Fingerprint::new(vec![0x00], 64, HashAlgorithmKind::Average).is_err());
        assert!(Fingerprint::new(vec![], 0, HashAlgorithmKind::Average).is_err());
        assert!(Fingerprint::new(vec![0x00; 4], 25, HashAlgorithmKind::Average).is_ok());
    }

    #[test]
    fn to_hex_produces_correct_string() {
        let hash = create_test_hash(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(hash.to_hex(), "deadbeef");
    }

    #[test]
    fn serializes_bits_and_tag_explicitly() {
        let hash = create_test_hash(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let json = serde_json::to_value(&hash).unwrap();

        assert_eq!(json["algorithm"], "average");
        assert_eq!(json["bit_len"], 32);
        assert_eq!(json["bits"], "deadbeef");

        let restored: Fingerprint = serde_json::from_value(json).unwrap();
        assert_eq!(restored, hash);
    }

    #[test]
    fn deserialize_rejects_malformed_bits() {
        let json = r#"{"algorithm":"average","bit_len":64,"bits":"zz"}"#;
        assert!(serde_json::from_str::<Fingerprint>(json).is_err());

        let truncated = r#"{"algorithm":"average","bit_len":64,"bits":"ffff"}"#;
        assert!(serde_json::from_str::<Fingerprint>(truncated).is_err());
    }

    #[test]
    fn algorithm_kind_display() {
        assert_eq!(HashAlgorithmKind::Average.to_string(), "aHash");
        assert_eq!(HashAlgorithmKind::Difference.to_string(), "dHash");
        assert_eq!(HashAlgorithmKind::Perceptual.to_string(), "pHash");
    }

    #[test]
    fn algorithm_tag_round_trips_through_str() {
        for kind in [
            HashAlgorithmKind::Average,
            HashAlgorithmKind::Difference,
            HashAlgorithmKind::Perceptual,
        ] {
            assert_eq!(kind.as_str().parse::<HashAlgorithmKind>().unwrap(), kind);
        }
        assert!("fusion".parse::<HashAlgorithmKind>().is_err());
    }
}
