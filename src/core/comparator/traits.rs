//! Trait definitions for match acceptance.

use super::{max_distance_for, similarity_percent};
use crate::core::config::Threshold;

/// Decides whether a Hamming distance counts as a match
pub trait ComparisonStrategy: Send + Sync {
    /// Similarity (percent) if `distance` over `bit_len` bits is a match
    fn accept(&self, distance: u32, bit_len: u32) -> Option<f64>;

    /// Human-readable description of the strategy
    fn description(&self) -> String;
}

/// Percentage threshold strategy
///
/// A distance matches when it is within `floor(L * (1 - t/100))` and the
/// exact similarity recomputed from it is still at least `t`.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdStrategy {
    threshold: Threshold,
}

impl ThresholdStrategy {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Distance bound for a given fingerprint length
    pub fn max_distance(&self, bit_len: u32) -> u32 {
        max_distance_for(self.threshold.percent(), bit_len)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn accept(&self, distance: u32, bit_len: u32) -> Option<f64> {
        if distance > self.max_distance(bit_len) {
            return None;
        }
        let similarity = similarity_percent(distance, bit_len);
        (similarity >= self.threshold.percent()).then_some(similarity)
    }

    fn description(&self) -> String {
        format!(
            "Threshold strategy: pairs at least {} similar are matches",
            self.threshold
        )
    }
}
