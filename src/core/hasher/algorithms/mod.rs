//! Fingerprinting algorithms. Each one packs `hash_size * hash_size` bits.

mod average;
mod difference;
mod perceptual;

pub use average::AverageHasher;
pub use difference::DifferenceHasher;
pub use perceptual::PerceptualHasher;
