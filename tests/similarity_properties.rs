//! Property tests for fingerprint distance and the similarity scale.

use proptest::prelude::*;
use similar_photo_finder::core::comparator::{
    max_distance_for, similarity_percent, ComparisonStrategy, ThresholdStrategy,
};
use similar_photo_finder::core::config::Threshold;
use similar_photo_finder::core::hasher::{Fingerprint, HashAlgorithmKind};

fn fingerprint(bytes: &[u8]) -> Fingerprint {
    Fingerprint::from_bytes(bytes, HashAlgorithmKind::Average).unwrap()
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in prop::collection::vec(any::<u8>(), 8), b in prop::collection::vec(any::<u8>(), 8)) {
        let (fa, fb) = (fingerprint(&a), fingerprint(&b));
        prop_assert_eq!(fa.distance(&fb).unwrap(), fb.distance(&fa).unwrap());
    }

    #[test]
    fn distance_to_self_is_zero(a in prop::collection::vec(any::<u8>(), 1..32)) {
        let fa = fingerprint(&a);
        prop_assert_eq!(fa.distance(&fa).unwrap(), 0);
        prop_assert_eq!(fa.similarity(&fa).unwrap(), 100.0);
    }

    #[test]
    fn distance_never_exceeds_bit_len(a in prop::collection::vec(any::<u8>(), 8), b in prop::collection::vec(any::<u8>(), 8)) {
        let d = fingerprint(&a).distance(&fingerprint(&b)).unwrap();
        prop_assert!(d <= 64);
    }

    #[test]
    fn similarity_stays_in_range(d in 0u32..200, bits in 1u32..1024) {
        let s = similarity_percent(d, bits);
        prop_assert!((0.0..=100.0).contains(&s));
    }

    #[test]
    fn threshold_accepts_exactly_up_to_max_distance(t in 0u32..=100, d in 0u32..=64) {
        let threshold = Threshold::new(f64::from(t)).unwrap();
        let strategy = ThresholdStrategy::new(threshold);
        let max = max_distance_for(threshold.percent(), 64);

        prop_assert_eq!(strategy.accept(d, 64).is_some(), d <= max);
    }
}
