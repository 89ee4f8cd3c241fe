//! Property tests for tier classification.
//!
//! Invariants tested:
//! - Classification is monotone in the duration
//! - Each tier matches its threshold window exactly
//! - A duration equal to a threshold stays in the lower tier

use proptest::prelude::*;
use unit_duration::{Thresholds, Verdict};

fn thresholds() -> impl Strategy<Value = Thresholds> {
    (0u64..200, 0u64..200, 0u64..200).prop_map(|(a, b, c)| {
        let mut t = [a, b, c];
        t.sort_unstable();
        Thresholds::new(t[0], t[1], t[2]).unwrap()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: a longer test never gets a milder verdict
    #[test]
    fn classification_is_monotone(
        t in thresholds(),
        a in 0u64..500,
        b in 0u64..500,
    ) {
        let (shorter, longer) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(Verdict::classify(shorter, &t) <= Verdict::classify(longer, &t));
    }

    /// Property: each verdict corresponds to its threshold window
    #[test]
    fn verdict_matches_window(t in thresholds(), d in 0u64..500) {
        let expected = if d > t.exception_ms() {
            Verdict::SlowFatal
        } else if d > t.error_ms() {
            Verdict::SlowError
        } else if d > t.warning_ms() {
            Verdict::SlowWarning
        } else {
            Verdict::Acceptable
        };
        prop_assert_eq!(Verdict::classify(d, &t), expected);
    }

    /// Property: thresholds are inclusive for the lower tier
    #[test]
    fn thresholds_are_inclusive(t in thresholds()) {
        prop_assert_eq!(Verdict::classify(t.warning_ms(), &t), Verdict::Acceptable);
        prop_assert!(Verdict::classify(t.error_ms(), &t) <= Verdict::SlowWarning);
        prop_assert!(!Verdict::classify(t.exception_ms(), &t).is_fatal());
        prop_assert!(Verdict::classify(t.exception_ms() + 1, &t).is_fatal());
    }

    /// Property: descending thresholds are rejected
    #[test]
    fn descending_thresholds_rejected(w in 1u64..200, gap in 1u64..50) {
        let lower = w.saturating_sub(gap);
        prop_assert!(Thresholds::new(w, lower, 500).is_err());
        prop_assert!(Thresholds::new(0, w, lower).is_err());
    }
}
