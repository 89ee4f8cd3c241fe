//! Classification of a measured duration into tiers.

use std::fmt;

use crate::config::Thresholds;

/// How a test's duration compares to the configured thresholds.
///
/// Tiers are ordered from harmless to fatal. Every comparison is strict, so a
/// duration equal to a threshold stays in the lower tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Verdict {
    /// At or below the warning threshold.
    Acceptable,
    /// Above the warning threshold, at or below the error threshold.
    SlowWarning,
    /// Above the error threshold, at or below the exception threshold.
    SlowError,
    /// Above the exception threshold; the test fails.
    SlowFatal,
}

impl Verdict {
    /// Classifies `duration_ms` against `thresholds`.
    pub fn classify(duration_ms: u64, thresholds: &Thresholds) -> Self {
        if duration_ms > thresholds.exception_ms() {
            Verdict::SlowFatal
        } else if duration_ms > thresholds.error_ms() {
            Verdict::SlowError
        } else if duration_ms > thresholds.warning_ms() {
            Verdict::SlowWarning
        } else {
            Verdict::Acceptable
        }
    }

    /// Returns true if this verdict fails the test.
    pub fn is_fatal(self) -> bool {
        self == Verdict::SlowFatal
    }

    /// Returns the snake_case name used in events.
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Acceptable => "acceptable",
            Verdict::SlowWarning => "slow_warning",
            Verdict::SlowError => "slow_error",
            Verdict::SlowFatal => "slow_fatal",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers() {
        let t = Thresholds::default();
        assert_eq!(Verdict::classify(0, &t), Verdict::Acceptable);
        assert_eq!(Verdict::classify(15, &t), Verdict::SlowWarning);
        assert_eq!(Verdict::classify(35, &t), Verdict::SlowError);
        assert_eq!(Verdict::classify(75, &t), Verdict::SlowFatal);
    }

    #[test]
    fn test_boundaries_stay_in_lower_tier() {
        let t = Thresholds::default();
        assert_eq!(Verdict::classify(10, &t), Verdict::Acceptable);
        assert_eq!(Verdict::classify(11, &t), Verdict::SlowWarning);
        assert_eq!(Verdict::classify(25, &t), Verdict::SlowWarning);
        assert_eq!(Verdict::classify(26, &t), Verdict::SlowError);
        assert_eq!(Verdict::classify(50, &t), Verdict::SlowError);
        assert_eq!(Verdict::classify(51, &t), Verdict::SlowFatal);
    }

    #[test]
    fn test_raised_warning_threshold_reclassifies() {
        let t = Thresholds::new(20, 25, 50).unwrap();
        assert_eq!(Verdict::classify(15, &t), Verdict::Acceptable);
    }

    #[test]
    fn test_equal_thresholds_skip_tiers() {
        let t = Thresholds::new(10, 10, 10).unwrap();
        assert_eq!(Verdict::classify(10, &t), Verdict::Acceptable);
        assert_eq!(Verdict::classify(11, &t), Verdict::SlowFatal);
    }

    #[test]
    fn test_ordering_and_names() {
        assert!(Verdict::Acceptable < Verdict::SlowWarning);
        assert!(Verdict::SlowError < Verdict::SlowFatal);
        assert!(Verdict::SlowFatal.is_fatal());
        assert!(!Verdict::SlowError.is_fatal());
        assert_eq!(Verdict::SlowWarning.to_string(), "slow_warning");
    }
}
