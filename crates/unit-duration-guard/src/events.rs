//! Event types for the duration guard.

use std::time::{Duration, Instant};
use unit_duration_core::ExtensionEvent;

use crate::verdict::Verdict;

/// Events emitted by the duration guard after each checked test.
///
/// Tests that opt out of rule checks emit nothing.
#[derive(Debug, Clone)]
pub enum DurationEvent {
    /// The test finished within the warning threshold.
    Acceptable {
        /// The name of the guard instance.
        guard_name: String,
        /// The name of the test.
        test_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// How long the test took.
        duration: Duration,
    },
    /// The test exceeded the warning threshold.
    SlowWarning {
        /// The name of the guard instance.
        guard_name: String,
        /// The name of the test.
        test_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// How long the test took.
        duration: Duration,
        /// The threshold that was exceeded.
        threshold: Duration,
    },
    /// The test exceeded the error threshold.
    SlowError {
        /// The name of the guard instance.
        guard_name: String,
        /// The name of the test.
        test_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// How long the test took.
        duration: Duration,
        /// The threshold that was exceeded.
        threshold: Duration,
    },
    /// The test exceeded the exception threshold and failed.
    SlowFatal {
        /// The name of the guard instance.
        guard_name: String,
        /// The name of the test.
        test_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// How long the test took.
        duration: Duration,
        /// The threshold that was exceeded.
        threshold: Duration,
    },
}

impl DurationEvent {
    pub(crate) fn new(
        verdict: Verdict,
        guard_name: &str,
        test_name: &str,
        duration: Duration,
        threshold: Duration,
    ) -> Self {
        let guard_name = guard_name.to_string();
        let test_name = test_name.to_string();
        let timestamp = Instant::now();
        match verdict {
            Verdict::Acceptable => DurationEvent::Acceptable {
                guard_name,
                test_name,
                timestamp,
                duration,
            },
            Verdict::SlowWarning => DurationEvent::SlowWarning {
                guard_name,
                test_name,
                timestamp,
                duration,
                threshold,
            },
            Verdict::SlowError => DurationEvent::SlowError {
                guard_name,
                test_name,
                timestamp,
                duration,
                threshold,
            },
            Verdict::SlowFatal => DurationEvent::SlowFatal {
                guard_name,
                test_name,
                timestamp,
                duration,
                threshold,
            },
        }
    }

    /// The verdict this event reports.
    pub fn verdict(&self) -> Verdict {
        match self {
            DurationEvent::Acceptable { .. } => Verdict::Acceptable,
            DurationEvent::SlowWarning { .. } => Verdict::SlowWarning,
            DurationEvent::SlowError { .. } => Verdict::SlowError,
            DurationEvent::SlowFatal { .. } => Verdict::SlowFatal,
        }
    }

    /// How long the test took.
    pub fn duration(&self) -> Duration {
        match self {
            DurationEvent::Acceptable { duration, .. }
            | DurationEvent::SlowWarning { duration, .. }
            | DurationEvent::SlowError { duration, .. }
            | DurationEvent::SlowFatal { duration, .. } => *duration,
        }
    }
}

impl ExtensionEvent for DurationEvent {
    fn event_type(&self) -> &'static str {
        self.verdict().as_str()
    }

    fn timestamp(&self) -> Instant {
        match self {
            DurationEvent::Acceptable { timestamp, .. }
            | DurationEvent::SlowWarning { timestamp, .. }
            | DurationEvent::SlowError { timestamp, .. }
            | DurationEvent::SlowFatal { timestamp, .. } => *timestamp,
        }
    }

    fn extension_name(&self) -> &str {
        match self {
            DurationEvent::Acceptable { guard_name, .. }
            | DurationEvent::SlowWarning { guard_name, .. }
            | DurationEvent::SlowError { guard_name, .. }
            | DurationEvent::SlowFatal { guard_name, .. } => guard_name,
        }
    }

    fn test_name(&self) -> &str {
        match self {
            DurationEvent::Acceptable { test_name, .. }
            | DurationEvent::SlowWarning { test_name, .. }
            | DurationEvent::SlowError { test_name, .. }
            | DurationEvent::SlowFatal { test_name, .. } => test_name,
        }
    }
}
