//! Error types for the duration guard.

use thiserror::Error;

/// Errors raised by the guard's after-hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// The test ran past the exception threshold.
    #[error("{}", too_slow_message(.warning_ms, .duration_ms))]
    TooSlow {
        /// Name of the slow test.
        test: String,
        /// Measured duration in whole milliseconds.
        duration_ms: u64,
        /// Warning threshold the test should have stayed within.
        warning_ms: u64,
        /// Exception threshold the test exceeded.
        exception_ms: u64,
    },
    /// The after-hook ran without a matching before-hook.
    #[error("no start time recorded for test `{test}`")]
    MissingStart {
        /// Name of the test.
        test: String,
    },
}

impl DurationError {
    /// Returns true if the test failed for being too slow.
    pub fn is_too_slow(&self) -> bool {
        matches!(self, DurationError::TooSlow { .. })
    }

    /// Measured duration, if this is a [`DurationError::TooSlow`].
    pub fn duration_ms(&self) -> Option<u64> {
        match self {
            DurationError::TooSlow { duration_ms, .. } => Some(*duration_ms),
            DurationError::MissingStart { .. } => None,
        }
    }
}

/// Errors from building a guard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A threshold setting is not a whole number of milliseconds.
    #[error("invalid value {value:?} for {key}: expected whole milliseconds")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Raw value found.
        value: String,
    },
    /// The thresholds are not in ascending order.
    #[error(
        "thresholds must ascend: warning {warning}ms <= error {error}ms <= exception {exception}ms"
    )]
    NotAscending {
        /// Warning threshold in milliseconds.
        warning: u64,
        /// Error threshold in milliseconds.
        error: u64,
        /// Exception threshold in milliseconds.
        exception: u64,
    },
}

/// Message shared by the slow-test log records and the failure.
pub(crate) fn too_slow_message(warning_ms: &u64, duration_ms: &u64) -> String {
    format!(
        "Test is too slow to be a unit test! Duration should be <= {warning_ms}ms, was: {duration_ms}ms."
    )
}
