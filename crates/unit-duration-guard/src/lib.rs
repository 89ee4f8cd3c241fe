//! Flags slow unit tests.
//!
//! The [`DurationGuard`] is an [`Extension`] that records a start time before
//! a test body runs and, once the body returns, classifies how long it took:
//!
//! - at or below the warning threshold: nothing happens
//! - above the warning threshold: one `WARN` record is logged
//! - above the error threshold: one `ERROR` record is logged
//! - above the exception threshold: the test fails
//!
//! Thresholds default to 10, 25 and 50 milliseconds and can be overridden
//! through `UNIT_THRESHOLD_WARNING`, `UNIT_THRESHOLD_ERROR` and
//! `UNIT_THRESHOLD_EXCEPTION`. Tests marked with
//! [`TestDescriptor::ignore_rules`](unit_duration_core::TestDescriptor::ignore_rules)
//! are never checked.
//!
//! ## Basic Example
//!
//! ```rust
//! use std::time::Duration;
//! use unit_duration_core::{ExtensionChain, TestContext, TestDescriptor};
//! use unit_duration_guard::DurationGuardConfig;
//!
//! let guard = DurationGuardConfig::builder()
//!     .warning_threshold(Duration::from_millis(10))
//!     .error_threshold(Duration::from_millis(25))
//!     .exception_threshold(Duration::from_millis(50))
//!     .build()
//!     .unwrap()
//!     .guard();
//!
//! let chain = ExtensionChain::new().with(guard);
//! let ctx = TestContext::new(TestDescriptor::new("fast_test"));
//! assert!(chain.execute(&ctx, || 1 + 1).is_ok());
//! ```
//!
//! ## Deterministic Timing
//!
//! ```rust
//! use std::time::Duration;
//! use unit_duration_core::{ExtensionChain, TestContext, TestDescriptor};
//! use unit_duration_guard::{DurationError, DurationGuardConfig, ManualClock};
//!
//! let clock = ManualClock::new();
//! let guard = DurationGuardConfig::builder()
//!     .clock(clock.clone())
//!     .build()
//!     .unwrap()
//!     .guard();
//!
//! let chain = ExtensionChain::new().with(guard);
//! let ctx = TestContext::new(TestDescriptor::new("exception_threshold_test"));
//! let failure = chain
//!     .execute(&ctx, || clock.advance(Duration::from_millis(75)))
//!     .unwrap_err();
//!
//! let err = failure.downcast_source::<DurationError>().unwrap();
//! assert_eq!(err.duration_ms(), Some(75));
//! ```

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};
use unit_duration_core::{BoxError, Extension, TestContext, TestId};

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{
    DurationGuardConfig, DurationGuardConfigBuilder, Thresholds, ERROR_THRESHOLD_ENV,
    EXCEPTION_THRESHOLD_ENV, WARNING_THRESHOLD_ENV,
};
pub use error::{ConfigError, DurationError};
pub use events::DurationEvent;
pub use verdict::Verdict;

mod clock;
mod config;
mod error;
mod events;
mod verdict;

use config::whole_millis;
use error::too_slow_message;

/// Measures each test between its before and after hooks and flags slow ones.
///
/// One guard can serve many concurrently running tests: start times are kept
/// per [`TestId`] and removed once the test is checked.
pub struct DurationGuard {
    config: Arc<DurationGuardConfig>,
    starts: DashMap<TestId, Instant>,
}

impl DurationGuard {
    /// Creates a guard from the given configuration.
    pub fn new(config: impl Into<Arc<DurationGuardConfig>>) -> Self {
        Self {
            config: config.into(),
            starts: DashMap::new(),
        }
    }

    /// Creates a guard with thresholds read from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = DurationGuardConfig::builder()
            .thresholds(Thresholds::from_env()?)
            .build()?;
        Ok(Self::new(config))
    }

    /// Creates a new builder for configuring a guard.
    pub fn builder() -> DurationGuardConfigBuilder {
        DurationGuardConfig::builder()
    }

    /// The thresholds this guard enforces.
    pub fn thresholds(&self) -> Thresholds {
        self.config.thresholds
    }

    /// Number of tests currently between their before and after hooks.
    pub fn in_flight(&self) -> usize {
        self.starts.len()
    }

    /// Classifies `elapsed` for `test`, logging and emitting events.
    ///
    /// Returns the verdict for non-fatal durations and
    /// [`DurationError::TooSlow`] past the exception threshold.
    pub fn check(&self, test: &str, elapsed: Duration) -> Result<Verdict, DurationError> {
        let thresholds = self.config.thresholds;
        let duration_ms = whole_millis(elapsed);
        let verdict = Verdict::classify(duration_ms, &thresholds);

        let threshold_ms = match verdict {
            Verdict::Acceptable | Verdict::SlowWarning => thresholds.warning_ms(),
            Verdict::SlowError => thresholds.error_ms(),
            Verdict::SlowFatal => thresholds.exception_ms(),
        };

        match verdict {
            Verdict::Acceptable | Verdict::SlowFatal => {}
            Verdict::SlowWarning => warn!(
                guard = %self.config.name,
                test,
                duration_ms,
                threshold_ms,
                "{}",
                too_slow_message(&thresholds.warning_ms(), &duration_ms)
            ),
            Verdict::SlowError => error!(
                guard = %self.config.name,
                test,
                duration_ms,
                threshold_ms,
                "{}",
                too_slow_message(&thresholds.warning_ms(), &duration_ms)
            ),
        }

        let panicked = self.config.event_listeners.emit(&DurationEvent::new(
            verdict,
            &self.config.name,
            test,
            elapsed,
            Duration::from_millis(threshold_ms),
        ));
        if panicked > 0 {
            debug!(guard = %self.config.name, test, panicked, "Event listeners panicked");
        }

        if verdict.is_fatal() {
            return Err(DurationError::TooSlow {
                test: test.to_string(),
                duration_ms,
                warning_ms: thresholds.warning_ms(),
                exception_ms: thresholds.exception_ms(),
            });
        }

        Ok(verdict)
    }
}

impl Extension for DurationGuard {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn before_test_execution(&self, ctx: &TestContext) -> Result<(), BoxError> {
        self.starts.insert(ctx.id(), self.config.clock.now());
        Ok(())
    }

    fn after_test_execution(&self, ctx: &TestContext) -> Result<(), BoxError> {
        let start = self.starts.remove(&ctx.id()).map(|(_, start)| start);

        if ctx.ignore_rules() {
            return Ok(());
        }

        let start = start.ok_or_else(|| DurationError::MissingStart {
            test: ctx.name().to_string(),
        })?;
        let elapsed = self.config.clock.now().saturating_duration_since(start);

        self.check(ctx.name(), elapsed)?;
        Ok(())
    }
}

impl From<DurationGuardConfig> for DurationGuard {
    fn from(config: DurationGuardConfig) -> Self {
        Self::new(config)
    }
}

impl Default for DurationGuard {
    fn default() -> Self {
        Self::new(DurationGuardConfig::default())
    }
}

impl fmt::Debug for DurationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurationGuard")
            .field("config", &self.config)
            .field("in_flight", &self.starts.len())
            .finish()
    }
}
