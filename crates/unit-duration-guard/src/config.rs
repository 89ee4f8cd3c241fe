//! Configuration for the duration guard.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use unit_duration_core::EventListeners;

use crate::clock::{Clock, MonotonicClock};
use crate::error::ConfigError;
use crate::events::DurationEvent;

/// Environment variable overriding the warning threshold.
pub const WARNING_THRESHOLD_ENV: &str = "UNIT_THRESHOLD_WARNING";
/// Environment variable overriding the error threshold.
pub const ERROR_THRESHOLD_ENV: &str = "UNIT_THRESHOLD_ERROR";
/// Environment variable overriding the exception threshold.
pub const EXCEPTION_THRESHOLD_ENV: &str = "UNIT_THRESHOLD_EXCEPTION";

/// The three ascending duration limits, in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Thresholds {
    warning_ms: u64,
    error_ms: u64,
    exception_ms: u64,
}

impl Thresholds {
    /// Default warning threshold.
    pub const DEFAULT_WARNING_MS: u64 = 10;
    /// Default error threshold.
    pub const DEFAULT_ERROR_MS: u64 = 25;
    /// Default exception threshold.
    pub const DEFAULT_EXCEPTION_MS: u64 = 50;

    /// Creates thresholds, rejecting values that do not ascend.
    pub fn new(warning_ms: u64, error_ms: u64, exception_ms: u64) -> Result<Self, ConfigError> {
        let thresholds = Self {
            warning_ms,
            error_ms,
            exception_ms,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Reads thresholds from the process environment.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads thresholds through `lookup`, which maps a setting name to its
    /// raw value.
    ///
    /// ```rust
    /// use unit_duration_guard::{Thresholds, WARNING_THRESHOLD_ENV};
    ///
    /// let thresholds = Thresholds::from_lookup(|key| {
    ///     (key == WARNING_THRESHOLD_ENV).then(|| "20".to_string())
    /// })
    /// .unwrap();
    /// assert_eq!(thresholds.warning_ms(), 20);
    /// assert_eq!(thresholds.error_ms(), 25);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: u64| match lookup(key) {
            Some(raw) => parse_millis(key, &raw),
            None => Ok(default),
        };

        Self::new(
            read(WARNING_THRESHOLD_ENV, Self::DEFAULT_WARNING_MS)?,
            read(ERROR_THRESHOLD_ENV, Self::DEFAULT_ERROR_MS)?,
            read(EXCEPTION_THRESHOLD_ENV, Self::DEFAULT_EXCEPTION_MS)?,
        )
    }

    /// Like [`Thresholds::from_lookup`], but never fails.
    ///
    /// An unparsable setting falls back to its own default and keeps the
    /// valid sibling overrides. If the result does not ascend, all three
    /// thresholds fall back to the defaults. Every problem found is returned
    /// alongside the thresholds.
    pub fn from_lookup_or_defaults<F>(lookup: F) -> (Self, Vec<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();
        let mut read = |key: &str, default: u64| match lookup(key) {
            Some(raw) => parse_millis(key, &raw).unwrap_or_else(|err| {
                errors.push(err);
                default
            }),
            None => default,
        };

        let warning = read(WARNING_THRESHOLD_ENV, Self::DEFAULT_WARNING_MS);
        let error = read(ERROR_THRESHOLD_ENV, Self::DEFAULT_ERROR_MS);
        let exception = read(EXCEPTION_THRESHOLD_ENV, Self::DEFAULT_EXCEPTION_MS);

        match Self::new(warning, error, exception) {
            Ok(thresholds) => (thresholds, errors),
            Err(err) => {
                errors.push(err);
                (Self::default(), errors)
            }
        }
    }

    /// Warning threshold in milliseconds.
    pub fn warning_ms(&self) -> u64 {
        self.warning_ms
    }

    /// Error threshold in milliseconds.
    pub fn error_ms(&self) -> u64 {
        self.error_ms
    }

    /// Exception threshold in milliseconds.
    pub fn exception_ms(&self) -> u64 {
        self.exception_ms
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.warning_ms <= self.error_ms && self.error_ms <= self.exception_ms {
            Ok(())
        } else {
            Err(ConfigError::NotAscending {
                warning: self.warning_ms,
                error: self.error_ms,
                exception: self.exception_ms,
            })
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning_ms: Self::DEFAULT_WARNING_MS,
            error_ms: Self::DEFAULT_ERROR_MS,
            exception_ms: Self::DEFAULT_EXCEPTION_MS,
        }
    }
}

/// Parses whole milliseconds, tolerating whitespace and an `ms` suffix.
fn parse_millis(key: &str, raw: &str) -> Result<u64, ConfigError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix("ms").unwrap_or(trimmed).trim_end();
    digits.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Converts a duration to whole milliseconds, truncating.
pub(crate) fn whole_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration for the duration guard.
pub struct DurationGuardConfig {
    pub(crate) thresholds: Thresholds,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) event_listeners: EventListeners<DurationEvent>,
    pub(crate) name: String,
}

impl DurationGuardConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DurationGuardConfigBuilder {
        DurationGuardConfigBuilder::new()
    }

    /// Creates a guard from this configuration.
    pub fn guard(self) -> crate::DurationGuard {
        crate::DurationGuard::new(self)
    }

    /// The configured thresholds.
    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// The guard instance name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for DurationGuardConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            clock: Arc::new(MonotonicClock),
            event_listeners: EventListeners::new(),
            name: String::from("duration-guard"),
        }
    }
}

impl From<Thresholds> for DurationGuardConfig {
    fn from(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }
}

impl fmt::Debug for DurationGuardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurationGuardConfig")
            .field("thresholds", &self.thresholds)
            .field("clock", &self.clock)
            .field("event_listeners", &self.event_listeners)
            .field("name", &self.name)
            .finish()
    }
}

/// Builder for configuring and constructing a duration guard.
pub struct DurationGuardConfigBuilder {
    warning: Duration,
    error: Duration,
    exception: Duration,
    clock: Arc<dyn Clock>,
    event_listeners: EventListeners<DurationEvent>,
    name: String,
}

impl DurationGuardConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            warning: Duration::from_millis(Thresholds::DEFAULT_WARNING_MS),
            error: Duration::from_millis(Thresholds::DEFAULT_ERROR_MS),
            exception: Duration::from_millis(Thresholds::DEFAULT_EXCEPTION_MS),
            clock: Arc::new(MonotonicClock),
            event_listeners: EventListeners::new(),
            name: String::from("duration-guard"),
        }
    }

    /// Sets the duration above which a warning is logged.
    ///
    /// Default: 10 milliseconds
    pub fn warning_threshold(mut self, threshold: Duration) -> Self {
        self.warning = threshold;
        self
    }

    /// Sets the duration above which an error is logged.
    ///
    /// Default: 25 milliseconds
    pub fn error_threshold(mut self, threshold: Duration) -> Self {
        self.error = threshold;
        self
    }

    /// Sets the duration above which the test fails.
    ///
    /// Default: 50 milliseconds
    pub fn exception_threshold(mut self, threshold: Duration) -> Self {
        self.exception = threshold;
        self
    }

    /// Sets all three thresholds at once.
    pub fn thresholds(self, thresholds: Thresholds) -> Self {
        self.warning_threshold(Duration::from_millis(thresholds.warning_ms))
            .error_threshold(Duration::from_millis(thresholds.error_ms))
            .exception_threshold(Duration::from_millis(thresholds.exception_ms))
    }

    /// Sets the time source used to measure tests.
    ///
    /// Default: [`MonotonicClock`]
    pub fn clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets the name of this guard instance for observability.
    ///
    /// Default: `"duration-guard"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked when a test stays within the warning threshold.
    pub fn on_acceptable<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event: &DurationEvent| {
            if let DurationEvent::Acceptable { duration, .. } = event {
                f(*duration);
            }
        });
        self
    }

    /// Registers a callback invoked when a test exceeds the warning threshold.
    pub fn on_warning<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event: &DurationEvent| {
            if let DurationEvent::SlowWarning { duration, .. } = event {
                f(*duration);
            }
        });
        self
    }

    /// Registers a callback invoked when a test exceeds the error threshold.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event: &DurationEvent| {
            if let DurationEvent::SlowError { duration, .. } = event {
                f(*duration);
            }
        });
        self
    }

    /// Registers a callback invoked when a test fails for exceeding the
    /// exception threshold.
    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(move |event: &DurationEvent| {
            if let DurationEvent::SlowFatal { duration, .. } = event {
                f(*duration);
            }
        });
        self
    }

    /// Registers a callback invoked for every event.
    pub fn on_event<F>(mut self, f: F) -> Self
    where
        F: Fn(&DurationEvent) + Send + Sync + 'static,
    {
        self.event_listeners.add(f);
        self
    }

    /// Builds the guard configuration.
    ///
    /// Fails if the thresholds do not ascend.
    pub fn build(self) -> Result<DurationGuardConfig, ConfigError> {
        let thresholds = Thresholds::new(
            whole_millis(self.warning),
            whole_millis(self.error),
            whole_millis(self.exception),
        )?;

        Ok(DurationGuardConfig {
            thresholds,
            clock: self.clock,
            event_listeners: self.event_listeners,
            name: self.name,
        })
    }
}

impl Default for DurationGuardConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
