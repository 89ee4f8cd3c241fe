//! Unit tests that know how long they may take.
//!
//! `unit-duration` wraps each test body in a set of extensions, the
//! [`DurationGuard`] always among them. A test that runs past the configured
//! thresholds is logged at `WARN`, then at `ERROR`, and finally failed.
//!
//! | duration                  | effect               |
//! |---------------------------|----------------------|
//! | `<= 10ms`                 | nothing              |
//! | `> 10ms`, `<= 25ms`       | one `WARN` record    |
//! | `> 25ms`, `<= 50ms`       | one `ERROR` record   |
//! | `> 50ms`                  | the test fails       |
//!
//! The limits come from `UNIT_THRESHOLD_WARNING`, `UNIT_THRESHOLD_ERROR` and
//! `UNIT_THRESHOLD_EXCEPTION` (whole milliseconds), read once per process.
//!
//! # Declaring tests
//!
//! ```rust
//! use unit_duration::unit_test;
//!
//! unit_test! {
//!     fn fast_test() {
//!         assert_eq!(2 + 2, 4);
//!     }
//!
//!     #[ignore_rules]
//!     fn super_slow_test() {
//!         std::thread::sleep(std::time::Duration::from_millis(150));
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! # Running bodies directly
//!
//! ```rust
//! use unit_duration::UnitTest;
//!
//! # fn main() -> Result<(), unit_duration::TestFailure> {
//! let sum = UnitTest::global().run("adds_numbers", || 2 + 2)?;
//! assert_eq!(sum, 4);
//! # Ok(())
//! # }
//! ```
//!
//! # Composing extensions
//!
//! ```rust
//! use std::time::Duration;
//! use unit_duration::{BoxError, DurationGuardConfig, Extension, TestContext, UnitTest};
//!
//! struct Fixtures;
//!
//! impl Extension for Fixtures {
//!     fn name(&self) -> &str {
//!         "fixtures"
//!     }
//!
//!     fn before_test_execution(&self, _ctx: &TestContext) -> Result<(), BoxError> {
//!         Ok(())
//!     }
//! }
//!
//! let unit = UnitTest::builder()
//!     .guard(
//!         DurationGuardConfig::builder()
//!             .warning_threshold(Duration::from_millis(20))
//!             .build()
//!             .unwrap()
//!             .guard(),
//!     )
//!     .extend_with(Fixtures)
//!     .build();
//!
//! assert_eq!(unit.extensions(), vec!["fixtures", "duration-guard"]);
//! ```

use std::future::Future;
use std::sync::{Arc, LazyLock};

use tracing::error;

pub use unit_duration_core::{
    BoxError, Extension, ExtensionChain, ExtensionEvent, TestContext, TestDescriptor,
    TestFailure, TestId,
};
pub use unit_duration_guard::{
    Clock, ConfigError, DurationError, DurationEvent, DurationGuard, DurationGuardConfig,
    DurationGuardConfigBuilder, ManualClock, MonotonicClock, Thresholds, Verdict,
    ERROR_THRESHOLD_ENV, EXCEPTION_THRESHOLD_ENV, WARNING_THRESHOLD_ENV,
};

mod macros;

static GLOBAL: LazyLock<UnitTest> = LazyLock::new(UnitTest::from_env);

/// A tagged set of extensions every unit test runs inside.
///
/// The duration guard is registered last, so it is the innermost extension:
/// its measurement covers the test body only, not the setup of the other
/// extensions.
#[derive(Debug)]
pub struct UnitTest {
    tag: String,
    guard: Arc<DurationGuard>,
    chain: ExtensionChain,
}

impl UnitTest {
    /// Tag attached to every test run through a [`UnitTest`].
    pub const TAG: &'static str = "unit-tests";

    /// Creates a new builder.
    pub fn builder() -> UnitTestBuilder {
        UnitTestBuilder::new()
    }

    /// The process-wide instance, built by [`UnitTest::from_env`] on first use.
    pub fn global() -> &'static UnitTest {
        &GLOBAL
    }

    /// Creates an instance whose thresholds come from the environment.
    ///
    /// See [`UnitTest::from_lookup`] for how invalid settings are handled.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates an instance whose thresholds are read through `lookup`.
    ///
    /// Settings are never fatal. Each invalid one is logged at `ERROR` and
    /// replaced by its default, while valid sibling overrides are kept. If
    /// the resulting thresholds do not ascend, all three fall back to the
    /// defaults.
    ///
    /// ```rust
    /// use unit_duration::{UnitTest, ERROR_THRESHOLD_ENV, WARNING_THRESHOLD_ENV};
    ///
    /// let unit = UnitTest::from_lookup(|key| match key {
    ///     WARNING_THRESHOLD_ENV => Some("20".to_string()),
    ///     ERROR_THRESHOLD_ENV => Some("abc".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(unit.guard().thresholds().warning_ms(), 20);
    /// assert_eq!(unit.guard().thresholds().error_ms(), 25);
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let (thresholds, errors) = Thresholds::from_lookup_or_defaults(lookup);
        for err in &errors {
            error!(error = %err, "Ignoring invalid duration threshold setting");
        }

        let guard = DurationGuard::new(DurationGuardConfig::from(thresholds));
        Self::builder().guard(guard).build()
    }

    /// The duration guard of this instance.
    pub fn guard(&self) -> &DurationGuard {
        &self.guard
    }

    /// The tag attached to every test.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Names of the extensions, outermost first.
    pub fn extensions(&self) -> Vec<&str> {
        self.chain.names()
    }

    /// Runs `body` as the test called `name`.
    pub fn run<T, F>(&self, name: &str, body: F) -> Result<T, TestFailure>
    where
        F: FnOnce() -> T,
    {
        self.run_with(TestDescriptor::new(name), body)
    }

    /// Runs `body` as the test called `name`, exempt from rule checks.
    pub fn run_ignoring_rules<T, F>(&self, name: &str, body: F) -> Result<T, TestFailure>
    where
        F: FnOnce() -> T,
    {
        self.run_with(TestDescriptor::new(name).ignore_rules(), body)
    }

    /// Runs `body` as the test described by `descriptor`.
    pub fn run_with<T, F>(&self, descriptor: TestDescriptor, body: F) -> Result<T, TestFailure>
    where
        F: FnOnce() -> T,
    {
        let ctx = self.context(descriptor);
        self.chain.execute(&ctx, body)
    }

    /// Runs the future `body` as the test described by `descriptor`.
    ///
    /// ```rust
    /// use unit_duration::UnitTest;
    ///
    /// # async fn example() -> Result<(), unit_duration::TestFailure> {
    /// UnitTest::global()
    ///     .run_async("fetches_quickly", async {
    ///         tokio::task::yield_now().await;
    ///     })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_async<F>(
        &self,
        descriptor: impl Into<TestDescriptor>,
        body: F,
    ) -> Result<F::Output, TestFailure>
    where
        F: Future,
    {
        let ctx = self.context(descriptor.into());
        self.chain.execute_async(&ctx, body).await
    }

    fn context(&self, descriptor: TestDescriptor) -> TestContext {
        TestContext::with_tags(descriptor, [self.tag.as_str()])
    }
}

/// Builder for a [`UnitTest`].
pub struct UnitTestBuilder {
    tag: String,
    guard: Option<DurationGuard>,
    extensions: ExtensionChain,
}

impl UnitTestBuilder {
    /// Creates a builder with the default tag and guard.
    pub fn new() -> Self {
        Self {
            tag: UnitTest::TAG.to_string(),
            guard: None,
            extensions: ExtensionChain::new(),
        }
    }

    /// Replaces the tag attached to every test.
    ///
    /// Default: `"unit-tests"`
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Uses `guard` instead of a guard with default thresholds.
    pub fn guard(mut self, guard: DurationGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Adds an extension that runs outside the duration guard.
    ///
    /// Extensions keep their registration order.
    pub fn extend_with<E>(mut self, extension: E) -> Self
    where
        E: Extension + 'static,
    {
        self.extensions.push(extension);
        self
    }

    /// Builds the [`UnitTest`].
    pub fn build(self) -> UnitTest {
        let guard = Arc::new(self.guard.unwrap_or_default());
        let chain = self.extensions.with(Arc::clone(&guard));

        UnitTest {
            tag: self.tag,
            guard,
            chain,
        }
    }
}

impl Default for UnitTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
