//! The lifecycle contract between a test and the extensions wrapped around it.
//!
//! A test declares itself with a [`TestDescriptor`]. Each invocation turns the
//! descriptor into a [`TestContext`] carrying a fresh [`TestId`], and every
//! registered [`Extension`] sees that context before and after the test body
//! runs.
//!
//! ```rust
//! use unit_duration_core::{BoxError, Extension, TestContext, TestDescriptor};
//!
//! struct AnnounceExtension;
//!
//! impl Extension for AnnounceExtension {
//!     fn name(&self) -> &str {
//!         "announce"
//!     }
//!
//!     fn before_test_execution(&self, ctx: &TestContext) -> Result<(), BoxError> {
//!         println!("starting {}", ctx.name());
//!         Ok(())
//!     }
//! }
//!
//! let ctx = TestContext::new(TestDescriptor::new("fast_test"));
//! AnnounceExtension.before_test_execution(&ctx).unwrap();
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::BoxError;

static NEXT_TEST_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a single test invocation.
///
/// Ids are unique for the lifetime of the process, so two concurrent runs of
/// the same test never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TestId(u64);

impl TestId {
    /// Allocates the next unused id.
    pub fn next() -> Self {
        Self(NEXT_TEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a test declares about itself before it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestDescriptor {
    name: String,
    ignore_rules: bool,
    tags: Vec<String>,
}

impl TestDescriptor {
    /// Creates a descriptor for the test called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ignore_rules: false,
            tags: Vec::new(),
        }
    }

    /// Opts this test out of rule checks such as the duration guard.
    pub fn ignore_rules(mut self) -> Self {
        self.ignore_rules = true;
        self
    }

    /// Adds a free-form tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.push_tag(tag);
        self
    }

    pub(crate) fn push_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    /// The test name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for TestDescriptor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TestDescriptor {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Per-invocation view handed to extension hooks.
#[derive(Debug, Clone)]
pub struct TestContext {
    id: TestId,
    descriptor: TestDescriptor,
}

impl TestContext {
    /// Creates the context for a new invocation of `descriptor`.
    pub fn new(descriptor: TestDescriptor) -> Self {
        Self {
            id: TestId::next(),
            descriptor,
        }
    }

    /// Creates a context carrying `tags` in addition to the descriptor's own.
    pub fn with_tags<I, T>(mut descriptor: TestDescriptor, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        for tag in tags {
            descriptor.push_tag(tag);
        }
        Self::new(descriptor)
    }

    /// Identity of this invocation.
    pub fn id(&self) -> TestId {
        self.id
    }

    /// The test name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Whether the test opted out of rule checks.
    pub fn ignore_rules(&self) -> bool {
        self.descriptor.ignore_rules
    }

    /// Tags attached to the test.
    pub fn tags(&self) -> &[String] {
        &self.descriptor.tags
    }

    /// Returns true if the test carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.descriptor.tags.iter().any(|t| t == tag)
    }
}

/// A callback pair invoked around a test's execution.
///
/// Both hooks default to doing nothing. An error returned from either hook
/// fails the test.
pub trait Extension: Send + Sync {
    /// Name used in failures and logs.
    fn name(&self) -> &str;

    /// Called immediately before the test body runs.
    fn before_test_execution(&self, _ctx: &TestContext) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called immediately after the test body ran, even if it panicked.
    fn after_test_execution(&self, _ctx: &TestContext) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Extension + ?Sized> Extension for Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn before_test_execution(&self, ctx: &TestContext) -> Result<(), BoxError> {
        (**self).before_test_execution(ctx)
    }

    fn after_test_execution(&self, ctx: &TestContext) -> Result<(), BoxError> {
        (**self).after_test_execution(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = TestContext::new(TestDescriptor::new("same"));
        let b = TestContext::new(TestDescriptor::new("same"));
        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_descriptor_defaults() {
        let ctx = TestContext::new("fast_test".into());
        assert_eq!(ctx.name(), "fast_test");
        assert!(!ctx.ignore_rules());
        assert!(ctx.tags().is_empty());
    }

    #[test]
    fn test_ignore_rules_marker() {
        let ctx = TestContext::new(TestDescriptor::new("super_slow_test").ignore_rules());
        assert!(ctx.ignore_rules());
    }

    #[test]
    fn test_tags_are_deduplicated() {
        let descriptor = TestDescriptor::new("t").tag("unit-tests").tag("db");
        let ctx = TestContext::with_tags(descriptor, ["unit-tests", "fast"]);
        assert_eq!(ctx.tags(), ["unit-tests", "db", "fast"]);
        assert!(ctx.has_tag("fast"));
        assert!(!ctx.has_tag("slow"));
    }

    #[test]
    fn test_default_hooks_are_noops() {
        struct Quiet;
        impl Extension for Quiet {
            fn name(&self) -> &str {
                "quiet"
            }
        }

        let ctx = TestContext::new("t".into());
        let ext = Arc::new(Quiet);
        assert!(ext.before_test_execution(&ctx).is_ok());
        assert!(ext.after_test_execution(&ctx).is_ok());
        assert_eq!(ext.name(), "quiet");
    }
}
