//! Failure type surfaced to the test harness.

use thiserror::Error;

/// Boxed error returned by extension hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A test failed because one of its extensions rejected it.
///
/// Returned from a `#[test]` function, this fails the test and prints the
/// extension's message.
#[derive(Debug, Error)]
#[error("{extension}: {source}")]
pub struct TestFailure {
    extension: String,
    test: String,
    #[source]
    source: BoxError,
}

impl TestFailure {
    /// Creates a failure raised by `extension` while running `test`.
    pub fn new(extension: impl Into<String>, test: impl Into<String>, source: BoxError) -> Self {
        Self {
            extension: extension.into(),
            test: test.into(),
            source,
        }
    }

    /// Name of the extension that failed the test.
    pub fn extension_name(&self) -> &str {
        &self.extension
    }

    /// Name of the failed test.
    pub fn test_name(&self) -> &str {
        &self.test
    }

    /// Returns the extension's error if it is of type `E`.
    pub fn downcast_source<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.source.downcast_ref::<E>()
    }

    /// Consumes the failure, returning the extension's error.
    pub fn into_source(self) -> BoxError {
        self.source
    }
}
