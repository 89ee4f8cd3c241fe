//! Running a test body between extension hooks.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::error::TestFailure;
use crate::extension::{Extension, TestContext};

/// An ordered set of extensions applied to every test it runs.
///
/// Before-hooks run in registration order, after-hooks in reverse order. If a
/// before-hook fails, the body is skipped and only the extensions whose
/// before-hooks already ran get their after-hook. A panicking body still
/// triggers every after-hook, then the panic is resumed.
#[derive(Clone, Default)]
pub struct ExtensionChain {
    extensions: Vec<Arc<dyn Extension>>,
}

impl ExtensionChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extension to the chain.
    pub fn with<E>(mut self, extension: E) -> Self
    where
        E: Extension + 'static,
    {
        self.push(extension);
        self
    }

    /// Appends an extension to the chain.
    pub fn push<E>(&mut self, extension: E)
    where
        E: Extension + 'static,
    {
        self.extensions.push(Arc::new(extension));
    }

    /// Names of the registered extensions, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|ext| ext.name()).collect()
    }

    /// Returns the number of extensions.
    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Returns true if there are no extensions.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Runs `body` for the invocation described by `ctx`.
    pub fn execute<T, F>(&self, ctx: &TestContext, body: F) -> Result<T, TestFailure>
    where
        F: FnOnce() -> T,
    {
        let started = self.before_all(ctx)?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(body));
        let after = self.after_all(ctx, started);

        match outcome {
            Ok(value) => after.map(|()| value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Runs the future `body` for the invocation described by `ctx`.
    ///
    /// The measured window covers every poll of the future, including time it
    /// spends waiting on timers or I/O.
    pub async fn execute_async<F>(
        &self,
        ctx: &TestContext,
        body: F,
    ) -> Result<F::Output, TestFailure>
    where
        F: Future,
    {
        let started = self.before_all(ctx)?;

        let outcome = AssertUnwindSafe(body).catch_unwind().await;
        let after = self.after_all(ctx, started);

        match outcome {
            Ok(value) => after.map(|()| value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Runs every before-hook, returning how many succeeded.
    fn before_all(&self, ctx: &TestContext) -> Result<usize, TestFailure> {
        for (index, ext) in self.extensions.iter().enumerate() {
            if let Err(source) = ext.before_test_execution(ctx) {
                let failure = TestFailure::new(ext.name(), ctx.name(), source);
                // Unwind the extensions that were already set up.
                if let Err(shadowed) = self.after_all(ctx, index) {
                    #[cfg(feature = "tracing")]
                    debug!(
                        extension = shadowed.extension_name(),
                        test = ctx.name(),
                        error = %shadowed,
                        "Dropping after-hook failure shadowed by a before-hook failure"
                    );
                    #[cfg(not(feature = "tracing"))]
                    drop(shadowed);
                }
                return Err(failure);
            }
        }
        Ok(self.extensions.len())
    }

    /// Runs the after-hooks of the first `started` extensions in reverse order.
    ///
    /// The first failure wins; later ones are dropped.
    fn after_all(&self, ctx: &TestContext, started: usize) -> Result<(), TestFailure> {
        let mut first: Option<TestFailure> = None;

        for ext in self.extensions[..started].iter().rev() {
            if let Err(source) = ext.after_test_execution(ctx) {
                match first {
                    None => first = Some(TestFailure::new(ext.name(), ctx.name(), source)),
                    Some(_) => {
                        #[cfg(feature = "tracing")]
                        debug!(
                            extension = ext.name(),
                            test = ctx.name(),
                            error = %source,
                            "Dropping after-hook failure shadowed by an earlier one"
                        );
                        #[cfg(not(feature = "tracing"))]
                        drop(source);
                    }
                }
            }
        }

        first.map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for ExtensionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionChain")
            .field("extensions", &self.names())
            .finish()
    }
}
