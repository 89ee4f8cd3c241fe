//! Event system for test extensions.
//!
//! Extensions report what they observed about a test through events, so
//! callers can react without parsing log output. Any `Fn(&E)` closure is a
//! listener:
//!
//! ```rust
//! use std::time::Instant;
//! use unit_duration_core::{EventListeners, ExtensionEvent};
//!
//! #[derive(Debug)]
//! struct Finished(Instant);
//!
//! impl ExtensionEvent for Finished {
//!     fn event_type(&self) -> &'static str { "finished" }
//!     fn timestamp(&self) -> Instant { self.0 }
//!     fn extension_name(&self) -> &str { "example" }
//!     fn test_name(&self) -> &str { "fast_test" }
//! }
//!
//! let mut listeners = EventListeners::new();
//! listeners.add(|event: &Finished| println!("{} {}", event.test_name(), event.event_type()));
//! assert_eq!(listeners.emit(&Finished(Instant::now())), 0);
//! ```

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// An observation an extension made about one test invocation.
pub trait ExtensionEvent: Send + Sync + fmt::Debug {
    /// Short machine-readable kind, e.g. `"acceptable"` or `"slow_warning"`.
    fn event_type(&self) -> &'static str;

    fn timestamp(&self) -> Instant;

    /// Name of the extension instance that emitted the event.
    fn extension_name(&self) -> &str;

    fn test_name(&self) -> &str;
}

/// Receives events of type `E`.
pub trait EventListener<E>: Send + Sync {
    fn on_event(&self, event: &E);
}

impl<E, F> EventListener<E> for F
where
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        self(event)
    }
}

/// The listeners registered on one extension.
///
/// Cloning is cheap and the clone shares the already registered listeners.
pub struct EventListeners<E> {
    listeners: Vec<Arc<dyn EventListener<E>>>,
}

impl<E: ExtensionEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers `listener`; listeners are called in registration order.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Hands `event` to every listener and returns how many of them panicked.
    ///
    /// A panicking listener does not stop the others and never fails the
    /// test it observed.
    pub fn emit(&self, event: &E) -> usize {
        self.listeners
            .iter()
            .map(|listener| catch_unwind(AssertUnwindSafe(|| listener.on_event(event))))
            .filter(Result::is_err)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: ExtensionEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for EventListeners<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct ObservedEvent {
        test: String,
        timestamp: Instant,
    }

    impl ExtensionEvent for ObservedEvent {
        fn event_type(&self) -> &'static str {
            "observed"
        }

        fn timestamp(&self) -> Instant {
            self.timestamp
        }

        fn extension_name(&self) -> &str {
            "sample-extension"
        }

        fn test_name(&self) -> &str {
            &self.test
        }
    }

    fn observed() -> ObservedEvent {
        ObservedEvent {
            test: "fast_test".to_string(),
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_closure_listener_counts_events() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);

        let mut listeners = EventListeners::new();
        listeners.add(move |_: &ObservedEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        let event = observed();
        listeners.emit(&event);
        listeners.emit(&event);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_struct_listener() {
        struct Names(Arc<Mutex<Vec<String>>>);

        impl EventListener<ObservedEvent> for Names {
            fn on_event(&self, event: &ObservedEvent) {
                self.0.lock().unwrap().push(format!(
                    "{}/{}",
                    event.extension_name(),
                    event.test_name()
                ));
            }
        }

        let names = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = EventListeners::new();
        listeners.add(Names(Arc::clone(&names)));
        listeners.emit(&observed());

        assert_eq!(*names.lock().unwrap(), vec!["sample-extension/fast_test"]);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);

        let mut listeners = EventListeners::new();
        listeners.add(|_: &ObservedEvent| panic!("listener blew up"));
        listeners.add(move |_: &ObservedEvent| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(listeners.emit(&observed()), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
