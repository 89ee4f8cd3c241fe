//! Core infrastructure for unit-duration.
//!
//! This crate provides the pieces every test extension builds on:
//! - Test identity and context handed to lifecycle hooks
//! - The [`Extension`] contract with before and after execution hooks
//! - [`ExtensionChain`], which runs a test body between those hooks
//! - Event system for observability

pub mod error;
pub mod events;
pub mod extension;
pub mod runner;

pub use error::{BoxError, TestFailure};
pub use events::{EventListener, EventListeners, ExtensionEvent};
pub use extension::{Extension, TestContext, TestDescriptor, TestId};
pub use runner::ExtensionChain;
