//! Property-based tests for the unit duration guard.
//!
//! Run with: cargo test --test property_tests
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for the classifier and the guard.

pub mod classification;
pub mod guard;
