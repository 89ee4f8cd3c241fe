//! Property tests for the duration guard.
//!
//! Invariants tested:
//! - A test fails if and only if it exceeds the exception threshold
//! - Opted-out tests never fail
//! - No start time survives a run

use proptest::prelude::*;
use std::time::Duration;
use unit_duration::{DurationGuardConfig, ManualClock, TestDescriptor, UnitTest};

fn unit_test(clock: &ManualClock) -> UnitTest {
    UnitTest::builder()
        .guard(
            DurationGuardConfig::builder()
                .clock(clock.clone())
                .build()
                .unwrap()
                .guard(),
        )
        .build()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: failure happens exactly past the exception threshold
    #[test]
    fn fails_iff_past_exception(micros in 0u64..120_000) {
        let clock = ManualClock::new();
        let unit = unit_test(&clock);
        let elapsed = Duration::from_micros(micros);

        let result = unit.run("generated", || clock.advance(elapsed));

        prop_assert_eq!(result.is_err(), elapsed.as_millis() > 50);
        prop_assert_eq!(unit.guard().in_flight(), 0);
    }

    /// Property: opted-out tests pass regardless of duration
    #[test]
    fn opted_out_tests_always_pass(millis in 0u64..10_000) {
        let clock = ManualClock::new();
        let unit = unit_test(&clock);

        let descriptor = TestDescriptor::new("generated").ignore_rules();
        let result = unit.run_with(descriptor, || clock.advance(Duration::from_millis(millis)));

        prop_assert!(result.is_ok());
        prop_assert_eq!(unit.guard().in_flight(), 0);
    }
}
