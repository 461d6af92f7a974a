//! Scenario tests for app-lock timing in virtual time.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - The lock state after the scenario
//! - The exact sequence of published lock transitions

use std::time::Duration;

use applock_core::AppLockConfig;
use applock_core::env::Environment;
use applock_harness::{Operation, SimDriver};

const TIMEOUT: Duration = Duration::from_secs(60);
const MARGIN: Duration = Duration::from_millis(100);

fn enabled() -> AppLockConfig {
    AppLockConfig::Enabled { timeout: TIMEOUT }
}

/// Open the app visible and unlock it explicitly.
fn opened_unlocked(config: AppLockConfig) -> SimDriver {
    let mut driver = SimDriver::new(config, true);
    driver.apply(Operation::Unlock);
    driver
}

/// Background the app for `away`, then bring it back.
fn away_and_back(config: AppLockConfig, away: Duration) -> SimDriver {
    let mut driver = opened_unlocked(config);
    driver.apply(Operation::Hide);
    driver.apply(Operation::Advance(away));
    driver.apply(Operation::Show);
    driver
}

#[test]
fn enabled_initial_open_from_background_is_locked() {
    let mut driver = SimDriver::new(enabled(), false);
    driver.apply(Operation::Show);

    assert!(driver.machine().is_locked());
}

#[test]
fn disabled_initial_open_from_background_is_unlocked() {
    let mut driver = SimDriver::new(AppLockConfig::Disabled, false);
    driver.apply(Operation::Show);

    assert!(!driver.machine().is_locked());
}

#[test]
fn enabled_background_longer_than_timeout_locks() {
    let mut driver = opened_unlocked(enabled());
    driver.apply(Operation::Hide);
    driver.apply(Operation::Advance(TIMEOUT + MARGIN));

    assert!(driver.machine().is_locked());
}

#[test]
fn enabled_background_shorter_than_timeout_stays_unlocked() {
    let mut driver = opened_unlocked(enabled());
    driver.apply(Operation::Hide);
    driver.apply(Operation::Advance(TIMEOUT - MARGIN));

    assert!(!driver.machine().is_locked());
}

#[test]
fn disabled_background_never_locks() {
    for away in [TIMEOUT - MARGIN, TIMEOUT + MARGIN] {
        let mut driver = opened_unlocked(AppLockConfig::Disabled);
        driver.apply(Operation::Hide);
        driver.apply(Operation::Advance(away));
        assert!(!driver.machine().is_locked());

        driver.apply(Operation::Show);
        assert!(!driver.machine().is_locked());
    }
}

#[test]
fn enabled_return_before_timeout_is_unlocked() {
    let driver = away_and_back(enabled(), TIMEOUT - MARGIN);
    assert!(!driver.machine().is_locked());
    assert!(driver.published().is_empty());
}

#[test]
fn enabled_return_after_timeout_is_locked() {
    let driver = away_and_back(enabled(), TIMEOUT + MARGIN);
    assert!(driver.machine().is_locked());
    assert_eq!(driver.published(), &[true]);
}

#[test]
fn started_locked_stays_locked_after_short_background() {
    let mut driver = SimDriver::new(enabled(), false);
    driver.apply(Operation::Advance(TIMEOUT - MARGIN));
    driver.apply(Operation::Show);

    assert!(driver.machine().is_locked());
}

#[test]
fn visible_then_unlocked_is_not_locked() {
    let driver = opened_unlocked(enabled());
    assert!(!driver.machine().is_locked());
    assert!(driver.machine().is_manually_unlocked());
}

#[test]
fn background_timeout_cycle_after_short_trip() {
    // t=0 unlocked and visible, 30s in background, back, then a long trip
    let mut driver = opened_unlocked(enabled());
    driver.apply(Operation::Hide);
    driver.apply(Operation::Advance(Duration::from_secs(30)));
    driver.apply(Operation::Show);
    assert!(!driver.machine().is_locked());

    driver.apply(Operation::Hide);
    driver.apply(Operation::Advance(Duration::from_secs(61)));
    assert!(driver.machine().is_locked());

    driver.apply(Operation::Unlock);
    driver.apply(Operation::Show);

    insta::assert_snapshot!(format!("{:?}", driver.published()), @"[true, false]");
}

#[test]
fn timer_locks_exactly_at_deadline() {
    let mut driver = opened_unlocked(enabled());
    driver.apply(Operation::Hide);

    driver.apply(Operation::Advance(TIMEOUT - Duration::from_nanos(1)));
    assert!(!driver.machine().is_locked());

    driver.apply(Operation::Advance(Duration::from_nanos(1)));
    assert!(driver.machine().is_locked());
    assert_eq!(driver.published(), &[true]);
}

#[test]
fn policy_push_while_in_background() {
    let mut driver = opened_unlocked(enabled());
    driver.apply(Operation::Hide);
    driver.apply(Operation::Advance(Duration::from_secs(20)));

    // Tighter policy: 30s measured from the original backgrounding
    driver.apply(Operation::SetConfig(AppLockConfig::enabled_secs(30)));
    assert_eq!(
        driver.machine().time_until_lock(driver.env().now()),
        Some(Duration::from_secs(10))
    );

    driver.apply(Operation::Advance(Duration::from_secs(10)));
    assert!(driver.machine().is_locked());

    // Turning locking off always wins
    driver.apply(Operation::SetConfig(AppLockConfig::Disabled));
    assert!(!driver.machine().is_locked());

    // Re-enabling while hidden grants no grace period
    driver.apply(Operation::SetConfig(enabled()));
    assert!(driver.machine().is_locked());

    insta::assert_snapshot!(format!("{:?}", driver.published()), @"[true, false, true]");
}
