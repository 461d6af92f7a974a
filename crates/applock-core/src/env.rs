//! Environment abstraction for deterministic testing.
//!
//! Decouples lock logic from the system clock and the timer facility. Enables
//! deterministic tests with a virtual clock and production use with the tokio
//! timer wheel.

use std::time::Duration;

/// Abstract environment providing time and delayed wake-ups.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `sleep(d)` completes no earlier than `now() + d` as observed through the
///   same environment
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `tokio::time::Instant`, while simulation
    /// environments use a manually advanced virtual instant.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    ///
    /// # Invariants
    ///
    /// - Subsequent calls must return times >= previous calls.
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code schedules sleeps; the lock state machine itself asks
    /// for timers through [`crate::LockAction::ScheduleLock`].
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
