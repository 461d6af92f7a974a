//! Virtual-clock environment.
//!
//! `SimEnv` is a manually advanced clock. Time only moves when a test calls
//! [`SimEnv::advance`] (or sleeps through the environment), so every timing
//! scenario is deterministic and takes no wall-clock time.

use std::{
    future::{Future, ready},
    ops::{Add, Sub},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use applock_core::env::Environment;

/// Virtual instant: offset from the simulation epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Simulation epoch.
    pub const EPOCH: Self = Self(Duration::ZERO);

    /// Offset from the simulation epoch.
    pub fn since_epoch(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs))
    }
}

/// Manually advanced clock shared by clones.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    nanos: Arc<AtomicU64>,
}

impl SimEnv {
    /// Create a clock at the simulation epoch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward. Saturates at the largest representable instant.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        // The closure always returns Some, so the update cannot fail
        let _ = self.nanos.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |nanos| {
            Some(nanos.saturating_add(by))
        });
    }

    /// Move the clock to `to`. Earlier targets are ignored.
    pub fn advance_to(&self, to: SimInstant) {
        let target = u64::try_from(to.since_epoch().as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_max(target, Ordering::SeqCst);
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> SimInstant {
        SimInstant(Duration::from_nanos(self.nanos.load(Ordering::SeqCst)))
    }

    /// Jumps the virtual clock forward and completes immediately.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        self.advance(duration);
        ready(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_only_moves_when_advanced() {
        let env = SimEnv::new();
        let t0 = env.now();
        assert_eq!(env.now(), t0);

        env.advance(Duration::from_secs(5));
        assert_eq!(env.now() - t0, Duration::from_secs(5));
    }

    #[test]
    fn clones_share_the_clock() {
        let env = SimEnv::new();
        let other = env.clone();

        other.advance(Duration::from_millis(250));
        assert_eq!(env.now().since_epoch(), Duration::from_millis(250));
    }

    #[test]
    fn advance_saturates_instead_of_wrapping() {
        let env = SimEnv::new();
        env.advance(Duration::MAX);
        let far = env.now();

        env.advance(Duration::from_secs(1));
        assert!(env.now() >= far);
        assert_eq!(env.now(), far);
    }

    #[test]
    fn advance_to_never_goes_backwards() {
        let env = SimEnv::new();
        env.advance(Duration::from_secs(10));

        env.advance_to(SimInstant::EPOCH + Duration::from_secs(3));
        assert_eq!(env.now().since_epoch(), Duration::from_secs(10));
    }
}
