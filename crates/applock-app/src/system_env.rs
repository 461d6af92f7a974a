//! Production Environment implementation on the tokio clock.
//!
//! `SystemEnv` reads time from `tokio::time::Instant` and sleeps with
//! `tokio::time::sleep`. In production both follow the monotonic system
//! clock; under a paused tokio runtime (`start_paused = true`) they follow the
//! runtime's virtual clock, so the same monitor code runs deterministically
//! in tests.

use std::time::Duration;

use applock_core::env::Environment;

/// Production environment using the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = tokio::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
