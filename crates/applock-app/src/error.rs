//! Errors surfaced by the monitor handle.

use thiserror::Error;

/// Errors returned by [`crate::LockStateMonitor`] operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// The monitor's event loop has stopped: an upstream stream ended or the
    /// monitor was shut down. Lock tracking is no longer live.
    #[error("app lock monitor terminated")]
    Terminated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminated_display() {
        assert_eq!(MonitorError::Terminated.to_string(), "app lock monitor terminated");
    }
}
