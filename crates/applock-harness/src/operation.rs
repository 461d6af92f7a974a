//! Operations for model-based testing.

use std::time::Duration;

use applock_core::AppLockConfig;

/// One step of a lock scenario.
///
/// Applied to both the reference model and the real machine; their lock
/// states must agree after every step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// App came to foreground.
    Show,
    /// App went to background.
    Hide,
    /// Explicit unlock.
    Unlock,
    /// App-lock policy changed.
    SetConfig(AppLockConfig),
    /// Virtual time passed.
    Advance(Duration),
}
