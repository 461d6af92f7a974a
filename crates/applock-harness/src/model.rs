//! Reference model of the app-lock rules.
//!
//! A deliberately naive implementation: no timers, no actions. It remembers
//! when the app went to background and re-checks the elapsed time after every
//! operation. Being structured differently from
//! [`applock_core::LockMachine`] (polling vs. timer-driven) makes it a useful
//! oracle: a bug would have to appear in both shapes to go unnoticed.

use std::time::Duration;

use applock_core::AppLockConfig;

use crate::Operation;

/// Polling reference model.
#[derive(Debug, Clone)]
pub struct ModelLock {
    config: AppLockConfig,
    visible: bool,
    locked: bool,
    /// Virtual time since the start of the scenario
    now: Duration,
    hidden_since: Option<Duration>,
    unlocked_since_hide: bool,
}

impl ModelLock {
    /// Model in the initial state for the given first input values.
    pub fn new(config: AppLockConfig, visible: bool) -> Self {
        Self {
            config,
            visible,
            locked: config.is_enabled() && !visible,
            now: Duration::ZERO,
            hidden_since: None,
            unlocked_since_hide: false,
        }
    }

    /// Expected lock state.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Apply an operation.
    pub fn apply(&mut self, op: Operation) {
        match op {
            Operation::Show => {
                if !self.visible {
                    self.visible = true;
                    if self.expired() {
                        self.locked = true;
                    }
                    self.hidden_since = None;
                }
            },
            Operation::Hide => {
                if self.visible {
                    self.visible = false;
                    self.hidden_since = Some(self.now);
                    self.unlocked_since_hide = false;
                }
            },
            Operation::Unlock => {
                self.locked = false;
                self.unlocked_since_hide = true;
            },
            Operation::SetConfig(config) => {
                let was_enabled = self.config.is_enabled();
                self.config = config;
                if !config.is_enabled() {
                    self.locked = false;
                } else if !was_enabled {
                    self.hidden_since = None;
                    self.locked = !self.visible;
                }
            },
            Operation::Advance(by) => self.now += by,
        }

        if !self.visible && self.expired() {
            self.locked = true;
        }
    }

    fn expired(&self) -> bool {
        let (Some(timeout), Some(since)) = (self.config.timeout(), self.hidden_since) else {
            return false;
        };
        !self.unlocked_since_hide && self.now - since >= timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_locks_after_timeout_in_background() {
        let mut model = ModelLock::new(AppLockConfig::enabled_secs(60), true);
        model.apply(Operation::Hide);
        model.apply(Operation::Advance(Duration::from_secs(59)));
        assert!(!model.is_locked());

        model.apply(Operation::Advance(Duration::from_secs(1)));
        assert!(model.is_locked());
    }

    #[test]
    fn model_never_locks_when_disabled() {
        let mut model = ModelLock::new(AppLockConfig::Disabled, false);
        model.apply(Operation::Advance(Duration::from_secs(3600)));
        model.apply(Operation::Show);
        assert!(!model.is_locked());
    }
}
