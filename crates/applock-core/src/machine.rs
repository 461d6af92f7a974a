//! App-lock state machine.
//!
//! Decides whether the application is locked from three kinds of input:
//! foreground/background transitions, app-lock policy changes and explicit
//! unlocks. Uses the action pattern: [`LockMachine::handle`] takes the current
//! time and returns [`LockAction`]s for the driver to execute (arm or disarm
//! the delayed-lock timer, publish a new lock state). The machine never
//! polls; locking while in background is driven by the single timer it asks
//! for.
//!
//! # State Machine
//!
//! ```text
//!               background for >= timeout (timer or on return)
//!   ┌──────────┐ ─────────────────────────────────────────> ┌────────┐
//!   │ Unlocked │                                            │ Locked │
//!   └──────────┘ <───────────────────────────────────────── └────────┘
//!                     Unlocked event / policy Disabled
//!
//!   policy becomes Enabled while not visible: any state ──> Locked
//! ```
//!
//! An app that starts in background with locking enabled is treated as
//! already past its timeout and starts locked.

use std::{ops::Sub, time::Duration};

use crate::AppLockConfig;

/// Identity of a delayed-lock timer.
///
/// Each scheduled timer gets a fresh id, so a fire that raced with a
/// cancellation can be recognised and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw id value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Inputs to the lock state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    /// Application became visible (`true`) or went to background (`false`).
    VisibilityChanged(bool),

    /// App-lock policy changed.
    ConfigChanged(AppLockConfig),

    /// User (or system) unlocked the app explicitly.
    Unlocked,

    /// A previously scheduled delayed-lock timer elapsed.
    TimerFired(TimerId),
}

/// Actions returned by the lock state machine.
///
/// The driver executes these in order:
/// - `CancelLock`: drop the pending timer with this id
/// - `ScheduleLock`: arm a timer, report it back as [`LockEvent::TimerFired`]
/// - `Publish`: notify observers of the new lock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    /// Arm the delayed-lock timer.
    ScheduleLock {
        /// Id to report back when the timer fires
        timer: TimerId,
        /// Delay from now
        after: Duration,
    },

    /// Disarm a pending delayed-lock timer.
    CancelLock {
        /// Id of the timer to disarm
        timer: TimerId,
    },

    /// Lock state changed to this value.
    Publish(bool),
}

/// App-lock state machine.
///
/// Pure state machine - no I/O, no clock. Time is passed to
/// [`handle`](Self::handle), timers are requested through actions.
///
/// Generic over `Instant` to support both real time and virtual time for
/// deterministic testing.
///
/// # Invariants
///
/// - With [`AppLockConfig::Disabled`], `is_locked()` is false.
/// - At most one timer is pending; scheduling a new one always cancels the
///   previous one first.
/// - A timer is only pending while the app is in background, unlocked and
///   not manually unlocked since going to background.
#[derive(Debug, Clone)]
pub struct LockMachine<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Current policy
    config: AppLockConfig,
    /// Latest visibility signal
    visible: bool,
    /// Derived lock state
    locked: bool,
    /// When the app last went to background. Cleared on return or lock.
    backgrounded_at: Option<I>,
    /// Unlocked explicitly since the last backgrounding
    manually_unlocked: bool,
    /// Outstanding delayed-lock timer
    pending_timer: Option<TimerId>,
    /// Next timer id to hand out
    next_timer_id: u64,
}

impl<I> LockMachine<I>
where
    I: Copy + Ord + Send + Sync + Sub<Output = Duration>,
{
    /// Create a machine from the first values of the two input streams.
    ///
    /// Locking enabled while the app is not visible starts locked; every
    /// other combination starts unlocked. No timer is running initially.
    pub fn new(config: AppLockConfig, visible: bool) -> Self {
        let locked = config.is_enabled() && !visible;
        tracing::debug!(%config, visible, locked, "app lock machine created");

        Self {
            config,
            visible,
            locked,
            backgrounded_at: None,
            manually_unlocked: false,
            pending_timer: None,
            next_timer_id: 0,
        }
    }

    /// Whether the app is currently locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Current app-lock policy.
    #[must_use]
    pub fn config(&self) -> AppLockConfig {
        self.config
    }

    /// Latest visibility signal.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the app was unlocked explicitly since it last went to
    /// background.
    #[must_use]
    pub fn is_manually_unlocked(&self) -> bool {
        self.manually_unlocked
    }

    /// When the app last went to background. `None` if visible or already
    /// locked by the timer.
    #[must_use]
    pub fn backgrounded_at(&self) -> Option<I> {
        self.backgrounded_at
    }

    /// Outstanding delayed-lock timer, if any.
    #[must_use]
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending_timer
    }

    /// Remaining background time before the pending timer locks the app.
    ///
    /// `None` when no lock is pending.
    #[must_use]
    pub fn time_until_lock(&self, now: I) -> Option<Duration> {
        self.pending_timer?;
        let timeout = self.config.timeout()?;
        let since = self.backgrounded_at?;
        Some(timeout.saturating_sub(now - since))
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: LockEvent, now: I) -> Vec<LockAction> {
        let was_locked = self.locked;
        let mut actions = match event {
            LockEvent::VisibilityChanged(visible) => self.on_visibility(visible, now),
            LockEvent::ConfigChanged(config) => self.on_config(config, now),
            LockEvent::Unlocked => self.on_unlock(),
            LockEvent::TimerFired(timer) => self.on_timer(timer),
        };

        if self.locked != was_locked {
            if self.locked {
                tracing::info!(?event, "app locked");
            } else {
                tracing::info!(?event, "app unlocked");
            }
            actions.push(LockAction::Publish(self.locked));
        }

        actions
    }

    fn on_visibility(&mut self, visible: bool, now: I) -> Vec<LockAction> {
        if visible == self.visible {
            return Vec::new();
        }
        self.visible = visible;

        let Some(timeout) = self.config.timeout() else {
            return Vec::new();
        };

        if visible { self.on_foreground(timeout, now) } else { self.on_background(timeout, now) }
    }

    fn on_background(&mut self, timeout: Duration, now: I) -> Vec<LockAction> {
        self.manually_unlocked = false;
        self.backgrounded_at = Some(now);

        let mut actions = self.cancel_timer();
        if !self.locked {
            actions.push(self.schedule_timer(timeout));
        }

        tracing::debug!(?timeout, "app went to background");
        actions
    }

    fn on_foreground(&mut self, timeout: Duration, now: I) -> Vec<LockAction> {
        let actions = self.cancel_timer();

        let expired = self.backgrounded_at.take().is_some_and(|since| now - since >= timeout);
        if expired && !self.manually_unlocked {
            self.locked = true;
        }

        tracing::debug!(expired, "app returned to foreground");
        actions
    }

    fn on_config(&mut self, config: AppLockConfig, now: I) -> Vec<LockAction> {
        let previous = std::mem::replace(&mut self.config, config);
        if previous == config {
            return Vec::new();
        }
        tracing::debug!(%previous, %config, "app lock policy changed");

        match (previous.timeout(), config.timeout()) {
            (_, None) => {
                self.backgrounded_at = None;
                self.locked = false;
                self.cancel_timer()
            },
            (None, Some(_)) => {
                // No retroactive grace period for time spent in background
                // while locking was off.
                self.backgrounded_at = None;
                if !self.visible {
                    self.locked = true;
                }
                Vec::new()
            },
            (Some(_), Some(timeout)) => self.reschedule(timeout, now),
        }
    }

    /// Re-arm a pending timer against a new timeout, measured from the
    /// original backgrounding instant.
    fn reschedule(&mut self, timeout: Duration, now: I) -> Vec<LockAction> {
        let Some(since) = self.backgrounded_at.filter(|_| self.pending_timer.is_some()) else {
            return Vec::new();
        };

        let mut actions = self.cancel_timer();
        let elapsed = now - since;
        if elapsed >= timeout {
            self.backgrounded_at = None;
            self.locked = true;
        } else {
            actions.push(self.schedule_timer(timeout - elapsed));
        }
        actions
    }

    fn on_unlock(&mut self) -> Vec<LockAction> {
        self.manually_unlocked = true;
        self.locked = false;
        self.cancel_timer()
    }

    fn on_timer(&mut self, timer: TimerId) -> Vec<LockAction> {
        if self.pending_timer != Some(timer) {
            tracing::debug!(timer = timer.get(), "ignoring stale lock timer");
            return Vec::new();
        }

        self.pending_timer = None;
        self.backgrounded_at = None;
        if self.config.is_enabled() {
            self.locked = true;
        }
        Vec::new()
    }

    fn schedule_timer(&mut self, after: Duration) -> LockAction {
        let timer = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        self.pending_timer = Some(timer);
        LockAction::ScheduleLock { timer, after }
    }

    fn cancel_timer(&mut self) -> Vec<LockAction> {
        self.pending_timer.take().map(|timer| LockAction::CancelLock { timer }).into_iter().collect()
    }
}
