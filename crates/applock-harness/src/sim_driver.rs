//! Virtual-time driver for the lock state machine.
//!
//! Executes [`LockAction`]s the way the production runtime does, but against
//! a [`SimEnv`] clock and an in-memory timer table. Advancing time fires due
//! timers in deadline order at their exact deadline instants.

use std::{collections::BTreeMap, time::Duration};

use applock_core::{AppLockConfig, LockAction, LockEvent, LockMachine, TimerId, env::Environment};

use crate::{Operation, SimEnv, SimInstant};

/// Drives a [`LockMachine`] in virtual time.
#[derive(Debug)]
pub struct SimDriver {
    env: SimEnv,
    machine: LockMachine<SimInstant>,
    timers: BTreeMap<TimerId, SimInstant>,
    published: Vec<bool>,
}

impl SimDriver {
    /// Create a driver with a fresh clock.
    pub fn new(config: AppLockConfig, visible: bool) -> Self {
        Self::with_env(SimEnv::new(), config, visible)
    }

    /// Create a driver on an existing clock.
    pub fn with_env(env: SimEnv, config: AppLockConfig, visible: bool) -> Self {
        Self {
            env,
            machine: LockMachine::new(config, visible),
            timers: BTreeMap::new(),
            published: Vec::new(),
        }
    }

    /// The machine under test.
    pub fn machine(&self) -> &LockMachine<SimInstant> {
        &self.machine
    }

    /// The virtual clock.
    pub fn env(&self) -> &SimEnv {
        &self.env
    }

    /// Every lock state published so far, in order.
    pub fn published(&self) -> &[bool] {
        &self.published
    }

    /// Timers armed and not yet fired or cancelled.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Apply a scenario operation, then fire any timers that are due.
    pub fn apply(&mut self, op: Operation) {
        match op {
            Operation::Show => self.dispatch(LockEvent::VisibilityChanged(true)),
            Operation::Hide => self.dispatch(LockEvent::VisibilityChanged(false)),
            Operation::Unlock => self.dispatch(LockEvent::Unlocked),
            Operation::SetConfig(config) => self.dispatch(LockEvent::ConfigChanged(config)),
            Operation::Advance(by) => self.advance(by),
        }
        self.fire_due();
    }

    /// Advance virtual time, firing timers at their deadlines on the way.
    pub fn advance(&mut self, by: Duration) {
        let target = self.env.now() + by;
        while let Some((&timer, &deadline)) = self.next_timer() {
            if deadline > target {
                break;
            }
            self.env.advance_to(deadline);
            self.fire(timer);
        }
        self.env.advance_to(target);
    }

    fn next_timer(&self) -> Option<(&TimerId, &SimInstant)> {
        self.timers.iter().min_by_key(|(_, deadline)| **deadline)
    }

    fn fire_due(&mut self) {
        let now = self.env.now();
        while let Some((&timer, &deadline)) = self.next_timer() {
            if deadline > now {
                break;
            }
            self.fire(timer);
        }
    }

    fn fire(&mut self, timer: TimerId) {
        self.timers.remove(&timer);
        tracing::debug!(timer = timer.get(), at = ?self.env.now().since_epoch(), "sim timer fired");
        self.dispatch(LockEvent::TimerFired(timer));
    }

    fn dispatch(&mut self, event: LockEvent) {
        let now = self.env.now();
        for action in self.machine.handle(event, now) {
            match action {
                LockAction::ScheduleLock { timer, after } => {
                    self.timers.insert(timer, now + after);
                },
                LockAction::CancelLock { timer } => {
                    self.timers.remove(&timer);
                },
                LockAction::Publish(locked) => self.published.push(locked),
            }
        }
    }
}
