//! App-lock monitor actor.
//!
//! [`LockStateMonitor::spawn`] starts one tokio task that exclusively owns a
//! [`LockMachine`]. Visibility changes, policy changes, explicit unlocks and
//! the delayed-lock timer are all funnelled through a single `select!` loop,
//! so each event is applied atomically and a firing timer can never race an
//! incoming unlock.
//!
//! ```text
//!   visibility ──┐
//!   policy     ──┼──> event loop ──> LockMachine ──> actions
//!   unlock     ──┤        ^                            │
//!   timer      ──┘        └──── arm / disarm timer <───┤
//!                                                      └──> lock state (watch)
//! ```
//!
//! The loop stops when either upstream stream ends, when
//! [`shutdown`](LockStateMonitor::shutdown) is called, or when the handle is
//! dropped. Stopping drops the pending timer, both upstream subscriptions and
//! the lock state sender, so every [`LockWatcher`] observes the end of the
//! stream.

use std::{future::Future, pin::Pin};

use applock_core::{
    AppLockConfig, LockAction, LockEvent, LockMachine, TimerId, env::Environment,
};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{ConfigSource, LockWatcher, MonitorError, VisibilitySource};

/// Requests from the handle to the event loop.
#[derive(Debug)]
enum Command {
    Unlock,
    Shutdown,
}

/// Why the event loop exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    VisibilityEnded,
    ConfigEnded,
    Shutdown,
    HandleDropped,
}

/// Armed delayed-lock timer. Dropping it cancels it.
struct PendingTimer {
    id: TimerId,
    sleep: Pin<Box<dyn Future<Output = ()> + Send>>,
}

/// Handle to a running app-lock monitor.
///
/// Cheap to query from any task. Dropping the handle stops the monitor.
#[derive(Debug)]
pub struct LockStateMonitor {
    commands: mpsc::UnboundedSender<Command>,
    locked: watch::Receiver<bool>,
    task: Option<JoinHandle<()>>,
}

impl LockStateMonitor {
    /// Subscribe to both input streams and start the monitor.
    ///
    /// The current values of the two streams determine the initial lock
    /// state: locking enabled while the app is not visible starts locked.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn<V, C, E>(visibility: &V, config: &C, env: E) -> Self
    where
        V: VisibilitySource + ?Sized,
        C: ConfigSource + ?Sized,
        E: Environment,
    {
        let mut visibility = visibility.is_app_visible();
        let mut config = config.observe_app_lock_config();

        let visible = *visibility.borrow_and_update();
        let policy: AppLockConfig = *config.borrow_and_update();
        let machine = LockMachine::new(policy, visible);

        let (locked_tx, locked_rx) = watch::channel(machine.is_locked());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let event_loop = EventLoop {
            machine,
            env,
            visibility,
            config,
            commands: commands_rx,
            locked: locked_tx,
            timer: None,
        };
        let task = tokio::spawn(event_loop.run());

        Self { commands: commands_tx, locked: locked_rx, task: Some(task) }
    }

    /// Replay-latest stream of the lock state.
    ///
    /// Every call creates an independent watcher whose first
    /// [`next`](LockWatcher::next) returns the current state.
    pub fn is_locked(&self) -> LockWatcher {
        LockWatcher::new(self.locked.clone())
    }

    /// Current lock state without waiting.
    pub fn current(&self) -> bool {
        *self.locked.borrow()
    }

    /// Record an explicit unlock.
    ///
    /// Unlocks immediately if locked. Otherwise the unlock is remembered so
    /// that nothing re-locks until the next trip to background has run its
    /// full timeout.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Terminated`] if the monitor has stopped.
    pub fn app_unlocked(&self) -> Result<(), MonitorError> {
        self.commands.send(Command::Unlock).map_err(|_| MonitorError::Terminated)
    }

    /// Whether the event loop has stopped.
    pub fn is_terminated(&self) -> bool {
        self.commands.is_closed()
    }

    /// Stop the monitor and wait for its event loop to exit.
    pub async fn shutdown(mut self) {
        // Already stopped if the send fails
        let _ = self.commands.send(Command::Shutdown);

        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            tracing::warn!("app lock monitor task failed: {e}");
        }
    }
}

impl Drop for LockStateMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// State owned by the monitor task.
struct EventLoop<E: Environment> {
    machine: LockMachine<E::Instant>,
    env: E,
    visibility: watch::Receiver<bool>,
    config: watch::Receiver<AppLockConfig>,
    commands: mpsc::UnboundedReceiver<Command>,
    locked: watch::Sender<bool>,
    timer: Option<PendingTimer>,
}

impl<E: Environment> EventLoop<E> {
    async fn run(mut self) {
        tracing::debug!(locked = self.machine.is_locked(), "app lock monitor started");

        let reason = loop {
            tokio::select! {
                changed = self.visibility.changed() => {
                    if changed.is_err() {
                        break StopReason::VisibilityEnded;
                    }
                    let visible = *self.visibility.borrow_and_update();
                    self.dispatch(LockEvent::VisibilityChanged(visible));
                },
                changed = self.config.changed() => {
                    if changed.is_err() {
                        break StopReason::ConfigEnded;
                    }
                    let config = *self.config.borrow_and_update();
                    self.dispatch(LockEvent::ConfigChanged(config));
                },
                command = self.commands.recv() => match command {
                    Some(Command::Unlock) => self.dispatch(LockEvent::Unlocked),
                    Some(Command::Shutdown) => break StopReason::Shutdown,
                    None => break StopReason::HandleDropped,
                },
                timer = wait_timer(&mut self.timer) => {
                    self.timer = None;
                    self.dispatch(LockEvent::TimerFired(timer));
                },
            }
        };

        match reason {
            StopReason::Shutdown | StopReason::HandleDropped => {
                tracing::debug!(?reason, "app lock monitor stopped");
            },
            StopReason::VisibilityEnded | StopReason::ConfigEnded => {
                tracing::warn!(?reason, "app lock monitor stopped: upstream ended");
            },
        }
    }

    /// Apply one event to the machine and execute the resulting actions.
    fn dispatch(&mut self, event: LockEvent) {
        let now = self.env.now();
        for action in self.machine.handle(event, now) {
            match action {
                LockAction::ScheduleLock { timer, after } => {
                    let env = self.env.clone();
                    self.timer = Some(PendingTimer {
                        id: timer,
                        sleep: Box::pin(async move { env.sleep(after).await }),
                    });
                },
                LockAction::CancelLock { timer } => {
                    if self.timer.as_ref().is_some_and(|pending| pending.id == timer) {
                        self.timer = None;
                    }
                },
                LockAction::Publish(locked) => {
                    self.locked.send_if_modified(|current| {
                        let changed = *current != locked;
                        *current = locked;
                        changed
                    });
                },
            }
        }
    }
}

/// Resolve when the armed timer fires. Never resolves without one.
async fn wait_timer(timer: &mut Option<PendingTimer>) -> TimerId {
    match timer {
        Some(pending) => {
            pending.sleep.as_mut().await;
            pending.id
        },
        None => std::future::pending().await,
    }
}
