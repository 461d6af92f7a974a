//! Async app-lock monitor.
//!
//! Runs the [`applock_core::LockMachine`] inside a single tokio task that
//! observes the application visibility and app-lock policy streams, owns the
//! delayed-lock timer, and republishes the derived lock state as a
//! replay-latest stream.
//!
//! # Components
//!
//! - [`LockStateMonitor`]: the actor and its handle
//! - [`LockWatcher`]: observer of the lock state stream
//! - [`VisibilitySource`] / [`ConfigSource`]: input stream providers
//! - [`SystemEnv`]: production environment on the tokio clock

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod error;
mod monitor;
mod source;
mod system_env;
mod watcher;

pub use error::MonitorError;
pub use monitor::LockStateMonitor;
pub use source::{ConfigSource, VisibilitySource};
pub use system_env::SystemEnv;
pub use watcher::LockWatcher;
