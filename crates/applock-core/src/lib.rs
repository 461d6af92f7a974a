//! Core app-lock logic.
//!
//! Pure state machine deciding whether the application is locked, based on
//! foreground/background transitions, the app-lock policy and the time spent
//! in background. No I/O and no runtime: time is an input, timers are
//! returned as actions for the driver to execute.
//!
//! # Components
//!
//! - [`LockMachine`]: the lock state machine
//! - [`AppLockConfig`]: app-lock policy (enabled with a timeout, or disabled)
//! - [`env::Environment`]: time abstraction shared by drivers and harnesses

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod env;
pub mod error;
pub mod machine;

pub use config::{AppLockConfig, DEFAULT_LOCK_TIMEOUT};
pub use error::ConfigError;
pub use machine::{LockAction, LockEvent, LockMachine, TimerId};
