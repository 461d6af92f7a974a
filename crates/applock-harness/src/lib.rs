//! Deterministic simulation harness for app-lock testing.
//!
//! Virtual-clock implementation of the Environment trait plus a timer-wheel
//! driver for [`applock_core::LockMachine`], so timing scenarios run
//! instantly and reproducibly.
//!
//! # Model-Based Testing
//!
//! The `model` module provides a reference implementation of the lock rules
//! that polls elapsed time instead of using timers. Operations are applied to
//! both the model and the real machine (through [`SimDriver`]), and their
//! observable lock states are compared.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
pub mod operation;
pub mod sim_driver;
pub mod sim_env;

pub use model::ModelLock;
pub use operation::Operation;
pub use sim_driver::SimDriver;
pub use sim_env::{SimEnv, SimInstant};
