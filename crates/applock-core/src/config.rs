//! App-lock policy.
//!
//! [`AppLockConfig`] is supplied by the outside world (local settings toggle,
//! team policy push) and may change at any time while the monitor runs.
//!
//! # Text form
//!
//! ```text
//! disabled       locking off
//! enabled:<secs> lock after <secs> seconds in background
//! <secs>         shorthand for enabled:<secs>
//! ```

use std::{fmt, str::FromStr, time::Duration};

use crate::error::ConfigError;

/// Background time after which the app locks when no timeout is given.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(60);

/// App-lock policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppLockConfig {
    /// Lock once the app has spent `timeout` in background.
    Enabled {
        /// Background time allowed before locking
        timeout: Duration,
    },
    /// Never lock.
    Disabled,
}

impl AppLockConfig {
    /// Enabled policy with a timeout in whole seconds.
    pub const fn enabled_secs(secs: u64) -> Self {
        Self::Enabled { timeout: Duration::from_secs(secs) }
    }

    /// Whether locking is on.
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    /// Lock timeout. `None` when disabled.
    pub const fn timeout(&self) -> Option<Duration> {
        match self {
            Self::Enabled { timeout } => Some(*timeout),
            Self::Disabled => None,
        }
    }
}

impl Default for AppLockConfig {
    fn default() -> Self {
        Self::Enabled { timeout: DEFAULT_LOCK_TIMEOUT }
    }
}

impl fmt::Display for AppLockConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled { timeout } => write!(f, "enabled:{}", timeout.as_secs()),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

impl FromStr for AppLockConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("disabled") {
            return Ok(Self::Disabled);
        }

        let secs = match trimmed.split_once(':') {
            Some((tag, secs)) if tag.eq_ignore_ascii_case("enabled") => secs,
            Some(_) => return Err(ConfigError::InvalidPolicy { value: s.to_string() }),
            None if trimmed.eq_ignore_ascii_case("enabled") => {
                return Ok(Self::default());
            },
            None => trimmed,
        };

        let secs = secs
            .trim()
            .parse::<u64>()
            .map_err(|source| ConfigError::InvalidTimeout { value: secs.to_string(), source })?;

        Ok(Self::enabled_secs(secs))
    }
}
