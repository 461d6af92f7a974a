//! Error types for the app-lock core.
//!
//! The lock state machine itself is infallible. Errors only arise at the
//! boundary where app-lock policy arrives as text (settings, admin pushes,
//! command line).

use std::num::ParseIntError;

use thiserror::Error;

/// Errors produced while parsing an app-lock policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Policy string is neither `disabled`, `enabled:<secs>` nor `<secs>`.
    #[error("invalid app-lock policy: {value:?}")]
    InvalidPolicy {
        /// Input that failed to parse
        value: String,
    },

    /// Timeout is not a whole number of seconds.
    #[error("invalid app-lock timeout {value:?}: {source}")]
    InvalidTimeout {
        /// Timeout text that failed to parse
        value: String,
        /// Underlying integer parse failure
        source: ParseIntError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_input() {
        let err = ConfigError::InvalidPolicy { value: "sometimes".to_string() };
        assert_eq!(err.to_string(), "invalid app-lock policy: \"sometimes\"");
    }
}
