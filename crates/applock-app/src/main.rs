//! App-lock monitor demo binary.
//!
//! Stands in for the platform glue: reads visibility, policy and unlock
//! commands from stdin and logs every lock transition the monitor publishes.
//!
//! # Usage
//!
//! ```bash
//! # Lock after 5 seconds in background, app starts in foreground
//! applock --timeout-secs 5 --start-visible
//!
//! # Then type one command per line:
//! #   show | hide | unlock | config <disabled|enabled:N|N> | status | quit
//! ```

use std::{pin::pin, str::FromStr};

use applock_app::{LockStateMonitor, SystemEnv};
use applock_core::{AppLockConfig, ConfigError};
use clap::Parser;
use futures::StreamExt;
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// App-lock monitor driven from stdin
#[derive(Parser, Debug)]
#[command(name = "applock")]
#[command(about = "Drive the app-lock monitor from stdin commands")]
#[command(version)]
struct Args {
    /// Seconds in background before the app locks
    #[arg(short, long, default_value_t = 60)]
    timeout_secs: u64,

    /// Start with app lock disabled
    #[arg(long)]
    disabled: bool,

    /// Start with the app in the foreground
    #[arg(long)]
    start_visible: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// One line of stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Show,
    Hide,
    Unlock,
    Config(AppLockConfig),
    Status,
    Quit,
}

#[derive(Error, Debug)]
enum InputError {
    #[error("unknown command: {0:?}")]
    Unknown(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FromStr for Input {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let input = match (words.next(), words.next(), words.next()) {
            (Some("show"), None, None) => Self::Show,
            (Some("hide"), None, None) => Self::Hide,
            (Some("unlock"), None, None) => Self::Unlock,
            (Some("config"), Some(policy), None) => Self::Config(policy.parse()?),
            (Some("status"), None, None) => Self::Status,
            (Some("quit"), None, None) => Self::Quit,
            _ => return Err(InputError::Unknown(line.to_string())),
        };
        Ok(input)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = if args.disabled {
        AppLockConfig::Disabled
    } else {
        AppLockConfig::enabled_secs(args.timeout_secs)
    };

    let (visible_tx, _) = watch::channel(args.start_visible);
    let (config_tx, _) = watch::channel(config);
    let monitor = LockStateMonitor::spawn(&visible_tx, &config_tx, SystemEnv::new());

    tracing::info!(%config, visible = args.start_visible, "app lock monitor running");

    let transitions = monitor.is_locked().into_stream();
    let reporter = tokio::spawn(async move {
        let mut transitions = pin!(transitions);
        while let Some(locked) = transitions.next().await {
            tracing::info!(locked, "lock state");
        }
        tracing::info!("lock state stream ended");
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let input = match line.parse::<Input>() {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("{e}");
                continue;
            },
        };

        match input {
            Input::Show => {
                visible_tx.send_replace(true);
            },
            Input::Hide => {
                visible_tx.send_replace(false);
            },
            Input::Unlock => monitor.app_unlocked()?,
            Input::Config(config) => {
                config_tx.send_replace(config);
            },
            Input::Status => {
                tracing::info!(
                    locked = monitor.current(),
                    visible = *visible_tx.borrow(),
                    config = %*config_tx.borrow(),
                    "status"
                );
            },
            Input::Quit => break,
        }
    }

    monitor.shutdown().await;
    reporter.await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("show".parse::<Input>().ok(), Some(Input::Show));
        assert_eq!("unlock".parse::<Input>().ok(), Some(Input::Unlock));
        assert_eq!(
            "config enabled:5".parse::<Input>().ok(),
            Some(Input::Config(AppLockConfig::enabled_secs(5)))
        );
        assert_eq!(
            "config disabled".parse::<Input>().ok(),
            Some(Input::Config(AppLockConfig::Disabled))
        );
    }

    #[test]
    fn rejects_unknown_and_bad_policy() {
        assert!(matches!("lock now".parse::<Input>(), Err(InputError::Unknown(_))));
        assert!(matches!("config sometimes:1".parse::<Input>(), Err(InputError::Config(_))));
        assert!(matches!("config".parse::<Input>(), Err(InputError::Unknown(_))));
    }
}
