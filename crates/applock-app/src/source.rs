//! Input stream providers.
//!
//! The monitor consumes two replay-latest streams owned by the surrounding
//! application: whether the app is visible, and the current app-lock policy.
//! Both are modelled as [`tokio::sync::watch`] receivers: a new subscriber
//! sees the current value at once, every later change is delivered, and the
//! stream ends when the producing side is dropped.

use applock_core::AppLockConfig;
use tokio::sync::watch;

/// Provides the application visibility stream.
pub trait VisibilitySource {
    /// Subscribe to "application is in the foreground" transitions.
    fn is_app_visible(&self) -> watch::Receiver<bool>;
}

/// Provides the app-lock policy stream.
pub trait ConfigSource {
    /// Subscribe to app-lock policy changes.
    fn observe_app_lock_config(&self) -> watch::Receiver<AppLockConfig>;
}

impl VisibilitySource for watch::Receiver<bool> {
    fn is_app_visible(&self) -> watch::Receiver<bool> {
        self.clone()
    }
}

impl VisibilitySource for watch::Sender<bool> {
    fn is_app_visible(&self) -> watch::Receiver<bool> {
        self.subscribe()
    }
}

impl ConfigSource for watch::Receiver<AppLockConfig> {
    fn observe_app_lock_config(&self) -> watch::Receiver<AppLockConfig> {
        self.clone()
    }
}

impl ConfigSource for watch::Sender<AppLockConfig> {
    fn observe_app_lock_config(&self) -> watch::Receiver<AppLockConfig> {
        self.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_subscription_replays_latest() {
        let (tx, _rx) = watch::channel(false);
        tx.send_replace(true);

        let rx = tx.is_app_visible();
        assert!(*rx.borrow());
    }

    #[test]
    fn receiver_clone_sees_updates() {
        let (tx, rx) = watch::channel(AppLockConfig::Disabled);
        let subscribed = rx.observe_app_lock_config();

        tx.send_replace(AppLockConfig::enabled_secs(5));
        assert_eq!(*subscribed.borrow(), AppLockConfig::enabled_secs(5));
    }
}
