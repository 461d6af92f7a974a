//! Lock state observer.
//!
//! [`LockWatcher`] is the consumer side of the monitor's output: a
//! replay-latest boolean stream. The first [`next`](LockWatcher::next) yields
//! the current state without waiting; later calls wait for a different value.
//! Once the monitor stops, the stream ends with `None` instead of freezing on
//! a stale value.

use futures::Stream;
use tokio::sync::watch;

/// Observer of the app lock state.
#[derive(Debug, Clone)]
pub struct LockWatcher {
    rx: watch::Receiver<bool>,
    /// Last value handed out. `None` until the first `next()`.
    last: Option<bool>,
}

impl LockWatcher {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx, last: None }
    }

    /// Next lock state.
    ///
    /// Returns the current state immediately on the first call, then waits
    /// for each transition. Intermediate states that were replaced before the
    /// watcher got to run are skipped; consecutive duplicates are never
    /// returned. Returns `None` once the monitor has terminated.
    pub async fn next(&mut self) -> Option<bool> {
        if self.last.is_none() {
            // A closed channel means tracking has stopped; don't replay
            self.rx.has_changed().ok()?;
            let current = *self.rx.borrow_and_update();
            self.last = Some(current);
            return Some(current);
        }

        loop {
            self.rx.changed().await.ok()?;
            let current = *self.rx.borrow_and_update();
            if self.last != Some(current) {
                self.last = Some(current);
                return Some(current);
            }
        }
    }

    /// Current lock state without waiting.
    pub fn current(&self) -> bool {
        *self.rx.borrow()
    }

    /// Whether the monitor feeding this watcher has stopped.
    pub fn is_terminated(&self) -> bool {
        self.rx.has_changed().is_err()
    }

    /// Convert into a [`Stream`] of lock states with the same semantics as
    /// [`next`](Self::next).
    pub fn into_stream(self) -> impl Stream<Item = bool> + Send + 'static {
        futures::stream::unfold(self, |mut watcher| async move {
            let locked = watcher.next().await?;
            Some((locked, watcher))
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn first_next_replays_current() {
        let (tx, rx) = watch::channel(true);
        let mut watcher = LockWatcher::new(rx);

        assert_eq!(watcher.next().await, Some(true));
        drop(tx);
        assert_eq!(watcher.next().await, None);
    }

    #[tokio::test]
    async fn duplicates_are_skipped() {
        let (tx, rx) = watch::channel(false);
        let mut watcher = LockWatcher::new(rx);
        assert_eq!(watcher.next().await, Some(false));

        tx.send_replace(false);
        tx.send_replace(true);
        assert_eq!(watcher.next().await, Some(true));
    }

    #[tokio::test]
    async fn closed_channel_ends_before_replay() {
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let mut watcher = LockWatcher::new(rx);
        assert!(watcher.is_terminated());
        assert_eq!(watcher.next().await, None);
    }

    #[tokio::test]
    async fn stream_yields_transitions_then_ends() {
        let (tx, rx) = watch::channel(false);
        let mut stream = Box::pin(LockWatcher::new(rx).into_stream());
        assert_eq!(stream.next().await, Some(false));

        tx.send_replace(true);
        assert_eq!(stream.next().await, Some(true));

        drop(tx);
        assert_eq!(stream.next().await, None);
    }
}
