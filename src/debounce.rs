//! Trailing-edge debouncing of actions.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::action::Action;

/// A single resettable timer that dispatches an action once input goes quiet.
///
/// Every call to [`Debouncer::schedule`] aborts the pending timer and starts a
/// new one, so a burst of calls results in exactly one dispatch.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// (Re)start the timer; `action` is sent when it expires.
    pub fn schedule(&mut self, tx: &mpsc::UnboundedSender<Action>, action: Action) {
        self.cancel();

        let tx = tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(action);
        }));
    }

    /// Drop the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Check if a timer is waiting to fire.
    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
