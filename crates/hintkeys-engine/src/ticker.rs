//! Single-shot timer with cancellation.
//!
//! The hint session arms one deadline at a time: arming again replaces the
//! pending deadline, and cancelling guarantees the callback will not run even
//! if the deadline has already passed but the task has not been polled yet.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A running deadline task.
struct TickerEntry {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Schedules one closure after a delay. Clones share the same slot.
#[derive(Clone, Default)]
pub struct Ticker {
    entry: Arc<Mutex<Option<TickerEntry>>>,
}

impl Ticker {
    /// Create an idle ticker.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a deadline is armed and has not fired or been cancelled.
    pub fn is_active(&self) -> bool {
        self.entry
            .lock()
            .as_ref()
            .is_some_and(|e| !e.token.is_cancelled() && !e.handle.is_finished())
    }

    /// Arm the timer, replacing any pending deadline. Must be called inside a
    /// tokio runtime.
    pub fn start<F>(&self, delay: Duration, on_fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        let cancel = token.clone();
        let fut = async move {
            trace!(delay_ms = delay.as_millis(), "ticker_start");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    trace!("ticker_cancelled");
                }
                _ = time::sleep(delay) => {
                    if !cancel.is_cancelled() {
                        on_fire();
                    }
                }
            }
        };
        let handle = tokio::spawn(fut);
        *self.entry.lock() = Some(TickerEntry { token, handle });
    }

    /// Cancel the pending deadline, if any (non-blocking).
    pub fn cancel(&self) {
        if let Some(entry) = self.entry.lock().take() {
            entry.token.cancel();
            // Let the task observe the token instead of aborting it.
            trace!("ticker_stop");
        }
    }
}

impl Drop for TickerEntry {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
