//! Coalesce bursts of values into the last one, once things have been quiet
//! for a while.

use std::time::Duration;
use tokio::time::Instant;

/// Holds at most one pending value, released once `delay` has passed without
/// a newer value being pushed.
#[derive(Debug)]
pub struct Debouncer<T> {
    /// How long the input has to stay quiet.
    delay: Duration,
    /// The value waiting to fire, and when it will.
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    /// Make a debouncer that waits for `delay` of quiet.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// The quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the wait.
    pub fn push(&mut self, value: T) {
        self.pending = Some((Instant::now() + self.delay, value));
    }

    /// Drop the pending value, if any, and return it.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    /// Whether a value is waiting to fire.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait for the pending value to fire. Never resolves while nothing is
    /// pending.
    ///
    /// Cancel safe: dropping the future before it resolves leaves the pending
    /// value in place.
    pub async fn fired(&mut self) -> T {
        let deadline = match &self.pending {
            Some((deadline, _)) => *deadline,
            None => return std::future::pending().await,
        };
        tokio::time::sleep_until(deadline).await;
        match self.pending.take() {
            Some((_, value)) => value,
            None => std::future::pending().await,
        }
    }
}
