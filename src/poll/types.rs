//! Polling data structures.

use std::time::Duration;

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::info;

use crate::{error::ApiError, types::Swap};

/// Timing of the status poller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between the end of one fetch and the start of the next.
    pub interval: Duration,

    /// Granularity of the countdown published between fetches.
    pub tick: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            tick: Duration::from_secs(1),
        }
    }
}

impl PollConfig {
    /// Number of countdown ticks per interval, at least one.
    pub(crate) fn ticks(&self) -> u32 {
        let tick = self.tick.as_millis().max(1);
        (self.interval.as_millis() / tick).clamp(1, u32::MAX as u128) as u32
    }
}

/// Result of one status fetch.
#[derive(Debug)]
pub struct PollUpdate {
    /// 1-based number of the fetch.
    pub attempt: u32,

    pub result: Result<Swap, ApiError>,
}

impl PollUpdate {
    /// Whether this update ends polling.
    pub fn is_terminal(&self) -> bool {
        matches!(&self.result, Ok(swap) if swap.status.is_terminal())
    }
}

/// Receiver for status updates.
#[derive(Debug)]
pub struct StatusReceiver {
    inner: mpsc::Receiver<PollUpdate>,
}

impl StatusReceiver {
    pub(crate) fn new(inner: mpsc::Receiver<PollUpdate>) -> Self {
        Self { inner }
    }

    /// Receives the next update, or `None` once polling has ended.
    pub async fn recv(&mut self) -> Option<PollUpdate> {
        self.inner.recv().await
    }
}

/// Handle to a running poller. Dropping it stops the poller.
#[derive(Debug)]
pub struct PollHandle {
    task: Option<JoinHandle<()>>,
    countdown: watch::Receiver<Duration>,
}

impl PollHandle {
    pub(crate) fn new(task: JoinHandle<()>, countdown: watch::Receiver<Duration>) -> Self {
        Self {
            task: Some(task),
            countdown,
        }
    }

    /// Stops polling, cancelling an in-flight fetch. No-op if already stopped.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                info!("Stopping status poller");
            }
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Time left until the next fetch, for display.
    pub fn countdown(&self) -> Duration {
        *self.countdown.borrow()
    }

    /// Waits for the poller to end on its own.
    pub async fn wait(&mut self) {
        if let Some(task) = self.task.take() {
            // a cancelled task is a finished task
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ticks() {
        assert_eq!(PollConfig::default().ticks(), 5);
    }

    #[test]
    fn test_ticks_never_zero() {
        let config = PollConfig {
            interval: Duration::from_millis(10),
            tick: Duration::from_secs(1),
        };
        assert_eq!(config.ticks(), 1);

        let config = PollConfig {
            interval: Duration::ZERO,
            tick: Duration::ZERO,
        };
        assert_eq!(config.ticks(), 1);
    }
}
