//! Periodic reading poller.
//!
//! One task fetches a reading, maps it to an indicator state and publishes the
//! result over a watch channel, then sleeps for the update interval. The next
//! fetch is only scheduled after the previous one finished, so a single fetch
//! is ever in flight. Failed fetches keep the last good state on display.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;

use crate::level::{IndicatorState, LevelMapper};
use crate::sources::ReadingSource;

/// Health of the polling loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollStatus {
    /// Completed fetch attempts, successful or not
    pub polls: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_update: Option<DateTime<Utc>>,
}

/// Latest published view of the tank
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Last successfully mapped state; `None` until the first good reading
    pub state: Option<IndicatorState>,
    pub status: PollStatus,
}

#[derive(Default)]
struct Control {
    wake: Notify,
    paused: AtomicBool,
}

/// Remote control for a running poller
#[derive(Clone)]
pub struct PollerHandle {
    control: Arc<Control>,
}

impl PollerHandle {
    /// Fetch now instead of waiting out the interval
    pub fn refresh_now(&self) {
        self.control.wake.notify_one();
    }

    /// Suspend or resume fetching; resuming fetches immediately
    pub fn set_paused(&self, paused: bool) {
        self.control.paused.store(paused, Ordering::SeqCst);
        self.control.wake.notify_one();
    }
}

pub struct Poller {
    source: Box<dyn ReadingSource>,
    mapper: LevelMapper,
    interval: Duration,
    updates: watch::Sender<Snapshot>,
    control: Arc<Control>,
}

impl Poller {
    pub fn new(
        source: Box<dyn ReadingSource>,
        mapper: LevelMapper,
        interval: Duration,
    ) -> (Self, PollerHandle, watch::Receiver<Snapshot>) {
        let (updates, rx) = watch::channel(Snapshot::default());
        let control = Arc::new(Control::default());
        let handle = PollerHandle {
            control: control.clone(),
        };

        let poller = Self {
            source,
            mapper,
            interval,
            updates,
            control,
        };
        (poller, handle, rx)
    }

    /// Fetch, map and publish a single reading
    pub async fn poll_once(&mut self) {
        let result = match self.source.fetch().await {
            Ok(reading) => self
                .mapper
                .map(&reading)
                .map(|state| (state, reading.timestamp)),
            Err(e) => Err(e),
        };

        match result {
            Ok((state, taken_at)) => {
                tracing::info!(
                    level = state.level,
                    bars = state.bars,
                    fraction = state.fraction,
                    percent = %state.percent,
                    "water level updated"
                );
                self.updates.send_modify(|snap| {
                    snap.state = Some(state);
                    snap.status.polls += 1;
                    snap.status.consecutive_failures = 0;
                    snap.status.last_error = None;
                    snap.status.last_update = Some(taken_at);
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch water level");
                self.updates.send_modify(|snap| {
                    snap.status.polls += 1;
                    snap.status.consecutive_failures =
                        snap.status.consecutive_failures.saturating_add(1);
                    snap.status.last_error = Some(e.to_string());
                });
            }
        }
    }

    /// Poll until `cancel` fires; an in-flight fetch is dropped on cancel
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "poller started");

        loop {
            if !self.control.paused.load(Ordering::SeqCst) {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = self.poll_once() => {}
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.control.wake.notified() => {
                    tracing::debug!("poller woken early");
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("poller stopped");
    }
}
