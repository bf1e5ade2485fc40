//! Periodic collection scheduler.
//!
//! Runs one collection immediately and then once per interval. Collection
//! is awaited inline, so a slow run delays the next tick instead of
//! overlapping with it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::orchestrator::Collector;
use crate::github::RepositorySource;

/// What the scheduler is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Waiting for the next tick.
    Idle,
    /// A collection run is in progress.
    Collecting,
}

/// Drives a [`Collector`] on a fixed interval.
pub struct Scheduler<S> {
    collector: Collector<S>,
    interval: Duration,
    collecting: AtomicBool,
}

impl<S: RepositorySource> Scheduler<S> {
    pub fn new(collector: Collector<S>, interval: Duration) -> Self {
        Self {
            collector,
            interval,
            collecting: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SchedulerState {
        if self.collecting.load(Ordering::Acquire) {
            SchedulerState::Collecting
        } else {
            SchedulerState::Idle
        }
    }

    /// Runs until `shutdown` turns true or its sender is dropped.
    ///
    /// Shutdown is only observed between runs; a run in progress always
    /// completes first. Ticks missed during a long run collapse into a
    /// single immediate rerun.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval = %humantime::format_duration(self.interval),
            accounts = self.collector.settings().accounts.len(),
            "Scheduler started"
        );

        let mut runs: u64 = 0;
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            runs += 1;
            self.collecting.store(true, Ordering::Release);
            tracing::debug!(run = runs, "Collection run starting");
            self.collector.run_collection().await;
            self.collecting.store(false, Ordering::Release);
        }

        tracing::info!(runs, "Scheduler stopped");
    }
}
