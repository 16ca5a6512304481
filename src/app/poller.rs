//! Per-resource poller
//!
//! One poller owns one resource for the lifetime of a run. It probes on
//! an independent cadence (an optional start delay, then one tick per
//! `interval`), evaluates the success predicate over each probe result,
//! and emits a latched done event exactly once. Everything after that
//! event is silence: the poller completes and never retracts.
//!
//! Probe dispatch is serialized by the tick clock, but a slow probe does
//! not block the next tick; up to `simultaneous` probes may be in flight
//! for the resource at once. When that bound is reached further ticks
//! are dropped, never queued.
//!
//! Cancellation is cooperative: the poller watches a broadcast shutdown
//! channel and returns as soon as it fires. Probes already in flight are
//! abandoned; their results are discarded when the result channel drops.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::options::WaitOptions;
use super::probe::{self, ProbeContext, ProbeReport};
use super::resource::{Resource, ResourceTarget};
use crate::constants::poll;

/// Event emitted by a poller toward the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceEvent {
    /// Index of the resource in the run's resource list
    pub index: usize,
    /// Latched completion state; never reverts once true
    pub done: bool,
}

/// File-size stability tracker
///
/// A file counts as ready only after it has existed at one constant size
/// for at least the stability window. Absence or any size change resets
/// the clock.
#[derive(Debug)]
pub struct FileStability {
    last_size: Option<u64>,
    first_seen_at: Instant,
}

impl FileStability {
    /// Start tracking at `now` with nothing observed yet
    pub fn new(now: Instant) -> Self {
        Self {
            last_size: None,
            first_seen_at: now,
        }
    }

    /// Fold one observation into the tracker; true when stable
    pub fn observe(&mut self, size: Option<u64>, now: Instant, window: Duration) -> bool {
        match size {
            None => {
                // Absent: reset
                self.last_size = None;
                self.first_seen_at = now;
                false
            }
            Some(size) if self.last_size != Some(size) => {
                // Just appeared, or still growing: restart the window
                self.last_size = Some(size);
                self.first_seen_at = now;
                false
            }
            Some(_) => now.duration_since(self.first_seen_at) >= window,
        }
    }
}

/// What a poller loop iteration decided to do
enum PollStep {
    Cancelled,
    Dispatch,
    Report(ProbeReport),
}

/// Poller for a single resource
pub struct ResourcePoller {
    index: usize,
    resource: Arc<Resource>,
    opts: Arc<WaitOptions>,
    ctx: Arc<ProbeContext>,
    events_tx: mpsc::Sender<ResourceEvent>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl ResourcePoller {
    /// Create a poller; it does nothing until [`run`](Self::run)
    pub fn new(
        index: usize,
        resource: Arc<Resource>,
        opts: Arc<WaitOptions>,
        ctx: Arc<ProbeContext>,
        events_tx: mpsc::Sender<ResourceEvent>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            index,
            resource,
            opts,
            ctx,
            events_tx,
            shutdown_rx,
        }
    }

    /// Drive the resource to its latched done state or to cancellation
    pub async fn run(mut self) {
        // Announce the pending state before the first probe
        if self
            .events_tx
            .send(ResourceEvent {
                index: self.index,
                done: false,
            })
            .await
            .is_err()
        {
            return;
        }

        if self.opts.verbose {
            if let ResourceTarget::Tcp(None) = self.resource.target() {
                warn!(
                    resource = %self.resource,
                    "malformed tcp resource; it will never be reachable"
                );
            }
        }

        // Start delay
        if !self.opts.delay.is_zero() {
            tokio::select! {
                _ = tokio::time::sleep(self.opts.delay) => {}
                _ = self.shutdown_rx.recv() => {
                    debug!(resource = %self.resource, "poller cancelled during delay");
                    return;
                }
            }
        }

        let permits = self.opts.simultaneous.min(Semaphore::MAX_PERMITS);
        let limiter = Arc::new(Semaphore::new(permits));
        let (probe_tx, mut probe_rx) = mpsc::channel(poll::PROBE_CHANNEL_CAPACITY);

        let mut ticker = tokio::time::interval(self.opts.interval.max(poll::MIN_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut stability = FileStability::new(Instant::now());
        let mut last_outcome: Option<bool> = None;

        loop {
            let step = tokio::select! {
                _ = self.shutdown_rx.recv() => PollStep::Cancelled,
                _ = ticker.tick() => PollStep::Dispatch,
                Some(report) = probe_rx.recv() => PollStep::Report(report),
            };

            match step {
                PollStep::Cancelled => {
                    debug!(resource = %self.resource, "poller cancelled");
                    return;
                }
                PollStep::Dispatch => match limiter.clone().try_acquire_owned() {
                    Ok(permit) => {
                        let resource = self.resource.clone();
                        let ctx = self.ctx.clone();
                        let probe_tx = probe_tx.clone();
                        tokio::spawn(async move {
                            let report = probe::dispatch(&resource, &ctx).await;
                            drop(permit);
                            // Receiver gone means the poller finished;
                            // the result is discarded
                            let _ = probe_tx.send(report).await;
                        });
                    }
                    Err(_) => {
                        debug!(
                            resource = %self.resource,
                            "in-flight probe bound reached, dropping tick"
                        );
                    }
                },
                PollStep::Report(report) => {
                    self.log_transition(&mut last_outcome, report);

                    if self.evaluate(report, &mut stability) {
                        debug!(resource = %self.resource, "resource done");
                        let _ = self
                            .events_tx
                            .send(ResourceEvent {
                                index: self.index,
                                done: true,
                            })
                            .await;
                        return;
                    }
                }
            }
        }
    }

    /// Apply the success predicate to one probe result
    fn evaluate(&self, report: ProbeReport, stability: &mut FileStability) -> bool {
        match report {
            ProbeReport::FileSize(size) => {
                if self.opts.reverse {
                    size.is_none()
                } else {
                    stability.observe(size, Instant::now(), self.opts.window)
                }
            }
            ProbeReport::Availability(available) => {
                if self.opts.reverse {
                    !available
                } else {
                    available
                }
            }
        }
    }

    /// Debug-log reachability transitions between probe cycles
    fn log_transition(&self, last_outcome: &mut Option<bool>, report: ProbeReport) {
        let reachable = match report {
            ProbeReport::Availability(available) => available,
            ProbeReport::FileSize(size) => size.is_some(),
        };
        if *last_outcome != Some(reachable) {
            debug!(
                resource = %self.resource,
                kind = %self.resource.kind(),
                reachable,
                "probe outcome changed"
            );
            *last_outcome = Some(reachable);
        }
    }
}
