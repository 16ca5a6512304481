//! Wait orchestration
//!
//! The waiter is the run's control plane: it validates and normalizes
//! the options, parses every resource, builds the shared probe context,
//! spawns one poller per resource, and races the aggregated completion
//! signal against the global deadline. Exactly one terminal outcome is
//! produced per run: the `select!` race picks the first winner and
//! everything afterwards is cleanup.
//!
//! Cancellation is a broadcast: whichever side loses the race, every
//! poller receives the shutdown signal and is joined under a short
//! grace period. Probes still in flight at that point are abandoned and
//! their results discarded.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info};

use super::aggregator::{self, DriveOutcome, StatusBoard};
use super::options::WaitOptions;
use super::poller::ResourcePoller;
use super::probe::ProbeContext;
use super::resource::Resource;
use crate::constants::{poll, shutdown};
use crate::errors::{ConfigResult, Result, WaitError};

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitSummary {
    /// Wall time from start to the last resource latching done
    pub elapsed: Duration,
    /// Number of resources that were waited on
    pub resources: usize,
}

/// Orchestrator for one wait run
pub struct Waiter {
    opts: Arc<WaitOptions>,
    resources: Vec<Arc<Resource>>,
    ctx: Arc<ProbeContext>,
}

impl Waiter {
    /// Validate options, parse resources, and build the probe context
    ///
    /// Every failure here is synchronous and reaches the caller before
    /// any probe is dispatched.
    pub fn new(opts: WaitOptions) -> Result<Self> {
        opts.validate()?;
        let opts = opts.normalized();

        let resources = opts
            .resources
            .iter()
            .map(|raw| Resource::parse(raw).map(Arc::new))
            .collect::<ConfigResult<Vec<_>>>()?;

        let ctx = Arc::new(ProbeContext::from_options(&opts)?);

        Ok(Self {
            opts: Arc::new(opts),
            resources,
            ctx,
        })
    }

    /// The parsed resource descriptors, in input order
    pub fn resources(&self) -> &[Arc<Resource>] {
        &self.resources
    }

    /// Run to the single terminal outcome
    pub async fn run(self) -> Result<WaitSummary> {
        let started = Instant::now();

        if self.opts.reverse && self.opts.log {
            info!("reverse mode");
        }
        debug!(
            resources = self.resources.len(),
            interval_ms = self.opts.interval.as_millis() as u64,
            timeout_ms = self.opts.timeout.map(|t| t.as_millis() as u64),
            "starting wait"
        );

        let board = Arc::new(StatusBoard::new(
            self.resources.iter().map(|r| r.raw().to_string()).collect(),
        ));
        let (events_tx, events_rx) = mpsc::channel(poll::EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, _) = broadcast::channel(1);

        let mut pollers = JoinSet::new();
        for (index, resource) in self.resources.iter().enumerate() {
            let poller = ResourcePoller::new(
                index,
                resource.clone(),
                self.opts.clone(),
                self.ctx.clone(),
                events_tx.clone(),
                shutdown_tx.subscribe(),
            );
            pollers.spawn(poller.run());
        }
        // Pollers hold the only remaining senders; the channel closes
        // when the last one goes away
        drop(events_tx);

        let drive = aggregator::drive(events_rx, &board, self.opts.log);
        tokio::pin!(drive);
        let deadline = deadline_sleep(self.opts.timeout);
        tokio::pin!(deadline);

        let outcome = loop {
            tokio::select! {
                drive_outcome = &mut drive => {
                    match drive_outcome {
                        DriveOutcome::AllDone => break Ok(()),
                        DriveOutcome::ChannelClosed => {
                            break Err(WaitError::Internal {
                                reason: "resource pollers stopped before completion".to_string(),
                            });
                        }
                    }
                }
                _ = &mut deadline => {
                    break Err(WaitError::Timeout {
                        pending: board.pending(),
                    });
                }
                joined = pollers.join_next(), if !pollers.is_empty() => {
                    if let Some(Err(join_err)) = joined {
                        if join_err.is_panic() {
                            break Err(WaitError::Internal {
                                reason: format!("resource poller panicked: {join_err}"),
                            });
                        }
                    }
                }
            }
        };

        // Cancel everything still running; results of in-flight probes
        // are discarded, not awaited
        let _ = shutdown_tx.send(());
        let joined = tokio::time::timeout(shutdown::POLLER_JOIN_TIMEOUT, async {
            while pollers.join_next().await.is_some() {}
        })
        .await;
        if joined.is_err() {
            debug!("pollers did not all stop within the grace period; detaching");
            pollers.abort_all();
        }

        match &outcome {
            Ok(()) => debug!(elapsed_ms = started.elapsed().as_millis() as u64, "wait complete"),
            Err(e) => debug!(error = %e, "wait failed"),
        }

        outcome.map(|_| WaitSummary {
            elapsed: started.elapsed(),
            resources: self.resources.len(),
        })
    }
}

/// Sleep until the global deadline; never wakes when there is none
async fn deadline_sleep(timeout: Option<Duration>) {
    match timeout {
        Some(limit) => tokio::time::sleep(limit).await,
        None => std::future::pending().await,
    }
}

/// Wait for every resource in `opts` in one call
pub async fn wait_for(opts: WaitOptions) -> Result<WaitSummary> {
    Waiter::new(opts)?.run().await
}
