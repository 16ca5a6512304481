//! Completion aggregation across resources
//!
//! Every poller feeds its latched events into one mpsc channel; the
//! aggregator folds them into a shared status board and completes when
//! every resource is done. The board stays readable from outside the
//! fold loop so the deadline can snapshot the pending set at the moment
//! it fires.
//!
//! The done count is monotonic: a resource that latched done is never
//! reverted, whatever arrives afterwards.

use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::info;

use super::poller::ResourceEvent;

/// Shared latest-state snapshot of every resource in the run
#[derive(Debug)]
pub struct StatusBoard {
    names: Vec<String>,
    states: Mutex<Vec<bool>>,
}

impl StatusBoard {
    /// Create a board with every resource pending
    pub fn new(names: Vec<String>) -> Self {
        let states = Mutex::new(vec![false; names.len()]);
        Self { names, states }
    }

    /// Number of resources tracked
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the run tracks no resources
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Fold one event in; returns true when the state changed
    ///
    /// Done latches: a false arriving after true is ignored.
    pub fn mark(&self, index: usize, done: bool) -> bool {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        match states.get_mut(index) {
            Some(state) if !*state && done => {
                *state = true;
                true
            }
            _ => false,
        }
    }

    /// True when every resource is done
    pub fn all_done(&self) -> bool {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.iter().all(|&done| done)
    }

    /// Count of resources already done
    pub fn done_count(&self) -> usize {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.iter().filter(|&&done| done).count()
    }

    /// Names of the resources still pending, in input order
    pub fn pending(&self) -> Vec<String> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        self.names
            .iter()
            .zip(states.iter())
            .filter(|(_, &done)| !done)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Why the fold loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// Every resource latched done
    AllDone,
    /// The event channel closed with resources still pending; some
    /// poller went away without finishing
    ChannelClosed,
}

/// Fold poller events into the board until every resource is done
///
/// When `log_progress` is set, a `waiting for …` line is emitted once
/// all pollers have announced themselves and again on every completion
/// while resources remain pending.
pub async fn drive(
    mut events_rx: mpsc::Receiver<ResourceEvent>,
    board: &StatusBoard,
    log_progress: bool,
) -> DriveOutcome {
    let mut announced = 0usize;

    while let Some(event) = events_rx.recv().await {
        if !event.done {
            announced += 1;
            // First full snapshot: every poller has reported in
            if log_progress && announced == board.len() && !board.all_done() {
                log_pending(board);
            }
            continue;
        }

        let changed = board.mark(event.index, event.done);
        if board.all_done() {
            return DriveOutcome::AllDone;
        }
        if changed && log_progress {
            log_pending(board);
        }
    }

    if board.all_done() {
        DriveOutcome::AllDone
    } else {
        DriveOutcome::ChannelClosed
    }
}

fn log_pending(board: &StatusBoard) {
    let pending = board.pending();
    info!(
        "waiting for {} resources: {}",
        pending.len(),
        pending.join(", ")
    );
}
