//! Core availability engine
//!
//! The engine is a resource-typed polling fabric: every resource gets
//! its own poller task driving stateless probes on an independent
//! cadence, the aggregator folds per-resource completion into a single
//! all-done signal, and the waiter races that signal against the global
//! deadline with cooperative cancellation of the loser.
//!
//! Module map:
//!
//! - [`resource`] - resource string classification and descriptors
//! - [`options`] - run options, validation, and normalization
//! - [`client`] - shared HTTP client construction
//! - [`probe`] - the four availability checks (file, HTTP, TCP, socket)
//! - [`poller`] - per-resource state machine and stability window
//! - [`aggregator`] - completion fan-in and progress reporting
//! - [`waiter`] - orchestration, deadline, and cancellation

pub mod aggregator;
pub mod client;
pub mod options;
pub mod poller;
pub mod probe;
pub mod resource;
pub mod waiter;

pub use aggregator::StatusBoard;
pub use options::{BasicAuth, StatusValidator, WaitOptions};
pub use poller::{FileStability, ResourceEvent, ResourcePoller};
pub use probe::{ProbeContext, ProbeReport};
pub use resource::{
    HttpMethod, HttpTarget, HttpUnixTarget, Resource, ResourceKind, ResourceTarget, TcpEndpoint,
};
pub use waiter::{wait_for, WaitSummary, Waiter};
