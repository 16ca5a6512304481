//! Application constants for waitup
//!
//! Centralizes the defaults and tuning knobs used throughout the crate,
//! organized by functional domain.

use std::time::Duration;

/// Option defaults, overridable per run
pub mod defaults {
    use super::Duration;

    /// Delay before the first probe of every resource
    pub const DELAY: Duration = Duration::ZERO;

    /// Poll period between successive probes of one resource
    pub const INTERVAL: Duration = Duration::from_millis(250);

    /// File-size stability window
    pub const WINDOW: Duration = Duration::from_millis(750);

    /// Per-TCP-connect timeout
    pub const TCP_TIMEOUT: Duration = Duration::from_millis(300);

    /// Upper bound on in-flight probes per resource (effectively unbounded)
    pub const SIMULTANEOUS: usize = usize::MAX;
}

/// HTTP client configuration
pub mod http {
    /// User agent sent on every HTTP probe
    pub const USER_AGENT: &str = concat!("waitup/", env!("CARGO_PKG_VERSION"));

    /// Maximum redirects followed when `followRedirect` is enabled
    pub const MAX_REDIRECTS: usize = 10;

    /// Host header value used for HTTP-over-Unix requests
    pub const UNIX_HOST_HEADER: &str = "localhost";

    /// Cap on the status-line read from a Unix-socket HTTP response
    pub const UNIX_RESPONSE_HEAD_LIMIT: usize = 8 * 1024;
}

/// Polling machinery
pub mod poll {
    use super::Duration;

    /// Smallest honored poll period; a zero interval clamps to this
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Buffer size of the per-poller probe result channel
    pub const PROBE_CHANNEL_CAPACITY: usize = 16;

    /// Buffer size of the resource event channel feeding the aggregator
    pub const EVENT_CHANNEL_CAPACITY: usize = 64;
}

/// Shutdown and cancellation
pub mod shutdown {
    use super::Duration;

    /// Grace period for pollers to acknowledge cancellation before the
    /// run result is returned anyway
    pub const POLLER_JOIN_TIMEOUT: Duration = Duration::from_secs(1);
}
