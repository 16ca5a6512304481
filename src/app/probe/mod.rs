//! Availability probes
//!
//! One probe is a single round-trip check of a single resource. Probes
//! are stateless; all cross-probe state (stability tracking, done
//! latching) lives in the poller. Probe-level I/O failures are never
//! errors; they surface as an unavailable outcome and a debug log line.
//!
//! The file probe reports the observed byte size instead of a plain
//! boolean because the poller's stability window needs the value.

pub mod file;
pub mod http;
pub mod socket;
pub mod tcp;

use reqwest::Client;

use super::options::{BasicAuth, StatusValidator, WaitOptions};
use super::resource::{Resource, ResourceTarget};
use crate::app::client::build_http_client;
use crate::errors::ConfigResult;

/// Outcome of one probe invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeReport {
    /// Non-file kinds: was the resource reachable this cycle
    Availability(bool),
    /// File kind: observed byte size, `None` when the stat failed
    FileSize(Option<u64>),
}

/// Shared, read-only context threaded into every probe
#[derive(Debug, Clone)]
pub struct ProbeContext {
    /// Shared HTTP client (connection pool, TLS, redirects, timeout)
    pub client: Client,
    /// Per-TCP-connect timeout
    pub tcp_timeout: std::time::Duration,
    /// Per-HTTP-request timeout, applied manually on the Unix transport
    pub http_timeout: Option<std::time::Duration>,
    /// Basic-auth credentials for HTTP probes
    pub auth: Option<BasicAuth>,
    /// Custom headers, re-applied by hand on the Unix transport
    pub headers: Vec<(String, String)>,
    /// Status predicate in effect for this run
    pub validator: StatusValidator,
}

impl ProbeContext {
    /// Build the probe context from validated options
    ///
    /// Constructs the shared HTTP client; TLS or proxy problems surface
    /// here, synchronously.
    pub fn from_options(opts: &WaitOptions) -> ConfigResult<Self> {
        Ok(Self {
            client: build_http_client(opts)?,
            tcp_timeout: opts.tcp_timeout,
            http_timeout: opts.http_timeout,
            auth: opts.auth.clone(),
            headers: opts.headers.clone(),
            validator: opts.status_validator(),
        })
    }
}

/// Run one probe of the given resource
pub async fn dispatch(resource: &Resource, ctx: &ProbeContext) -> ProbeReport {
    match resource.target() {
        ResourceTarget::File(path) => ProbeReport::FileSize(file::stat_size(path).await),
        ResourceTarget::Http(target) => ProbeReport::Availability(http::check(ctx, target).await),
        ResourceTarget::Tcp(Some(endpoint)) => {
            ProbeReport::Availability(tcp::check(endpoint, ctx.tcp_timeout).await)
        }
        // Malformed payload: never connectable
        ResourceTarget::Tcp(None) => ProbeReport::Availability(false),
        ResourceTarget::Socket(path) => ProbeReport::Availability(socket::check(path).await),
        ResourceTarget::HttpUnix(target) => {
            ProbeReport::Availability(socket::check_http(ctx, target).await)
        }
    }
}
