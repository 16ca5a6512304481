//! TCP probe: a bounded connect
//!
//! Any of connect refusal, timeout, or an unresolvable host counts as
//! unavailable. The connection is closed immediately on success; only
//! reachability is being measured.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::app::resource::TcpEndpoint;

/// Attempt one TCP connect within `tcp_timeout`
pub async fn check(endpoint: &TcpEndpoint, tcp_timeout: Duration) -> bool {
    let addr = (endpoint.host.as_str(), endpoint.port);
    match timeout(tcp_timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            debug!(
                host = %endpoint.host,
                port = endpoint.port,
                error = %e,
                "tcp probe: connect failed"
            );
            false
        }
        Err(_) => {
            debug!(
                host = %endpoint.host,
                port = endpoint.port,
                timeout_ms = tcp_timeout.as_millis() as u64,
                "tcp probe: connect timed out"
            );
            false
        }
    }
}
