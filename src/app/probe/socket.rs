//! Unix domain socket probes
//!
//! Two checks live here: plain reachability (connect and close) and the
//! HTTP-over-Unix transport, where a minimal HTTP/1.1 request is written
//! over the socket and the response status line is parsed by hand,
//! since the shared HTTP client cannot drive a Unix socket.
//!
//! On non-Unix platforms both probes report unavailable.

#[cfg(unix)]
use std::io;
use std::path::Path;

#[cfg(unix)]
use base64::{engine::general_purpose, Engine as _};
#[cfg(unix)]
use tokio::io::{AsyncReadExt, AsyncWriteExt};
#[cfg(unix)]
use tokio::net::UnixStream;
use tracing::debug;

use super::ProbeContext;
use crate::app::resource::HttpUnixTarget;
#[cfg(unix)]
use crate::constants::http;

/// Attempt one connect to the Unix socket at `path`
#[cfg(unix)]
pub async fn check(path: &Path) -> bool {
    match UnixStream::connect(path).await {
        Ok(_stream) => true,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "socket probe: connect failed");
            false
        }
    }
}

#[cfg(not(unix))]
pub async fn check(path: &Path) -> bool {
    debug!(path = %path.display(), "socket probe: unix sockets unsupported on this platform");
    false
}

/// Issue one HTTP request over the Unix socket and evaluate the status
/// predicate
#[cfg(unix)]
pub async fn check_http(ctx: &ProbeContext, target: &HttpUnixTarget) -> bool {
    let exchange = request_status(ctx, target);
    let result = match ctx.http_timeout {
        Some(limit) => match tokio::time::timeout(limit, exchange).await {
            Ok(result) => result,
            Err(_) => {
                debug!(
                    socket = %target.socket_path.display(),
                    path = %target.url_path,
                    "unix http probe: timed out"
                );
                return false;
            }
        },
        None => exchange.await,
    };

    match result {
        Ok(status) => {
            let accepted = ctx.validator.accepts(status);
            if !accepted {
                debug!(
                    socket = %target.socket_path.display(),
                    path = %target.url_path,
                    status,
                    "unix http probe: status rejected"
                );
            }
            accepted
        }
        Err(e) => {
            debug!(
                socket = %target.socket_path.display(),
                path = %target.url_path,
                error = %e,
                "unix http probe: request failed"
            );
            false
        }
    }
}

#[cfg(not(unix))]
pub async fn check_http(_ctx: &ProbeContext, target: &HttpUnixTarget) -> bool {
    debug!(
        socket = %target.socket_path.display(),
        "unix http probe: unix sockets unsupported on this platform"
    );
    false
}

/// Write the request and read back the response status code
#[cfg(unix)]
async fn request_status(ctx: &ProbeContext, target: &HttpUnixTarget) -> io::Result<u16> {
    let mut stream = UnixStream::connect(&target.socket_path).await?;

    let mut request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nConnection: close\r\n",
        target.method.as_str(),
        target.url_path,
        http::UNIX_HOST_HEADER,
        http::USER_AGENT,
    );
    for (name, value) in &ctx.headers {
        request.push_str(name);
        request.push_str(": ");
        request.push_str(value);
        request.push_str("\r\n");
    }
    if let Some(auth) = &ctx.auth {
        let credentials = format!(
            "{}:{}",
            auth.username,
            auth.password.as_deref().unwrap_or("")
        );
        request.push_str("Authorization: Basic ");
        request.push_str(&general_purpose::STANDARD.encode(credentials));
        request.push_str("\r\n");
    }
    request.push_str("\r\n");

    stream.write_all(request.as_bytes()).await?;

    let mut head = Vec::with_capacity(256);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        head.extend_from_slice(&chunk[..n]);
        if head.windows(2).any(|w| w == b"\r\n") {
            break;
        }
        if head.len() > http::UNIX_RESPONSE_HEAD_LIMIT {
            break;
        }
    }

    parse_status_line(&head)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "malformed HTTP status line"))
}

/// Extract the status code from an HTTP/1.x status line
fn parse_status_line(head: &[u8]) -> Option<u16> {
    let line_end = head.windows(2).position(|w| w == b"\r\n")?;
    let line = std::str::from_utf8(&head[..line_end]).ok()?;

    let mut parts = line.split_whitespace();
    let version = parts.next()?;
    if !version.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
