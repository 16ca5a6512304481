//! Resource descriptors and the resource string parser
//!
//! A resource string classifies into one of seven kinds: a filesystem
//! path, an HTTP(S) endpoint probed with HEAD or GET, a TCP endpoint, a
//! Unix domain socket, or an HTTP request carried over a Unix socket.
//! Descriptors are parsed once at startup and are immutable for the run.
//!
//! Classification rules, applied in order:
//!
//! 1. A known scheme prefix (`https-get:`, `http-get:`, `https:`, `http:`,
//!    `tcp:`, `socket:`, `file:`) selects the kind; anything else is a
//!    bare file path.
//! 2. HTTP(S) strings of the shape `http(s)[-get]://unix:<sock>:<path>`
//!    direct the request over the Unix socket at `<sock>`.
//! 3. `tcp:` payloads are `[host:]port`; the host defaults to `localhost`.
//!
//! A malformed `tcp:` payload is deliberately not a configuration error:
//! it parses to an endpoint that can never connect, so reverse-mode runs
//! that wait for an unreachable host keep working. A malformed HTTP URL,
//! by contrast, is rejected up front.

use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::errors::{ConfigError, ConfigResult};

/// Request method for HTTP probes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Lightweight existence check (default)
    Head,
    /// Full GET, for servers that reject HEAD
    Get,
}

impl HttpMethod {
    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Head => "HEAD",
            HttpMethod::Get => "GET",
        }
    }
}

/// A TCP endpoint extracted from a `tcp:` resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpEndpoint {
    pub host: String,
    pub port: u16,
}

/// An HTTP(S) probe target
#[derive(Debug, Clone)]
pub struct HttpTarget {
    pub url: Url,
    pub method: HttpMethod,
}

/// An HTTP request directed over a Unix domain socket
#[derive(Debug, Clone)]
pub struct HttpUnixTarget {
    pub socket_path: PathBuf,
    pub url_path: String,
    pub method: HttpMethod,
}

/// Kind-specific payload of a resource
#[derive(Debug, Clone)]
pub enum ResourceTarget {
    /// Filesystem path probed with stat
    File(PathBuf),
    /// HTTP(S) endpoint
    Http(HttpTarget),
    /// TCP endpoint; `None` marks a malformed payload that never connects
    Tcp(Option<TcpEndpoint>),
    /// Unix domain socket probed by connecting
    Socket(PathBuf),
    /// HTTP over a Unix domain socket
    HttpUnix(HttpUnixTarget),
}

/// Resource kind tags, HTTPS folded into HTTP by scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    HttpHead,
    HttpGet,
    Tcp,
    Socket,
    HttpUnixHead,
    HttpUnixGet,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::File => "file",
            ResourceKind::HttpHead => "http-head",
            ResourceKind::HttpGet => "http-get",
            ResourceKind::Tcp => "tcp",
            ResourceKind::Socket => "socket",
            ResourceKind::HttpUnixHead => "http-unix-head",
            ResourceKind::HttpUnixGet => "http-unix-get",
        };
        f.write_str(name)
    }
}

/// An immutable resource descriptor, created once per input string
#[derive(Debug, Clone)]
pub struct Resource {
    raw: String,
    target: ResourceTarget,
}

impl Resource {
    /// Parse a resource string into a descriptor
    pub fn parse(raw: &str) -> ConfigResult<Self> {
        let target = if let Some(rest) = raw.strip_prefix("https-get:") {
            parse_http(raw, &format!("https:{rest}"), HttpMethod::Get)?
        } else if let Some(rest) = raw.strip_prefix("http-get:") {
            parse_http(raw, &format!("http:{rest}"), HttpMethod::Get)?
        } else if raw.starts_with("https:") || raw.starts_with("http:") {
            parse_http(raw, raw, HttpMethod::Head)?
        } else if let Some(rest) = raw.strip_prefix("tcp:") {
            ResourceTarget::Tcp(parse_tcp_payload(rest))
        } else if let Some(rest) = raw.strip_prefix("socket:") {
            ResourceTarget::Socket(PathBuf::from(rest))
        } else if let Some(rest) = raw.strip_prefix("file:") {
            ResourceTarget::File(PathBuf::from(rest))
        } else {
            ResourceTarget::File(PathBuf::from(raw))
        };

        Ok(Self {
            raw: raw.to_string(),
            target,
        })
    }

    /// The original resource string
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Kind-specific payload
    pub fn target(&self) -> &ResourceTarget {
        &self.target
    }

    /// Kind tag for logging and dispatch
    pub fn kind(&self) -> ResourceKind {
        match &self.target {
            ResourceTarget::File(_) => ResourceKind::File,
            ResourceTarget::Http(t) => match t.method {
                HttpMethod::Head => ResourceKind::HttpHead,
                HttpMethod::Get => ResourceKind::HttpGet,
            },
            ResourceTarget::Tcp(_) => ResourceKind::Tcp,
            ResourceTarget::Socket(_) => ResourceKind::Socket,
            ResourceTarget::HttpUnix(t) => match t.method {
                HttpMethod::Head => ResourceKind::HttpUnixHead,
                HttpMethod::Get => ResourceKind::HttpUnixGet,
            },
        }
    }

    /// True for the file kind, which uses the stability window
    pub fn is_file(&self) -> bool {
        matches!(self.target, ResourceTarget::File(_))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse an HTTP(S) resource, detecting the Unix-socket transport form
fn parse_http(raw: &str, url_str: &str, method: HttpMethod) -> ConfigResult<ResourceTarget> {
    if let Some(unix) = parse_http_unix(url_str, method) {
        return Ok(ResourceTarget::HttpUnix(unix));
    }

    let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidResource {
        raw: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidResource {
            raw: raw.to_string(),
            reason: "URL has no host".to_string(),
        });
    }

    Ok(ResourceTarget::Http(HttpTarget { url, method }))
}

/// Match `http(s)://unix:<socketPath>:<urlPath>`
fn parse_http_unix(url_str: &str, method: HttpMethod) -> Option<HttpUnixTarget> {
    let rest = url_str
        .strip_prefix("http://unix:")
        .or_else(|| url_str.strip_prefix("https://unix:"))?;

    let (socket_path, url_path) = rest.split_once(':')?;
    if socket_path.is_empty() || url_path.is_empty() {
        return None;
    }

    Some(HttpUnixTarget {
        socket_path: PathBuf::from(socket_path),
        url_path: url_path.to_string(),
        method,
    })
}

/// Parse a `tcp:` payload of the shape `[host:]port`
///
/// Returns `None` for anything that does not fit, including port
/// overflow. The caller treats that endpoint as never connectable.
fn parse_tcp_payload(payload: &str) -> Option<TcpEndpoint> {
    let (host, port_str) = match payload.rsplit_once(':') {
        Some((host, port)) => (host, port),
        None => ("", payload),
    };

    if port_str.is_empty() || !port_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let port: u16 = port_str.parse().ok()?;

    // Host segment must not itself contain a colon
    if host.contains(':') {
        return None;
    }

    let host = if host.is_empty() {
        "localhost".to_string()
    } else {
        host.to_string()
    };

    Some(TcpEndpoint { host, port })
}
