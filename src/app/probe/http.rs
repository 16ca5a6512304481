//! HTTP(S) probe
//!
//! Issues one request with the configured method through the shared
//! client (which carries the timeout, redirect policy, TLS settings,
//! proxy, and default headers). Success is the status predicate
//! accepting the response code; transport failures of any kind are
//! unavailable.

use tracing::debug;

use super::ProbeContext;
use crate::app::resource::{HttpMethod, HttpTarget};

/// Issue one HTTP request and evaluate the status predicate
pub async fn check(ctx: &ProbeContext, target: &HttpTarget) -> bool {
    let request = match target.method {
        HttpMethod::Head => ctx.client.head(target.url.clone()),
        HttpMethod::Get => ctx.client.get(target.url.clone()),
    };

    let request = match &ctx.auth {
        Some(auth) => request.basic_auth(&auth.username, auth.password.as_deref()),
        None => request,
    };

    match request.send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            let accepted = ctx.validator.accepts(status);
            if !accepted {
                debug!(url = %target.url, status, "http probe: status rejected");
            }
            accepted
        }
        Err(e) => {
            debug!(url = %target.url, error = %e, "http probe: request failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::options::WaitOptions;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on an ephemeral port, returning
    /// the bound port
    async fn serve_once(response: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });
        port
    }

    fn test_ctx() -> ProbeContext {
        ProbeContext::from_options(
            &WaitOptions::new(["http://localhost"])
                .with_http_timeout(Duration::from_secs(2)),
        )
        .unwrap()
    }

    /// Test that a 200 response is available under the default predicate
    #[tokio::test]
    async fn test_200_available() {
        let port = serve_once("HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n").await;
        let target = HttpTarget {
            url: format!("http://127.0.0.1:{port}/").parse().unwrap(),
            method: HttpMethod::Get,
        };
        assert!(check(&test_ctx(), &target).await);
    }

    /// Test that a 404 response is unavailable
    #[tokio::test]
    async fn test_404_unavailable() {
        let port = serve_once("HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n").await;
        let target = HttpTarget {
            url: format!("http://127.0.0.1:{port}/").parse().unwrap(),
            method: HttpMethod::Get,
        };
        assert!(!check(&test_ctx(), &target).await);
    }

    /// Test that a refused connection is unavailable, not an error
    #[tokio::test]
    async fn test_connection_refused_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let target = HttpTarget {
            url: format!("http://127.0.0.1:{port}/").parse().unwrap(),
            method: HttpMethod::Head,
        };
        assert!(!check(&test_ctx(), &target).await);
    }

    /// Test that a custom predicate decides availability
    #[tokio::test]
    async fn test_custom_predicate_decides() {
        use crate::app::options::StatusValidator;

        let port = serve_once("HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n").await;
        let mut ctx = test_ctx();
        ctx.validator = StatusValidator::new(|s| s == 404);

        let target = HttpTarget {
            url: format!("http://127.0.0.1:{port}/").parse().unwrap(),
            method: HttpMethod::Get,
        };
        assert!(check(&ctx, &target).await);
    }
}
