//! HTTP client construction for HTTP(S) probes
//!
//! One `reqwest::Client` is built per run from the validated options and
//! shared by every HTTP poller. TLS material is loaded from PEM files at
//! build time so a bad path or bad bundle fails the run synchronously,
//! before any polling starts.

use std::fs;
use std::path::Path;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Certificate, Client, Identity, Proxy};
use tracing::warn;

use super::options::WaitOptions;
use crate::constants::http;
use crate::errors::{ConfigError, ConfigResult};

/// Build the shared probe client from the run options
pub fn build_http_client(opts: &WaitOptions) -> ConfigResult<Client> {
    let redirect_policy = if opts.follow_redirect {
        Policy::limited(http::MAX_REDIRECTS)
    } else {
        Policy::none()
    };

    let mut builder = Client::builder()
        .user_agent(http::USER_AGENT)
        .redirect(redirect_policy)
        .danger_accept_invalid_certs(!opts.strict_ssl);

    if let Some(timeout) = opts.http_timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(ref ca_path) = opts.ca {
        builder = builder.add_root_certificate(load_ca(ca_path)?);
    }

    if let Some(identity) = load_identity(opts)? {
        builder = builder.identity(identity);
    }

    if let Some(ref proxy_url) = opts.proxy {
        let proxy = Proxy::all(proxy_url).map_err(|e| ConfigError::InvalidProxy {
            url: proxy_url.clone(),
            reason: e.to_string(),
        })?;
        builder = builder.proxy(proxy);
    }

    if !opts.headers.is_empty() {
        builder = builder.default_headers(build_header_map(&opts.headers)?);
    }

    builder.build().map_err(|e| ConfigError::HttpClient {
        reason: e.to_string(),
    })
}

/// Load an extra root CA bundle from a PEM file
fn load_ca(path: &Path) -> ConfigResult<Certificate> {
    let pem = fs::read(path).map_err(|e| ConfigError::TlsMaterial {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Certificate::from_pem(&pem).map_err(|e| ConfigError::TlsMaterial {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load the client identity from the cert/key PEM pair, if configured
fn load_identity(opts: &WaitOptions) -> ConfigResult<Option<Identity>> {
    let (cert_path, key_path) = match (&opts.cert, &opts.key) {
        (Some(cert), Some(key)) => (cert, key),
        (None, None) => return Ok(None),
        (Some(present), None) | (None, Some(present)) => {
            return Err(ConfigError::TlsMaterial {
                path: present.clone(),
                reason: "client identity needs both `cert` and `key`".to_string(),
            });
        }
    };

    if opts.passphrase.is_some() {
        // rustls loads only unencrypted PKCS#8; the passphrase cannot be
        // applied here
        warn!("`passphrase` is set but encrypted keys are not supported; provide an unencrypted key");
    }

    let mut pem = fs::read(cert_path).map_err(|e| ConfigError::TlsMaterial {
        path: cert_path.clone(),
        reason: e.to_string(),
    })?;
    let key = fs::read(key_path).map_err(|e| ConfigError::TlsMaterial {
        path: key_path.clone(),
        reason: e.to_string(),
    })?;
    pem.push(b'\n');
    pem.extend_from_slice(&key);

    Identity::from_pem(&pem)
        .map(Some)
        .map_err(|e| ConfigError::TlsMaterial {
            path: cert_path.clone(),
            reason: e.to_string(),
        })
}

/// Convert the configured header pairs into a reqwest header map
fn build_header_map(headers: &[(String, String)]) -> ConfigResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that a plain options set produces a client
    #[test]
    fn test_default_client_builds() {
        let opts = WaitOptions::new(["http://localhost"]);
        assert!(build_http_client(&opts).is_ok());
    }

    /// Test that a timeout and disabled redirects still build
    #[test]
    fn test_client_with_timeout_and_no_redirects() {
        let opts = WaitOptions {
            follow_redirect: false,
            ..WaitOptions::new(["http://localhost"])
                .with_http_timeout(std::time::Duration::from_millis(70))
        };
        assert!(build_http_client(&opts).is_ok());
    }

    /// Test that a missing CA bundle path fails synchronously
    #[test]
    fn test_missing_ca_fails() {
        let opts = WaitOptions {
            ca: Some("/nonexistent/ca.pem".into()),
            ..WaitOptions::new(["https://localhost"])
        };
        let err = build_http_client(&opts).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ca.pem"));
    }

    /// Test that cert without key is rejected
    #[test]
    fn test_cert_without_key_rejected() {
        let opts = WaitOptions {
            cert: Some("/tmp/cert.pem".into()),
            ..WaitOptions::new(["https://localhost"])
        };
        let err = build_http_client(&opts).unwrap_err();
        assert!(err.to_string().contains("cert"));
    }

    /// Test that a bad proxy URL is rejected
    #[test]
    fn test_invalid_proxy_rejected() {
        let opts = WaitOptions {
            proxy: Some("::not a url::".into()),
            ..WaitOptions::new(["http://localhost"])
        };
        assert!(build_http_client(&opts).is_err());
    }

    /// Test that malformed header names are rejected
    #[test]
    fn test_invalid_header_rejected() {
        let opts = WaitOptions {
            headers: vec![("bad header name".into(), "x".into())],
            ..WaitOptions::new(["http://localhost"])
        };
        assert!(build_http_client(&opts).is_err());

        let opts = WaitOptions {
            headers: vec![("x-token".into(), "abc".into())],
            ..WaitOptions::new(["http://localhost"])
        };
        assert!(build_http_client(&opts).is_ok());
    }
}
