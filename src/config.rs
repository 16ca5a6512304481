//! Config file support
//!
//! `--config` points at a TOML file carrying the same options as the
//! command line, with durations written in the CLI grammar
//! (`250ms`, `5s`, `1m`, `1h`, or a bare millisecond count). Command-line
//! positional resources and flags override what the file provides.
//!
//! The `validateStatus` predicate is code, not data, and has no config
//! file representation; it is available on the programmatic API only.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::app::options::{BasicAuth, WaitOptions};
use crate::errors::{ConfigError, ConfigResult};

/// Parse a duration in the CLI grammar: `<number>[ms|s|m|h]`
///
/// The suffix is case-insensitive; no suffix means milliseconds.
/// Fractional values are floored to whole milliseconds.
pub fn parse_duration(input: &str) -> ConfigResult<Duration> {
    let invalid = || ConfigError::InvalidDuration {
        input: input.to_string(),
    };

    let lower = input.to_ascii_lowercase();
    let (number, multiplier) = if let Some(n) = lower.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = lower.strip_suffix('s') {
        (n, 1000.0)
    } else if let Some(n) = lower.strip_suffix('m') {
        (n, 60_000.0)
    } else if let Some(n) = lower.strip_suffix('h') {
        (n, 3_600_000.0)
    } else {
        (lower.as_str(), 1.0)
    };

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(invalid());
    }
    let value: f64 = number.parse().map_err(|_| invalid())?;

    Ok(Duration::from_millis((value * multiplier).floor() as u64))
}

/// Basic-auth section of the config file
#[derive(Debug, Clone, Deserialize)]
pub struct FileAuth {
    pub username: String,
    pub password: Option<String>,
}

/// TOML shape of a waitup config file
///
/// Every field is optional; anything absent keeps its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FileConfig {
    pub resources: Option<Vec<String>>,
    pub delay: Option<String>,
    pub interval: Option<String>,
    pub window: Option<String>,
    pub timeout: Option<String>,
    pub http_timeout: Option<String>,
    pub tcp_timeout: Option<String>,
    pub simultaneous: Option<usize>,
    pub reverse: Option<bool>,
    pub log: Option<bool>,
    pub verbose: Option<bool>,
    pub follow_redirect: Option<bool>,
    #[serde(rename = "strictSSL")]
    pub strict_ssl: Option<bool>,
    pub ca: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub passphrase: Option<String>,
    pub proxy: Option<String>,
    pub auth: Option<FileAuth>,
    pub headers: Option<BTreeMap<String, String>>,
}

impl FileConfig {
    /// Load and parse a config file; an explicit missing path is an
    /// error, never silently ignored
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigFileParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Convert the file shape into run options, parsing duration strings
    pub fn into_options(self) -> ConfigResult<WaitOptions> {
        let mut opts = WaitOptions::default();

        if let Some(resources) = self.resources {
            opts.resources = resources;
        }
        if let Some(ref delay) = self.delay {
            opts.delay = parse_duration(delay)?;
        }
        if let Some(ref interval) = self.interval {
            opts.interval = parse_duration(interval)?;
        }
        if let Some(ref window) = self.window {
            opts.window = parse_duration(window)?;
        }
        if let Some(ref timeout) = self.timeout {
            opts.timeout = Some(parse_duration(timeout)?);
        }
        if let Some(ref http_timeout) = self.http_timeout {
            opts.http_timeout = Some(parse_duration(http_timeout)?);
        }
        if let Some(ref tcp_timeout) = self.tcp_timeout {
            opts.tcp_timeout = parse_duration(tcp_timeout)?;
        }
        if let Some(simultaneous) = self.simultaneous {
            opts.simultaneous = simultaneous;
        }
        if let Some(reverse) = self.reverse {
            opts.reverse = reverse;
        }
        if let Some(log) = self.log {
            opts.log = log;
        }
        if let Some(verbose) = self.verbose {
            opts.verbose = verbose;
        }
        if let Some(follow_redirect) = self.follow_redirect {
            opts.follow_redirect = follow_redirect;
        }
        if let Some(strict_ssl) = self.strict_ssl {
            opts.strict_ssl = strict_ssl;
        }
        opts.ca = self.ca;
        opts.cert = self.cert;
        opts.key = self.key;
        opts.passphrase = self.passphrase;
        opts.proxy = self.proxy;
        opts.auth = self.auth.map(|auth| BasicAuth {
            username: auth.username,
            password: auth.password,
        });
        if let Some(headers) = self.headers {
            opts.headers = headers.into_iter().collect();
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Test the duration grammar across every suffix
    #[test]
    fn test_parse_duration_suffixes() {
        assert_eq!(parse_duration("250").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    /// Test case-insensitive suffixes and fractional flooring
    #[test]
    fn test_parse_duration_case_and_fractions() {
        assert_eq!(parse_duration("250MS").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("1.5S").unwrap(), Duration::from_millis(1500));
        // Fractional milliseconds floor to whole ones
        assert_eq!(parse_duration("1.9").unwrap(), Duration::from_millis(1));
        assert_eq!(parse_duration("0.5s").unwrap(), Duration::from_millis(500));
    }

    /// Test that malformed durations are rejected
    #[test]
    fn test_parse_duration_rejects_garbage() {
        for bad in ["", "ms", "s", "abc", "-5", "1x", "1.2.3", "5 s"] {
            assert!(parse_duration(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    /// Test loading a full config file
    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("waitup.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
resources = ["tcp:5432", "http://localhost:3000/health"]
delay = "1s"
interval = "100ms"
window = "1s"
timeout = "30s"
httpTimeout = "70ms"
tcpTimeout = "1s"
simultaneous = 2
reverse = true
log = true
followRedirect = false
strictSSL = true

[auth]
username = "ci"
password = "secret"

[headers]
x-token = "abc"
"#
        )
        .unwrap();

        let opts = FileConfig::load(&path).unwrap().into_options().unwrap();
        assert_eq!(opts.resources.len(), 2);
        assert_eq!(opts.delay, Duration::from_secs(1));
        assert_eq!(opts.interval, Duration::from_millis(100));
        assert_eq!(opts.timeout, Some(Duration::from_secs(30)));
        assert_eq!(opts.http_timeout, Some(Duration::from_millis(70)));
        assert_eq!(opts.tcp_timeout, Duration::from_secs(1));
        assert_eq!(opts.simultaneous, 2);
        assert!(opts.reverse);
        assert!(opts.log);
        assert!(!opts.follow_redirect);
        assert!(opts.strict_ssl);
        assert_eq!(opts.auth.as_ref().unwrap().username, "ci");
        assert_eq!(opts.headers, vec![("x-token".to_string(), "abc".to_string())]);
    }

    /// Test that an explicitly named missing file is an error
    #[test]
    fn test_missing_config_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = FileConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileNotFound { .. }));
    }

    /// Test that a bad duration inside the file is surfaced
    #[test]
    fn test_bad_duration_in_config() {
        let config = FileConfig {
            interval: Some("fast".into()),
            ..Default::default()
        };
        assert!(config.into_options().is_err());
    }

    /// Test that unknown keys are rejected rather than ignored
    #[test]
    fn test_unknown_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("waitup.toml");
        std::fs::write(&path, "intervall = \"250ms\"\n").unwrap();

        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigFileParse { .. }));
    }
}
