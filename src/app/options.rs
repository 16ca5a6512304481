//! Wait options: defaults, validation, and normalization
//!
//! `WaitOptions` is the single input to a run. It is validated and
//! normalized once at entry and read-only afterwards. Validation rejects
//! structurally bad input (no resources, a zero `simultaneous` bound);
//! normalization applies the derived rules: the stability window is never
//! shorter than the poll interval, and `verbose` implies `log`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::defaults;
use crate::errors::{ConfigError, ConfigResult};

/// Basic-auth credentials applied to HTTP probes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

/// Shared predicate from HTTP status code to probe success
///
/// Wraps the user-supplied closure so the options struct stays `Clone`
/// and `Debug`.
#[derive(Clone)]
pub struct StatusValidator(Arc<dyn Fn(u16) -> bool + Send + Sync>);

impl StatusValidator {
    /// Wrap a predicate
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(u16) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Default policy: strict 2xx without redirect following, 2xx-3xx
    /// with it (the client auto-follows, so a surviving 3xx means the
    /// redirect cap was reached)
    pub fn default_for(follow_redirect: bool) -> Self {
        if follow_redirect {
            Self::new(|status| (200..400).contains(&status))
        } else {
            Self::new(|status| (200..300).contains(&status))
        }
    }

    /// Evaluate the predicate
    pub fn accepts(&self, status: u16) -> bool {
        (self.0)(status)
    }
}

impl fmt::Debug for StatusValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StatusValidator(..)")
    }
}

/// Options for a wait run
///
/// All fields have working defaults except `resources`, which must be
/// non-empty.
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Resource strings to wait on (see [`crate::app::Resource`])
    pub resources: Vec<String>,
    /// Delay before the first probe of every resource
    pub delay: Duration,
    /// Poll period between successive probes of one resource
    pub interval: Duration,
    /// File-size stability window; normalized to at least `interval`
    pub window: Duration,
    /// Global deadline; `None` waits forever
    pub timeout: Option<Duration>,
    /// Per-HTTP-request timeout
    pub http_timeout: Option<Duration>,
    /// Per-TCP-connect timeout
    pub tcp_timeout: Duration,
    /// Max in-flight probes per resource
    pub simultaneous: usize,
    /// Invert the success predicate: wait for unavailability
    pub reverse: bool,
    /// Emit progress lines while waiting
    pub log: bool,
    /// Emit per-probe debug detail; implies `log`
    pub verbose: bool,
    /// Follow HTTP redirects
    pub follow_redirect: bool,
    /// Verify TLS certificates
    pub strict_ssl: bool,
    /// Extra root CA bundle (PEM file)
    pub ca: Option<PathBuf>,
    /// Client certificate (PEM file)
    pub cert: Option<PathBuf>,
    /// Client private key (PEM file)
    pub key: Option<PathBuf>,
    /// Key passphrase; accepted for compatibility, unsupported by rustls
    pub passphrase: Option<String>,
    /// Proxy URL for HTTP probes
    pub proxy: Option<String>,
    /// Basic-auth credentials for HTTP probes
    pub auth: Option<BasicAuth>,
    /// Custom headers sent on every HTTP probe
    pub headers: Vec<(String, String)>,
    /// Custom status predicate; defaults per `follow_redirect`
    pub validate_status: Option<StatusValidator>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            delay: defaults::DELAY,
            interval: defaults::INTERVAL,
            window: defaults::WINDOW,
            timeout: None,
            http_timeout: None,
            tcp_timeout: defaults::TCP_TIMEOUT,
            simultaneous: defaults::SIMULTANEOUS,
            reverse: false,
            log: false,
            verbose: false,
            follow_redirect: true,
            strict_ssl: false,
            ca: None,
            cert: None,
            key: None,
            passphrase: None,
            proxy: None,
            auth: None,
            headers: Vec::new(),
            validate_status: None,
        }
    }
}

impl WaitOptions {
    /// Create options for the given resources with defaults elsewhere
    pub fn new<I, S>(resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            resources: resources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the poll interval
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the stability window
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set the global deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the delay before the first probe
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Enable or disable reverse mode
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Set the per-TCP-connect timeout
    pub fn with_tcp_timeout(mut self, timeout: Duration) -> Self {
        self.tcp_timeout = timeout;
        self
    }

    /// Set the per-HTTP-request timeout
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    /// Validate structural requirements
    pub fn validate(&self) -> ConfigResult<()> {
        if self.resources.is_empty() {
            return Err(ConfigError::ResourcesRequired);
        }
        if self.simultaneous < 1 {
            return Err(ConfigError::SimultaneousZero {
                value: self.simultaneous,
            });
        }
        Ok(())
    }

    /// Apply the derived rules, consuming self
    ///
    /// `window` is raised to at least `interval` so a file cannot be
    /// declared stable between two observations; `verbose` implies `log`.
    pub fn normalized(mut self) -> Self {
        self.window = self.window.max(self.interval);
        self.log = self.log || self.verbose;
        self
    }

    /// The status predicate in effect for this run
    pub fn status_validator(&self) -> StatusValidator {
        self.validate_status
            .clone()
            .unwrap_or_else(|| StatusValidator::default_for(self.follow_redirect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test that defaults match the documented values
    #[test]
    fn test_defaults() {
        let opts = WaitOptions::default();
        assert_eq!(opts.delay, Duration::ZERO);
        assert_eq!(opts.interval, Duration::from_millis(250));
        assert_eq!(opts.window, Duration::from_millis(750));
        assert_eq!(opts.tcp_timeout, Duration::from_millis(300));
        assert_eq!(opts.timeout, None);
        assert_eq!(opts.http_timeout, None);
        assert_eq!(opts.simultaneous, usize::MAX);
        assert!(!opts.reverse);
        assert!(opts.follow_redirect);
        assert!(!opts.strict_ssl);
    }

    /// Test that missing resources fail validation with the documented
    /// message
    #[test]
    fn test_empty_resources_rejected() {
        let opts = WaitOptions::default();
        let err = opts.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("resources"));
        assert!(msg.contains("required"));
    }

    /// Test the simultaneous lower bound
    #[test]
    fn test_simultaneous_zero_rejected() {
        let opts = WaitOptions {
            simultaneous: 0,
            ..WaitOptions::new(["tcp:80"])
        };
        assert!(opts.validate().is_err());

        let opts = WaitOptions {
            simultaneous: 1,
            ..WaitOptions::new(["tcp:80"])
        };
        assert!(opts.validate().is_ok());
    }

    /// Test window normalization against the interval
    #[test]
    fn test_window_raised_to_interval() {
        let opts = WaitOptions::new(["f"])
            .with_interval(Duration::from_millis(500))
            .with_window(Duration::from_millis(100))
            .normalized();
        assert_eq!(opts.window, Duration::from_millis(500));

        // A wider window is left alone
        let opts = WaitOptions::new(["f"])
            .with_interval(Duration::from_millis(100))
            .with_window(Duration::from_millis(900))
            .normalized();
        assert_eq!(opts.window, Duration::from_millis(900));
    }

    /// Test that verbose implies log after normalization
    #[test]
    fn test_verbose_implies_log() {
        let opts = WaitOptions {
            verbose: true,
            ..WaitOptions::new(["f"])
        }
        .normalized();
        assert!(opts.log);
    }

    /// Test the default status predicate in both redirect modes
    #[test]
    fn test_default_status_policy() {
        let strict = StatusValidator::default_for(false);
        assert!(strict.accepts(200));
        assert!(strict.accepts(299));
        assert!(!strict.accepts(301));
        assert!(!strict.accepts(404));

        let following = StatusValidator::default_for(true);
        assert!(following.accepts(200));
        assert!(following.accepts(302));
        assert!(!following.accepts(404));
    }

    /// Test that a custom predicate overrides the default
    #[test]
    fn test_custom_status_predicate() {
        let opts = WaitOptions {
            validate_status: Some(StatusValidator::new(|s| s == 418)),
            ..WaitOptions::new(["http://localhost"])
        };
        let validator = opts.status_validator();
        assert!(validator.accepts(418));
        assert!(!validator.accepts(200));
    }
}
