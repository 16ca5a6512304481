//! Error types for waitup
//!
//! Two error domains cross the public boundary: configuration problems,
//! which are raised synchronously before any polling starts, and run
//! failures (the global deadline firing, or an unexpected runtime fault).
//! Probe-level I/O failures are deliberately absent here: a refused
//! connection or a missing file is "not yet available", observable only
//! through debug logging, never an error.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration and validation errors
///
/// All variants are detected before the first probe is dispatched.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No resources were supplied
    #[error("`resources` is required: provide at least one resource to wait for")]
    ResourcesRequired,

    /// `simultaneous` must allow at least one in-flight probe
    #[error("`simultaneous` must be at least 1, got {value}")]
    SimultaneousZero { value: usize },

    /// A resource string could not be classified or its payload is invalid
    #[error("invalid resource `{raw}`: {reason}")]
    InvalidResource { raw: String, reason: String },

    /// A duration string did not match the `<number>[ms|s|m|h]` grammar
    #[error("invalid duration `{input}`: expected a number with an optional ms/s/m/h suffix")]
    InvalidDuration { input: String },

    /// The config file given to `--config` does not exist
    #[error("config file not found: {path}")]
    ConfigFileNotFound { path: PathBuf },

    /// The config file could not be read
    #[error("failed to read config file {path}")]
    ConfigFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected shape
    #[error("failed to parse config file {path}")]
    ConfigFileParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// TLS material (ca/cert/key) could not be read or parsed
    #[error("failed to load TLS material from {path}: {reason}")]
    TlsMaterial { path: PathBuf, reason: String },

    /// The proxy URL was rejected by the HTTP client
    #[error("invalid proxy URL `{url}`: {reason}")]
    InvalidProxy { url: String, reason: String },

    /// A custom header name or value is malformed
    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The HTTP client could not be constructed from the options
    #[error("failed to build HTTP client: {reason}")]
    HttpClient { reason: String },
}

/// Terminal errors delivered by a wait run
#[derive(Error, Debug)]
pub enum WaitError {
    /// Options failed validation; raised synchronously
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The global deadline elapsed with resources still pending
    ///
    /// The message prefix is stable; callers and tests match on it.
    #[error("Timed out waiting for: {}", pending.join(", "))]
    Timeout { pending: Vec<String> },

    /// The run was interrupted before completing (Ctrl-C in the CLI)
    #[error("interrupted before all resources were ready")]
    Interrupted,

    /// Unexpected runtime failure (a poller task panicked)
    #[error("internal failure: {reason}")]
    Internal { reason: String },
}

impl WaitError {
    /// True when the failure is the deadline firing rather than bad input
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, WaitError>;

/// Config-phase result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
