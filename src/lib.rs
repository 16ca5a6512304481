//! waitup
//!
//! A cross-platform synchronization gate: block until a set of
//! heterogeneous resources (files, HTTP(S) endpoints, TCP ports, Unix
//! domain sockets) all become available, then return; or fail with a
//! timeout error when the global deadline fires first. Reverse mode
//! inverts the predicate and waits for resources to go away. Built for
//! scripts and CI pipelines that need to gate on a service coming up or
//! a file settling on disk.
//!
//! # Key behaviors
//!
//! - **Independent cadence per resource** - every resource is polled on
//!   its own interval, with an optional start delay and a bound on
//!   in-flight probes
//! - **File stability window** - a file is ready only after holding one
//!   size for the whole window, so half-written files never pass
//! - **Single terminal outcome** - completion and the deadline race;
//!   whichever fires first wins, the loser is cancelled cooperatively
//! - **Transient failures are not errors** - a refused connect or a 404
//!   is "not yet"; only bad configuration, the timeout, or an internal
//!   fault reach the caller
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use waitup::{wait_for, WaitOptions};
//!
//! #[tokio::main]
//! async fn main() -> waitup::Result<()> {
//!     let opts = WaitOptions::new([
//!         "tcp:5432",
//!         "http://localhost:3000/health",
//!         "/var/run/app/ready",
//!     ])
//!     .with_timeout(Duration::from_secs(30));
//!
//!     let summary = wait_for(opts).await?;
//!     println!("ready after {:?}", summary.elapsed);
//!     Ok(())
//! }
//! ```
//!
//! # Reverse mode
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use waitup::{wait_for, WaitOptions};
//!
//! # async fn example() -> waitup::Result<()> {
//! // Succeeds once the old server has released the port
//! let opts = WaitOptions::new(["tcp:8080"])
//!     .with_reverse(true)
//!     .with_timeout(Duration::from_secs(10));
//! wait_for(opts).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod constants;
pub mod errors;

// Prelude module for convenient imports
pub mod prelude;

// CLI module - public for main.rs access but contents not re-exported,
// keeping clap and friends out of the library surface
pub mod cli;

// Re-export the most commonly used types at the top level
pub use errors::{ConfigError, Result, WaitError};

pub use app::{
    wait_for,
    BasicAuth,
    HttpMethod,
    Resource,
    ResourceKind,
    StatusValidator,
    WaitOptions,
    WaitSummary,
    Waiter,
};

pub use config::{parse_duration, FileConfig};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
    }

    /// Test that the public surface is reachable from the crate root
    #[test]
    fn test_public_api_accessibility() {
        let opts = WaitOptions::new(["tcp:5432"]);
        assert!(opts.validate().is_ok());

        let resource = Resource::parse("tcp:5432").unwrap();
        assert_eq!(resource.kind(), ResourceKind::Tcp);

        let _validator = StatusValidator::default_for(true);
    }

    /// Test that the timeout error surfaces through the root re-export
    #[test]
    fn test_error_types() {
        let err: WaitError = ConfigError::ResourcesRequired.into();
        assert!(!err.is_timeout());
    }
}
