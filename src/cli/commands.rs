//! CLI command handling
//!
//! Merges the config file and command-line flags into one `WaitOptions`
//! (flags win), then runs the wait racing against Ctrl-C so interactive
//! runs cancel cleanly.

use tracing::info;

use super::args::Cli;
use crate::app::options::WaitOptions;
use crate::app::waiter::wait_for;
use crate::config::FileConfig;
use crate::errors::{Result, WaitError};

/// Build the effective options from the config file and flags
///
/// Precedence: engine defaults, then the config file, then flags.
/// Positional resources replace the file's resource list entirely.
pub fn build_options(cli: &Cli) -> Result<WaitOptions> {
    let mut opts = match &cli.config {
        Some(path) => FileConfig::load(path)?.into_options()?,
        None => WaitOptions::default(),
    };

    if !cli.resources.is_empty() {
        opts.resources = cli.resources.clone();
    }
    if let Some(delay) = cli.delay {
        opts.delay = delay;
    }
    if let Some(interval) = cli.interval {
        opts.interval = interval;
    }
    if let Some(window) = cli.window {
        opts.window = window;
    }
    if let Some(timeout) = cli.timeout {
        opts.timeout = Some(timeout);
    }
    if let Some(http_timeout) = cli.http_timeout {
        opts.http_timeout = Some(http_timeout);
    }
    if let Some(tcp_timeout) = cli.tcp_timeout {
        opts.tcp_timeout = tcp_timeout;
    }
    if let Some(simultaneous) = cli.simultaneous {
        opts.simultaneous = simultaneous;
    }
    opts.reverse = opts.reverse || cli.reverse;
    opts.log = opts.log || cli.log;
    opts.verbose = opts.verbose || cli.verbose;

    Ok(opts)
}

/// Run the wait, cancelling on Ctrl-C
pub async fn run_wait(opts: WaitOptions) -> Result<()> {
    let log_summary = opts.log || opts.verbose;

    tokio::select! {
        result = wait_for(opts) => {
            let summary = result?;
            if log_summary {
                info!(
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    resources = summary.resources,
                    "all resources ready"
                );
            }
            Ok(())
        }
        _ = tokio::signal::ctrl_c() => Err(WaitError::Interrupted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::Duration;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("waitup").chain(args.iter().copied())).unwrap()
    }

    /// Test that flags override config-file values
    #[test]
    fn test_flags_override_config_file() {
        use std::io::Write;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("waitup.toml");
        write!(
            std::fs::File::create(&path).unwrap(),
            "resources = [\"tcp:1\"]\ninterval = \"1s\"\ntimeout = \"1m\"\n"
        )
        .unwrap();

        let cli = cli(&["-c", path.to_str().unwrap(), "-i", "50ms", "tcp:2", "tcp:3"]);
        let opts = build_options(&cli).unwrap();

        // Positional resources replace the file's list
        assert_eq!(opts.resources, vec!["tcp:2", "tcp:3"]);
        // The flag wins over the file
        assert_eq!(opts.interval, Duration::from_millis(50));
        // The file's value survives where no flag was given
        assert_eq!(opts.timeout, Some(Duration::from_secs(60)));
    }

    /// Test that config-file resources apply when no positional ones
    /// are given
    #[test]
    fn test_config_resources_used_without_positionals() {
        use std::io::Write;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("waitup.toml");
        write!(
            std::fs::File::create(&path).unwrap(),
            "resources = [\"tcp:5432\"]\n"
        )
        .unwrap();

        let cli = cli(&["-c", path.to_str().unwrap()]);
        let opts = build_options(&cli).unwrap();
        assert_eq!(opts.resources, vec!["tcp:5432"]);
    }

    /// Test that boolean flags only ever turn options on
    #[test]
    fn test_boolean_flags_are_additive() {
        let opts = build_options(&cli(&["-r", "-v", "tcp:1"])).unwrap();
        assert!(opts.reverse);
        assert!(opts.verbose);
        assert!(!opts.log); // set later by normalization, not here
    }

    /// Test plain flag-only construction
    #[test]
    fn test_flag_only_options() {
        let opts = build_options(&cli(&["-t", "5s", "-s", "4", "/tmp/f"])).unwrap();
        assert_eq!(opts.timeout, Some(Duration::from_secs(5)));
        assert_eq!(opts.simultaneous, 4);
        assert_eq!(opts.resources, vec!["/tmp/f"]);
    }
}
