//! waitup CLI
//!
//! Waits for files, ports, sockets, and HTTP(S) endpoints, then exits 0;
//! exits 1 on bad configuration, timeout, or interruption.

use std::process;

use tracing_subscriber::{fmt, EnvFilter};

// CLI modules are reached through the library (public but not
// re-exported)
use waitup::app::options::WaitOptions;
use waitup::cli::{build_options, run_wait, Cli};
use waitup::errors::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // Options come partly from the config file, so logging is
    // initialized after the merge
    let opts = build_options(&cli)?;
    init_logging(&opts);

    run_wait(opts).await
}

/// Initialize logging from the effective verbosity options
fn init_logging(opts: &WaitOptions) {
    let level = if opts.verbose {
        "debug"
    } else if opts.log {
        "info"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::from_default_env().add_directive(format!("waitup={level}").parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(opts.verbose)
        .init();
}
