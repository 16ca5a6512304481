//! Command-line argument parsing
//!
//! The flag surface mirrors the documented names exactly, including the
//! camel-case long forms `--httpTimeout` and `--tcpTimeout`. Durations
//! accept the `<number>[ms|s|m|h]` grammar shared with the config file.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::parse_duration;

/// waitup - wait until resources are available
#[derive(Parser, Debug)]
#[command(
    name = "waitup",
    version,
    about = "Wait until files, ports, sockets, and HTTP(S) endpoints become available",
    long_about = "Blocks until every given resource is available (or unavailable with --reverse), \
then exits 0; exits nonzero when the timeout elapses first.

Resources: a file path (or file:<path>), http(s)://host[:port][/path], \
http(s)-get://... to probe with GET, tcp:[host:]port, socket:<path>, and \
http(s)[-get]://unix:<socket-path>:<url-path> for HTTP over a Unix socket."
)]
pub struct Cli {
    /// Resources to wait for
    #[arg(value_name = "RESOURCE")]
    pub resources: Vec<String>,

    /// Load options from a TOML config file; positional resources
    /// override the file's list
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Initial delay before the first probe of every resource
    #[arg(short = 'd', long, value_name = "DURATION", value_parser = parse_duration)]
    pub delay: Option<Duration>,

    /// Timeout for each HTTP request
    #[arg(long = "httpTimeout", value_name = "DURATION", value_parser = parse_duration)]
    pub http_timeout: Option<Duration>,

    /// Poll period between probes of one resource
    #[arg(short = 'i', long, value_name = "DURATION", value_parser = parse_duration)]
    pub interval: Option<Duration>,

    /// Show progress while waiting
    #[arg(short = 'l', long)]
    pub log: bool,

    /// Reverse mode: wait for resources to become unavailable
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Maximum in-flight probes per resource
    #[arg(short = 's', long, value_name = "COUNT")]
    pub simultaneous: Option<usize>,

    /// Timeout for each TCP connect
    #[arg(long = "tcpTimeout", value_name = "DURATION", value_parser = parse_duration)]
    pub tcp_timeout: Option<Duration>,

    /// Global deadline; omit to wait forever
    #[arg(short = 't', long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Show per-probe debug detail (implies --log)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// File-size stability window
    #[arg(short = 'w', long, value_name = "DURATION", value_parser = parse_duration)]
    pub window: Option<Duration>,
}

impl Cli {
    /// Parse from the process arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
