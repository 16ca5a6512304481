//! Prelude for waitup
//!
//! Re-exports the items most programs need, so one
//! `use waitup::prelude::*;` covers typical usage.

// Core result types
pub use crate::errors::{ConfigError, Result, WaitError};

// The wait surface
pub use crate::app::{
    wait_for, BasicAuth, Resource, ResourceKind, StatusValidator, WaitOptions, WaitSummary, Waiter,
};

// Config file support and the shared duration grammar
pub use crate::config::{parse_duration, FileConfig};

// Commonly needed alongside the options
pub use std::time::Duration;
