//! Logging setup
//!
//! Every event goes to stdout and, when a log path is given, is appended to a
//! plain-text log file as well. Both outputs carry a local timestamp prefix.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Filter directives for a verbosity level
pub fn filter_directives(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        // Only show errors
        return "error";
    }
    match verbose {
        0 => "tag_harvest=info,warn",
        1 => "tag_harvest=debug,info",
        2 => "tag_harvest=trace,debug",
        _ => "trace",
    }
}

/// Installs the global subscriber
///
/// # Arguments
///
/// * `verbose` - Number of `-v` flags
/// * `quiet` - Only report errors
/// * `log_path` - Append-only log file mirrored from stdout
pub fn init(verbose: u8, quiet: bool, log_path: Option<&Path>) -> std::io::Result<()> {
    let filter = EnvFilter::new(filter_directives(verbose, quiet));

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()));

    let file_layer = match log_path {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
