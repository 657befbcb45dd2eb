//! Shared setup for the command-line binaries.

use crate::error::{Error, Result};

/// Environment variable overriding the log filter.
pub const LOG_ENV: &str = "STEAMGUIDE_LOG";

/// Install a stdout `tracing` subscriber.
///
/// `info` by default, `error` with `quiet`, `debug` with `verbose`;
/// [`LOG_ENV`] takes precedence over both.
pub fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Unknown(format!("failed to initialize tracing subscriber: {e}")))
}
