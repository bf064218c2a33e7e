//! Logging setup using `tracing` and `tracing-subscriber`
//!
//! The library only emits events; the binary installs a subscriber once at
//! startup. Events go to stderr so stdout stays usable for piping results.
//!
//! # Log Levels
//!
//! - `warn`: Failed page fetches
//! - `debug`: Filter key changes, cache resets, dropped or stale fetches
//! - `trace`: Reserved for per-item output

use std::io;
use tracing_subscriber::EnvFilter;

/// Build the event filter
///
/// `RUST_LOG` wins when no `-v` flag was given; otherwise `-v` selects
/// `debug`, `-vv` and above `trace`, and no flag falls back to the
/// configured level. An unparsable level falls back to `warn`.
#[must_use]
pub fn build_env_filter(config_level: &str, verbose: u8) -> EnvFilter {
    if verbose == 0
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }

    let level = match verbose {
        0 => config_level,
        1 => "debug",
        _ => "trace",
    };
    parse_level(level)
}

fn parse_level(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber
///
/// Calling it again after a subscriber is set is a no-op.
pub fn init_logging(config_level: &str, verbose: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(config_level, verbose))
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
