//! Logging configuration for querydeck.
//!
//! Logs go to stderr so that stdout carries only the table or JSON output.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Initializes logging to stderr.
///
/// `RUST_LOG` overrides the default filter; `verbose` adds per-query
/// `debug` output from this crate.
pub fn init_stderr_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(format!("{DEFAULT_FILTER},db_querydeck=debug,querydeck=debug"))
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    })
}
