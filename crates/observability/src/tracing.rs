//! Tracing/logging initialization.
//!
//! Flow runs are long and interactive, so stage transitions log at `info` and
//! element-level actions at `debug`. Raise verbosity with
//! `RUST_LOG=procurebot_purchasing=debug,procurebot_navigation=debug`.
//! Logs go to stderr; stdout belongs to command output.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize plain-text logging, for operators watching a run live.
pub fn init_pretty() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
