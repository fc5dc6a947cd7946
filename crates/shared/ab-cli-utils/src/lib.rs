//! Utilities used in various CLI applications

use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr.
///
/// Verbosity is controlled with `RUST_LOG` environment variable, `info` level is used by default.
/// Does nothing if global subscriber was already installed.
pub fn init_logger() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
