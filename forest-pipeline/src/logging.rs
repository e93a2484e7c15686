//! Logging setup for the command-line tools.
//!
//! Logs go to stderr so that stdout only carries the JSON results. The level
//! is read from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Later calls leave the first one in place.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
