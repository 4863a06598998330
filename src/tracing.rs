//! Logging bootstrap.
//!
//! Installs a `tracing-subscriber` registry with a formatted output layer
//! (file, line, level) filtered by `RUST_LOG`. When `RUST_LOG` is unset the
//! filter is [`DEFAULT_FILTER`], which keeps the `request_tracing` target at
//! `debug`: whether entry/exit records are produced is decided by the
//! verbosity gate, not by the subscriber.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_FILTER: &str = "info,request_tracing=debug";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initializes the global tracing subscriber with formatted output.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_target(true)
                .with_filter(env_filter()),
        )
        .init();
}
