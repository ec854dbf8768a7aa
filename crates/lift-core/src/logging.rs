//! Tracing setup for binaries
//!
//! Library code only emits `tracing` events; installing a subscriber is left
//! to whoever owns `main`.

use crate::config::WorkoutConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to `default_level`
#[must_use]
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber on stderr
///
/// Does nothing when a subscriber is already installed.
pub fn init_tracing(config: &WorkoutConfig) {
    let filter = env_filter(&config.log_level);
    let result = if config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
