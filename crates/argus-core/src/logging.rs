//! `env_logger` bootstrap shared by the binary and by examples.

use crate::error::CoreError;
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::str::FromStr;

/// Dependency modules clamped to Info so a debug-level run shows harness
/// traffic, not WebSocket and TLS internals.
const NOISY_MODULES: &[&str] = &[
    "tungstenite",
    "tokio_tungstenite",
    "hyper",
    "reqwest",
    "rustls",
];

/// Initializes logging at `level` (falling back to Info on an
/// unrecognized name), honoring `RUST_LOG` overrides.
pub fn setup_logging(level: &str) -> Result<(), CoreError> {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);

    let mut builder = Builder::from_env(Env::default().default_filter_or(level.to_string()));
    for module in NOISY_MODULES {
        builder.filter_module(module, LevelFilter::Info);
    }
    builder
        .try_init()
        .map_err(|e| CoreError::LoggingSetup(e.to_string()))
}
