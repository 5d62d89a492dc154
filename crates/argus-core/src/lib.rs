//! # Argus Core
//!
//! Shared foundation for the argus UI-verification harness: configuration
//! loading, logging setup, and the error types common to every layer.

pub mod config;
pub mod error;
pub mod logging;

pub use crate::config::{
    load_config, load_config_from, ArtifactConfig, BrowserLaunchConfig, Config, GlobalConfig,
    TargetConfig,
};
pub use crate::error::CoreError;
pub use crate::logging::setup_logging;
