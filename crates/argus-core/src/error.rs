use thiserror::Error;

/// Errors originating strictly from the core crate logic.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration loading failed: {0}")]
    ConfigLoad(#[from] ::config::ConfigError),

    #[error("Logging setup failed: {0}")]
    LoggingSetup(String),
}
