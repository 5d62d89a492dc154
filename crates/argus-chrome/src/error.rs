use argus_transport::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChromeError {
    #[error("Failed to launch Chrome browser: {0}")]
    LaunchError(String),

    #[error("Chrome process error: {0}")]
    ProcessError(String),

    #[error("DevTools protocol error: {0}")]
    ProtocolError(String),

    #[error("Browser rejected command: {message} (code: {code})")]
    BrowserError { code: i32, message: String },

    #[error("Navigation failed: {0}")]
    NavigationError(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl From<serde_json::Error> for ChromeError {
    fn from(err: serde_json::Error) -> Self {
        ChromeError::ProtocolError(err.to_string())
    }
}
