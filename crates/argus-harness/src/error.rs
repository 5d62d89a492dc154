use argus_chrome::ChromeError;
use thiserror::Error;

/// Failure taxonomy for a verification run.
///
/// The variant decides how the run reacts: `Launch` means no usable page
/// exists, so no failure screenshot is attempted; everything else fails the
/// run but still captures diagnostics from the live page.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Launch failed: {0}")]
    Launch(String),
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("Timed out waiting for {0}")]
    WaitTimeout(String),
    #[error("Interaction failed: {0}")]
    Interaction(String),
    #[error("Invalid script: {0}")]
    InvalidScript(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<ChromeError> for HarnessError {
    fn from(e: ChromeError) -> Self {
        match e {
            ChromeError::LaunchError(_)
            | ChromeError::ProcessError(_)
            | ChromeError::NavigationError(_) => HarnessError::Launch(e.to_string()),
            ChromeError::TimeoutError(_) => HarnessError::WaitTimeout(e.to_string()),
            other => HarnessError::Unexpected(other.to_string()),
        }
    }
}

impl From<std::io::Error> for HarnessError {
    fn from(e: std::io::Error) -> Self {
        HarnessError::Unexpected(e.to_string())
    }
}
