//! Screenshot artifacts. Success and failure screenshots are best effort:
//! a capture problem is logged and the run's verdict stands.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::driver::Driver;
use crate::error::HarnessError;

/// Writes image bytes to `path`, creating parent directories as needed.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), HarnessError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, bytes)?;
    info!("Saved screenshot: {}", path.display());
    Ok(())
}

/// Captures the current viewport to `path`. Returns the written path, or
/// `None` when capture or write failed.
pub async fn capture(driver: &mut dyn Driver, path: &Path) -> Option<PathBuf> {
    let bytes = match driver.capture_screenshot().await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Screenshot capture failed: {}", e);
            return None;
        }
    };
    match write_artifact(path, &bytes) {
        Ok(()) => Some(path.to_path_buf()),
        Err(e) => {
            warn!("Could not write {}: {}", path.display(), e);
            None
        }
    }
}
