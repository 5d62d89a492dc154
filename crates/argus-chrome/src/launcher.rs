use std::time::{Duration, Instant};

use argus_core::BrowserLaunchConfig;
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::process::Child;

use crate::error::ChromeError;

const DISCOVERY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Shape of the `/json/version` DevTools endpoint response.
#[derive(Debug, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "Browser", default)]
    pub browser: String,
    #[serde(rename = "Protocol-Version", default)]
    pub protocol_version: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    pub websocket_debugger_url: String,
}

/// Owns the Chrome child process and its remote-debugging port.
///
/// The process is killed on `Drop` as a backstop; callers that care about
/// orderly shutdown should call [`ChromeLauncher::kill`] explicitly.
pub struct ChromeLauncher {
    port: u16,
    process: Option<Child>,
}

impl ChromeLauncher {
    /// Spawns a Chrome process configured for remote debugging.
    pub fn launch(config: &BrowserLaunchConfig) -> Result<Self, ChromeError> {
        let port = match config.remote_debugging_port {
            Some(p) => p,
            None => portpicker::pick_unused_port().ok_or_else(|| {
                ChromeError::LaunchError("Failed to find an available port".to_string())
            })?,
        };

        let args = build_args(config, port);
        let executable = config
            .executable_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(default_executable);

        info!("Launching Chrome: {} (port {})", executable, port);
        debug!("Chrome args: {:?}", args);

        let child = tokio::process::Command::new(&executable)
            .args(&args)
            .envs(&config.env_vars)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ChromeError::LaunchError(format!("Failed to spawn '{}': {}", executable, e))
            })?;

        Ok(Self {
            port,
            process: Some(child),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn version_url(&self) -> String {
        format!("http://127.0.0.1:{}/json/version", self.port)
    }

    /// Polls the DevTools HTTP endpoint until it reports the browser-level
    /// WebSocket URL, or the timeout elapses.
    pub async fn discover_ws_url(&self, timeout: Duration) -> Result<String, ChromeError> {
        let client = reqwest::Client::new();
        let url = self.version_url();
        let deadline = Instant::now() + timeout;
        let mut last_error = String::new();

        while Instant::now() < deadline {
            match client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<VersionInfo>().await {
                        Ok(info) => {
                            debug!(
                                "Found Chrome WebSocket URL: {} ({})",
                                info.websocket_debugger_url, info.browser
                            );
                            return Ok(info.websocket_debugger_url);
                        }
                        Err(e) => last_error = format!("Invalid DevTools version info: {}", e),
                    }
                }
                Ok(response) => last_error = format!("HTTP {}", response.status()),
                Err(e) => last_error = e.to_string(),
            }
            tokio::time::sleep(DISCOVERY_POLL_INTERVAL).await;
        }

        Err(ChromeError::LaunchError(format!(
            "DevTools endpoint never became ready at {}: {}",
            url, last_error
        )))
    }

    /// Terminates the Chrome process. Safe to call once; `Drop` covers the
    /// paths that never reach here.
    pub async fn kill(&mut self) {
        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.start_kill() {
                warn!("Failed to kill Chrome process: {}", e);
                return;
            }
            let _ = process.wait().await;
            info!("Chrome process terminated.");
        }
    }
}

impl Drop for ChromeLauncher {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            let _ = process.start_kill();
        }
    }
}

fn build_args(config: &BrowserLaunchConfig, port: u16) -> Vec<String> {
    let mut args = vec![
        format!("--remote-debugging-port={}", port),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
    ];

    if config.headless {
        args.push("--headless=new".to_string());
    }

    if let Some(ref dir) = config.user_data_dir {
        args.push(format!("--user-data-dir={}", dir.display()));
    }

    args.extend(config.args.clone());
    args
}

fn default_executable() -> String {
    #[cfg(target_os = "macos")]
    {
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome".to_string()
    }
    #[cfg(target_os = "windows")]
    {
        r"C:\Program Files\Google\Chrome\Application\chrome.exe".to_string()
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        "google-chrome".to_string()
    }
}
