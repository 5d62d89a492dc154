//! Handle to a launched Chrome instance with one attached page target.

use std::time::Duration;

use argus_core::BrowserLaunchConfig;
use argus_transport::ConnectParams;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use log::{info, warn};
use serde_json::Value;

use crate::connection::CdpConnection;
use crate::error::ChromeError;
use crate::launcher::ChromeLauncher;
use crate::protocol::{input, page, runtime, target};

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// One browser process, one connection, one page.
///
/// The page target is created during [`Chrome::launch`] and every
/// page-scoped command is issued against its flattened CDP session.
pub struct Chrome {
    launcher: ChromeLauncher,
    conn: CdpConnection,
    target_id: String,
    session_id: String,
    command_timeout: Duration,
}

impl Chrome {
    /// Launches Chrome, connects to its DevTools endpoint, and opens a page
    /// target at `initial_url`. The navigation itself starts here; waiting
    /// for it to settle is the caller's concern (see `wait_network_quiet`).
    pub async fn launch(
        config: &BrowserLaunchConfig,
        initial_url: &str,
    ) -> Result<Self, ChromeError> {
        let launcher = ChromeLauncher::launch(config)?;
        let ws_url = launcher.discover_ws_url(config.connect_timeout).await?;
        let mut conn = CdpConnection::connect(ConnectParams {
            url: ws_url,
            connection_timeout: config.connect_timeout,
        })
        .await?;

        let created: target::CreateTargetResponse = parse(
            conn.send_command(
                target::CreateTarget::METHOD,
                Some(serde_json::to_value(target::CreateTarget {
                    url: initial_url.to_string(),
                })?),
                None,
                DEFAULT_COMMAND_TIMEOUT,
            )
            .await?,
        )?;

        let attached: target::AttachToTargetResponse = parse(
            conn.send_command(
                target::AttachToTarget::METHOD,
                Some(serde_json::to_value(target::AttachToTarget {
                    target_id: created.target_id.clone(),
                    flatten: true,
                })?),
                None,
                DEFAULT_COMMAND_TIMEOUT,
            )
            .await?,
        )?;

        let mut chrome = Self {
            launcher,
            conn,
            target_id: created.target_id,
            session_id: attached.session_id,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        };
        chrome.enable_domains().await?;
        info!(
            "Chrome ready: target {} on port {}",
            chrome.target_id,
            chrome.launcher.port()
        );
        Ok(chrome)
    }

    async fn enable_domains(&mut self) -> Result<(), ChromeError> {
        for method in ["Page.enable", "Runtime.enable", "Network.enable"] {
            self.command(method, None).await?;
        }
        Ok(())
    }

    async fn command(&mut self, method: &str, params: Option<Value>) -> Result<Value, ChromeError> {
        let session = self.session_id.clone();
        self.conn
            .send_command(method, params, Some(&session), self.command_timeout)
            .await
    }

    /// Issues `Page.navigate`. Fails with `NavigationError` when the browser
    /// reports a hard failure (unreachable host, bad scheme, ...).
    pub async fn navigate(&mut self, url: &str) -> Result<(), ChromeError> {
        let result = self
            .command(
                page::Navigate::METHOD,
                Some(serde_json::to_value(page::Navigate {
                    url: url.to_string(),
                })?),
            )
            .await?;
        let response: page::NavigateResponse = serde_json::from_value(result)?;
        if let Some(error_text) = response.error_text {
            return Err(ChromeError::NavigationError(format!(
                "{} ({})",
                error_text, url
            )));
        }
        Ok(())
    }

    /// Blocks until no network request has been in flight for `quiet`,
    /// bounded by `timeout`.
    pub async fn wait_network_quiet(
        &mut self,
        quiet: Duration,
        timeout: Duration,
    ) -> Result<(), ChromeError> {
        self.conn.pump_until_quiet(quiet, timeout).await
    }

    async fn evaluate(
        &mut self,
        expression: &str,
        return_by_value: bool,
    ) -> Result<runtime::EvaluateResponse, ChromeError> {
        let params = serde_json::to_value(runtime::Evaluate {
            expression: expression.to_string(),
            return_by_value,
        })?;
        let result = self.command(runtime::Evaluate::METHOD, Some(params)).await?;
        let response: runtime::EvaluateResponse = serde_json::from_value(result)?;
        if let Some(details) = response.exception_details.as_ref() {
            return Err(ChromeError::ProtocolError(format!(
                "Script threw: {}",
                exception_text(details)
            )));
        }
        Ok(response)
    }

    /// Evaluates an expression and returns its JSON value.
    pub async fn evaluate_value(&mut self, expression: &str) -> Result<Value, ChromeError> {
        let response = self.evaluate(expression, true).await?;
        Ok(response.result.value)
    }

    /// Evaluates an expression expected to yield a DOM node and returns the
    /// node's remote object id, or `None` when it evaluated to null.
    pub async fn query_object(&mut self, expression: &str) -> Result<Option<String>, ChromeError> {
        let response = self.evaluate(expression, false).await?;
        Ok(response.result.object_id)
    }

    /// Calls `function_declaration` with the remote object bound as `this`,
    /// returning the result by value.
    pub async fn call_function_on(
        &mut self,
        object_id: &str,
        function_declaration: &str,
    ) -> Result<Value, ChromeError> {
        let params = serde_json::to_value(runtime::CallFunctionOn {
            object_id: object_id.to_string(),
            function_declaration: function_declaration.to_string(),
            return_by_value: true,
        })?;
        let result = self.command(runtime::CallFunctionOn::METHOD, Some(params)).await?;
        let response: runtime::EvaluateResponse = serde_json::from_value(result)?;
        if let Some(details) = response.exception_details {
            return Err(ChromeError::ProtocolError(format!(
                "Script threw: {}",
                exception_text(&details)
            )));
        }
        Ok(response.result.value)
    }

    /// Dispatches a full key press (rawKeyDown, char, keyUp) for a named key
    /// against the currently focused element.
    pub async fn press_key(&mut self, key: &str) -> Result<(), ChromeError> {
        let (code, text) = key_descriptor(key);
        self.dispatch_key("rawKeyDown", key, None, code).await?;
        if let Some(text) = text {
            self.dispatch_key("char", key, Some(text), code).await?;
        }
        self.dispatch_key("keyUp", key, None, code).await?;
        Ok(())
    }

    async fn dispatch_key(
        &mut self,
        kind: &'static str,
        key: &str,
        text: Option<String>,
        code: Option<u32>,
    ) -> Result<(), ChromeError> {
        let event = input::DispatchKeyEvent {
            kind,
            key: key.to_string(),
            text,
            windows_virtual_key_code: code,
        };
        self.command(input::DISPATCH_KEY_EVENT, Some(serde_json::to_value(event)?))
            .await?;
        Ok(())
    }

    /// Dispatches a pointer activation (move, press, release) at viewport
    /// coordinates.
    pub async fn click_at(&mut self, x: f64, y: f64) -> Result<(), ChromeError> {
        self.dispatch_mouse("mouseMoved", x, y, None, None).await?;
        self.dispatch_mouse("mousePressed", x, y, Some("left"), Some(1))
            .await?;
        self.dispatch_mouse("mouseReleased", x, y, Some("left"), Some(1))
            .await?;
        Ok(())
    }

    async fn dispatch_mouse(
        &mut self,
        kind: &'static str,
        x: f64,
        y: f64,
        button: Option<&'static str>,
        click_count: Option<u32>,
    ) -> Result<(), ChromeError> {
        let event = input::DispatchMouseEvent {
            kind,
            x,
            y,
            button,
            click_count,
        };
        self.command(input::DISPATCH_MOUSE_EVENT, Some(serde_json::to_value(event)?))
            .await?;
        Ok(())
    }

    /// Captures a PNG screenshot of the current viewport.
    pub async fn capture_screenshot(&mut self) -> Result<Vec<u8>, ChromeError> {
        let params = serde_json::to_value(page::CaptureScreenshot {
            format: "png".to_string(),
        })?;
        let result = self.command(page::CaptureScreenshot::METHOD, Some(params)).await?;
        let response: page::CaptureScreenshotResponse = serde_json::from_value(result)?;
        BASE64
            .decode(response.data.as_bytes())
            .map_err(|e| ChromeError::ProtocolError(format!("Invalid screenshot payload: {}", e)))
    }

    /// Closes the page target, the connection, and the browser process.
    /// Consumes the handle; a second release is unrepresentable.
    pub async fn close(mut self) -> Result<(), ChromeError> {
        let close = target::CloseTarget {
            target_id: self.target_id.clone(),
        };
        if let Err(e) = self
            .conn
            .send_command(
                target::CloseTarget::METHOD,
                Some(serde_json::to_value(close)?),
                None,
                CLOSE_TIMEOUT,
            )
            .await
        {
            warn!("Failed to close page target: {}", e);
        }
        if let Err(e) = self.conn.close().await {
            warn!("Failed to close DevTools connection: {}", e);
        }
        self.launcher.kill().await;
        Ok(())
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ChromeError> {
    Ok(serde_json::from_value(value)?)
}

fn exception_text(details: &Value) -> String {
    details
        .get("exception")
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
        .or_else(|| details.get("text").and_then(Value::as_str))
        .unwrap_or("unknown script exception")
        .to_string()
}

/// Maps a named key to its Windows virtual key code and, for printable
/// presses, the text the key produces.
fn key_descriptor(key: &str) -> (Option<u32>, Option<String>) {
    match key {
        "Enter" => (Some(13), Some("\r".to_string())),
        "Tab" => (Some(9), None),
        "Escape" => (Some(27), None),
        "Backspace" => (Some(8), None),
        "Delete" => (Some(46), None),
        "ArrowUp" => (Some(38), None),
        "ArrowDown" => (Some(40), None),
        "ArrowLeft" => (Some(37), None),
        "ArrowRight" => (Some(39), None),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => (Some(c.to_ascii_uppercase() as u32), Some(c.to_string())),
                _ => (None, None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_descriptor_knows_named_keys() {
        assert_eq!(key_descriptor("Enter"), (Some(13), Some("\r".to_string())));
        assert_eq!(key_descriptor("Tab"), (Some(9), None));
        assert_eq!(key_descriptor("ArrowDown"), (Some(40), None));
    }

    #[test]
    fn key_descriptor_treats_single_chars_as_printable() {
        assert_eq!(key_descriptor("a"), (Some(65), Some("a".to_string())));
        assert_eq!(key_descriptor("Z"), (Some(90), Some("Z".to_string())));
    }

    #[test]
    fn key_descriptor_rejects_unknown_multi_char_names() {
        assert_eq!(key_descriptor("NoSuchKey"), (None, None));
    }

    #[test]
    fn exception_text_prefers_description() {
        let details = json!({
            "text": "Uncaught",
            "exception": {"description": "ReferenceError: nope is not defined"}
        });
        assert_eq!(
            exception_text(&details),
            "ReferenceError: nope is not defined"
        );
        assert_eq!(exception_text(&json!({"text": "Uncaught"})), "Uncaught");
        assert_eq!(exception_text(&json!({})), "unknown script exception");
    }
}
