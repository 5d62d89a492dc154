//! Sequential CDP connection: command/response correlation plus network
//! activity tracking for the idle wait.
//!
//! The harness runs one script against one page, so there is no background
//! read task; incoming traffic is drained inline while a command awaits its
//! response or while a caller pumps for network quiescence.

use std::time::{Duration, Instant};

use argus_transport::{create_transport, ConnectParams, Transport};
use log::{trace, warn};
use serde_json::Value;

use crate::error::ChromeError;
use crate::protocol::{network, Command, Event, Incoming, Response};

const IDLE_POLL_SLICE: Duration = Duration::from_millis(50);

pub struct CdpConnection {
    transport: Box<dyn Transport>,
    next_id: u64,
    inflight_requests: u32,
}

impl CdpConnection {
    /// Opens the WebSocket connection to the browser's DevTools endpoint.
    pub async fn connect(params: ConnectParams) -> Result<Self, ChromeError> {
        let mut transport = create_transport(&params)?;
        transport.connect().await?;
        Ok(Self {
            transport,
            next_id: 1,
            inflight_requests: 0,
        })
    }

    /// Sends one command and blocks until its response arrives, processing
    /// any events received in the meantime.
    pub async fn send_command(
        &mut self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
        timeout: Duration,
    ) -> Result<Value, ChromeError> {
        let id = self.next_id;
        self.next_id += 1;

        let command = Command {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };
        let payload = serde_json::to_string(&command)?;
        trace!("-> {}", payload);
        self.transport.send(&payload).await?;

        let deadline = Instant::now() + timeout;
        loop {
            match self.receive_until(deadline, method).await? {
                Incoming::Response(response) if response.id == id => {
                    return Self::unpack(response);
                }
                Incoming::Response(response) => {
                    warn!("Dropping response for unknown command id {}", response.id);
                }
                Incoming::Event(event) => self.note_event(&event),
            }
        }
    }

    /// Blocks until no network request has been in flight for `quiet`, or
    /// fails with a timeout once `timeout` elapses.
    pub async fn pump_until_quiet(
        &mut self,
        quiet: Duration,
        timeout: Duration,
    ) -> Result<(), ChromeError> {
        let deadline = Instant::now() + timeout;
        let mut quiet_since = Instant::now();

        loop {
            let now = Instant::now();
            if self.inflight_requests > 0 {
                quiet_since = now;
            } else if now.duration_since(quiet_since) >= quiet {
                return Ok(());
            }
            if now >= deadline {
                return Err(ChromeError::TimeoutError(format!(
                    "network never idle ({} request(s) still in flight)",
                    self.inflight_requests
                )));
            }

            let slice = IDLE_POLL_SLICE.min(deadline - now);
            match tokio::time::timeout(slice, self.transport.receive()).await {
                Ok(Some(Ok(text))) => match serde_json::from_str::<Incoming>(&text) {
                    Ok(Incoming::Event(event)) => self.note_event(&event),
                    Ok(Incoming::Response(response)) => {
                        warn!("Dropping response for unknown command id {}", response.id)
                    }
                    Err(e) => warn!("Ignoring unparseable CDP message: {}", e),
                },
                Ok(Some(Err(e))) => return Err(e.into()),
                Ok(None) => {
                    return Err(ChromeError::ProcessError(
                        "Browser closed the connection".to_string(),
                    ))
                }
                Err(_) => {} // no traffic this slice; loop re-checks quiescence
            }
        }
    }

    pub fn inflight_requests(&self) -> u32 {
        self.inflight_requests
    }

    pub async fn close(&mut self) -> Result<(), ChromeError> {
        self.transport.disconnect().await?;
        Ok(())
    }

    async fn receive_until(
        &mut self,
        deadline: Instant,
        context: &str,
    ) -> Result<Incoming, ChromeError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ChromeError::TimeoutError(format!("waiting on {}", context)));
        }
        match tokio::time::timeout(remaining, self.transport.receive()).await {
            Ok(Some(Ok(text))) => {
                trace!("<- {}", text);
                Ok(serde_json::from_str(&text)?)
            }
            Ok(Some(Err(e))) => Err(e.into()),
            Ok(None) => Err(ChromeError::ProcessError(
                "Browser closed the connection".to_string(),
            )),
            Err(_) => Err(ChromeError::TimeoutError(format!("waiting on {}", context))),
        }
    }

    fn unpack(response: Response) -> Result<Value, ChromeError> {
        if let Some(error) = response.error {
            return Err(ChromeError::BrowserError {
                code: error.code,
                message: error.message,
            });
        }
        Ok(response.result)
    }

    fn note_event(&mut self, event: &Event) {
        match event.method.as_str() {
            network::REQUEST_WILL_BE_SENT => self.inflight_requests += 1,
            network::LOADING_FINISHED | network::LOADING_FAILED => {
                self.inflight_requests = self.inflight_requests.saturating_sub(1);
            }
            _ => trace!("event {}", event.method),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argus_transport::TransportError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;

    struct ScriptedTransport {
        incoming: VecDeque<String>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn connect(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn disconnect(&mut self) -> Result<(), TransportError> {
            Ok(())
        }

        async fn send(&mut self, _message: &str) -> Result<(), TransportError> {
            Ok(())
        }

        async fn receive(&mut self) -> Option<Result<String, TransportError>> {
            match self.incoming.pop_front() {
                Some(m) => Some(Ok(m)),
                None => {
                    // Quiet wire: park until the caller's timeout fires.
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    None
                }
            }
        }
    }

    fn connection_with(messages: &[&str]) -> CdpConnection {
        CdpConnection {
            transport: Box::new(ScriptedTransport {
                incoming: messages.iter().map(|m| m.to_string()).collect(),
            }),
            next_id: 1,
            inflight_requests: 0,
        }
    }

    #[tokio::test]
    async fn send_command_matches_response_and_tracks_interleaved_events() {
        let mut conn = connection_with(&[
            r#"{"method": "Network.requestWillBeSent", "params": {}}"#,
            r#"{"id": 1, "result": {"targetId": "T1"}}"#,
        ]);
        let result = conn
            .send_command("Target.createTarget", None, None, Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(result, json!({"targetId": "T1"}));
        assert_eq!(conn.inflight_requests(), 1);
    }

    #[tokio::test]
    async fn send_command_surfaces_browser_errors() {
        let mut conn = connection_with(&[
            r#"{"id": 1, "error": {"code": -32000, "message": "Target closed"}}"#,
        ]);
        let err = conn
            .send_command("Page.enable", None, Some("S"), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChromeError::BrowserError { code: -32000, .. }
        ));
    }

    #[tokio::test]
    async fn send_command_times_out_without_a_response() {
        let mut conn = connection_with(&[]);
        let err = conn
            .send_command("Page.enable", None, None, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, ChromeError::TimeoutError(_)));
    }

    #[tokio::test]
    async fn pump_until_quiet_succeeds_on_a_silent_wire() {
        let mut conn = connection_with(&[]);
        conn.pump_until_quiet(Duration::from_millis(20), Duration::from_millis(500))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn pump_until_quiet_times_out_with_requests_in_flight() {
        let mut conn = connection_with(&[
            r#"{"method": "Network.requestWillBeSent", "params": {}}"#,
        ]);
        let err = conn
            .pump_until_quiet(Duration::from_millis(20), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, ChromeError::TimeoutError(_)));
    }

    #[tokio::test]
    async fn loading_finished_rebalances_the_inflight_counter() {
        let mut conn = connection_with(&[
            r#"{"method": "Network.requestWillBeSent", "params": {}}"#,
            r#"{"method": "Network.loadingFinished", "params": {}}"#,
            r#"{"id": 1, "result": {}}"#,
        ]);
        conn.send_command("Runtime.enable", None, Some("S"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(conn.inflight_requests(), 0);
    }
}
