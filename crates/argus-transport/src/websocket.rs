//! Implementation of the `Transport` trait using WebSockets (`tokio-tungstenite`).

use crate::error::TransportError;
use crate::traits::Transport;
use crate::types::ConnectParams;
use async_trait::async_trait;
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{protocol::Message as TungsteniteMessage, Error as TungsteniteError},
    MaybeTlsStream, WebSocketStream,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, TungsteniteMessage>;
type WsSource = SplitStream<WsStream>;

/// WebSocket transport implementation.
pub struct WebSocketTransport {
    params: ConnectParams,
    sink: Option<WsSink>,
    source: Option<WsSource>,
}

impl WebSocketTransport {
    pub fn new(params: ConnectParams) -> Self {
        Self {
            params,
            sink: None,
            source: None,
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.sink.is_some() || self.source.is_some() {
            warn!("WebSocketTransport already connected.");
            return Err(TransportError::ConnectionFailed("Already connected".into()));
        }

        info!("Connecting WebSocket to {}", self.params.url);
        let connect_fut = connect_async(&self.params.url);
        let (ws_stream, response) =
            match tokio::time::timeout(self.params.connection_timeout, connect_fut).await {
                Ok(Ok(ok)) => ok,
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(TransportError::Timeout),
            };

        debug!("WebSocket handshake successful: {:?}", response.status());

        let (sink, source) = ws_stream.split();
        self.sink = Some(sink);
        self.source = Some(source);

        info!("WebSocket connection established.");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        info!("Disconnecting WebSocket.");
        if let Some(mut sink) = self.sink.take() {
            match sink.send(TungsteniteMessage::Close(None)).await {
                Ok(_) => debug!("WebSocket Close frame sent."),
                Err(TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed) => {
                    debug!("WebSocket already closed while sending Close frame.")
                }
                Err(e) => {
                    warn!("Error sending WebSocket Close frame: {}. Closing anyway.", e);
                }
            }
            if let Err(e) = sink.close().await {
                // AlreadyClosed is expected if the read side closed first
                if !matches!(
                    e,
                    TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed
                ) {
                    warn!("Error closing WebSocket sink: {}", e);
                }
            }
        }

        self.source = None;
        info!("WebSocket disconnected.");
        Ok(())
    }

    async fn send(&mut self, message: &str) -> Result<(), TransportError> {
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| TransportError::NotConnected("WebSocket sink unavailable".into()))?;

        sink.send(TungsteniteMessage::Text(message.to_string()))
            .await?;
        Ok(())
    }

    async fn receive(&mut self) -> Option<Result<String, TransportError>> {
        let source = self.source.as_mut()?;

        // Control frames are handled here so callers only ever see text payloads.
        loop {
            match source.next().await {
                Some(Ok(msg)) => match msg {
                    TungsteniteMessage::Text(text) => return Some(Ok(text)),
                    TungsteniteMessage::Binary(bin) => {
                        warn!(
                            "Received unexpected WebSocket Binary message ({} bytes), ignoring.",
                            bin.len()
                        );
                        continue;
                    }
                    TungsteniteMessage::Ping(_) | TungsteniteMessage::Pong(_) => {
                        // tungstenite answers Pings on flush; nothing to do
                        continue;
                    }
                    TungsteniteMessage::Close(close_frame) => {
                        info!("Received WebSocket Close frame: {:?}", close_frame);
                        return None;
                    }
                    TungsteniteMessage::Frame(_) => {
                        warn!("Received unexpected WebSocket raw frame, ignoring.");
                        continue;
                    }
                },
                Some(Err(e)) => match e {
                    TungsteniteError::ConnectionClosed | TungsteniteError::AlreadyClosed => {
                        info!("WebSocket connection closed while receiving.");
                        return None;
                    }
                    _ => return Some(Err(e.into())),
                },
                None => {
                    info!("WebSocket stream ended.");
                    return None;
                }
            }
        }
    }
}
