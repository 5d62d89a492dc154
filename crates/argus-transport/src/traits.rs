use crate::error::TransportError;
use async_trait::async_trait;

/// Bidirectional text-message channel to a DevTools endpoint.
///
/// The CDP layer above only needs four things: open, close, send one JSON
/// string, await the next one. Keeping the seam this narrow lets tests
/// substitute a scripted in-memory transport for the WebSocket.
#[async_trait]
pub trait Transport: Send + Unpin {
    /// Establishes the connection described by the creation parameters.
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Closes the connection, tolerating an already-closed peer.
    async fn disconnect(&mut self) -> Result<(), TransportError>;

    /// Sends one text message.
    async fn send(&mut self, message: &str) -> Result<(), TransportError>;

    /// Awaits the next text message. `None` means the remote end closed
    /// the connection; errors are recoverable only by reconnecting.
    async fn receive(&mut self) -> Option<Result<String, TransportError>>;
}
