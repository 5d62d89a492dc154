use thiserror::Error;

/// Errors specific to the transport layer.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Not connected: {0}")]
    NotConnected(String),

    #[error("Send operation failed: {0}")]
    SendFailed(String),

    #[error("Receive operation failed: {0}")]
    ReceiveFailed(String),

    #[error("Connection timed out")]
    Timeout,

    #[error("Invalid URL or connection parameters: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Underlying I/O error: {0}")]
    Io(String),

    #[error("WebSocket protocol error: {0}")]
    WebSocketError(String),

    #[error("Unknown transport error: {0}")]
    Other(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed => TransportError::NotConnected("Connection closed".into()),
            WsError::AlreadyClosed => {
                TransportError::NotConnected("Connection already closed".into())
            }
            WsError::Io(io_err) => TransportError::Io(io_err.to_string()),
            WsError::Protocol(reason) => {
                TransportError::WebSocketError(format!("Protocol violation: {}", reason))
            }
            WsError::Utf8 => TransportError::ReceiveFailed("Invalid UTF-8 received".into()),
            WsError::Url(parse_err) => {
                TransportError::InvalidUrl(format!("URL parse error: {}", parse_err))
            }
            WsError::Http(resp) => TransportError::ConnectionFailed(format!(
                "HTTP error during handshake: Status {}",
                resp.status()
            )),
            other => TransportError::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_io_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = TransportError::from(io);
        assert!(matches!(err, TransportError::Io(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn closed_connection_maps_to_not_connected() {
        let err =
            TransportError::from(tokio_tungstenite::tungstenite::Error::ConnectionClosed);
        assert!(matches!(err, TransportError::NotConnected(_)));
    }
}
