//! Factory function for creating Transport implementations based on ConnectParams.

use crate::error::TransportError;
use crate::traits::Transport;
use crate::types::ConnectParams;
use crate::websocket::WebSocketTransport;

/// Creates a boxed `Transport` trait object based on the URL scheme in `ConnectParams`.
///
/// Currently supports `ws://` and `wss://`.
pub fn create_transport(params: &ConnectParams) -> Result<Box<dyn Transport>, TransportError> {
    let url = &params.url;
    log::debug!("Attempting to create transport for URL: {}", url);

    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(Box::new(WebSocketTransport::new(params.clone())))
    } else {
        log::error!("Unsupported URL scheme found in: {}", url);
        Err(TransportError::UnsupportedScheme(format!(
            "Scheme not supported for URL: {}",
            url
        )))
    }
}
