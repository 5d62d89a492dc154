//! # Argus Transport (Raw Communication)
//!
//! This crate handles the low-level details of establishing and managing
//! network connections (WebSockets) to browser debugging endpoints.
//!
//! It defines the `Transport` trait for abstracting the communication
//! method and a `tokio-tungstenite` based implementation of it.

pub mod error;
pub mod factory;
pub mod traits;
pub mod types;
pub mod websocket;

pub use error::TransportError;
pub use factory::create_transport;
pub use traits::Transport;
pub use types::ConnectParams;
pub use websocket::WebSocketTransport;
