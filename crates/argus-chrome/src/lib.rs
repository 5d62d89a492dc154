//! # Argus Chrome
//!
//! Chrome DevTools Protocol (CDP) client used by the verification harness.
//!
//! The crate launches a headless Chrome process, discovers its DevTools
//! WebSocket endpoint, and drives a single page target over a sequential
//! CDP connection: navigation, script evaluation, input dispatch, network
//! quiescence tracking, and screenshot capture.

mod browser;
mod connection;
mod error;
mod launcher;
pub mod protocol;

pub use browser::Chrome;
pub use connection::CdpConnection;
pub use error::ChromeError;
pub use launcher::ChromeLauncher;
