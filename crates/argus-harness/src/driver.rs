//! Seam between the orchestrator and the browser.
//!
//! The orchestrator only ever talks to a [`Driver`]; the production
//! implementation wraps a launched Chrome, and tests substitute a scripted
//! fake. A [`DriverFactory`] owns session acquisition so launch failures
//! surface through the same seam.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::HarnessError;
use crate::script::LocatorSpec;

/// A resolved element. The handle stays valid until the page mutates it
/// away; callers re-resolve rather than cache across steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub object_id: String,
    /// Human-readable description of the locator that produced the handle,
    /// used in logs and error detail.
    pub description: String,
}

#[async_trait]
pub trait Driver: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), HarnessError>;

    /// Blocks until the page has had no network activity for `quiet`,
    /// bounded by `timeout`.
    async fn wait_network_quiet(
        &mut self,
        quiet: Duration,
        timeout: Duration,
    ) -> Result<(), HarnessError>;

    /// Resolves a locator to its first DOM-order match, if any.
    async fn resolve(&mut self, locator: &LocatorSpec)
        -> Result<Option<ElementHandle>, HarnessError>;

    async fn is_visible(&mut self, handle: &ElementHandle) -> Result<bool, HarnessError>;

    async fn focus(&mut self, handle: &ElementHandle) -> Result<(), HarnessError>;

    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> Result<(), HarnessError>;

    async fn click(&mut self, handle: &ElementHandle) -> Result<(), HarnessError>;

    /// Sends a key press to whatever currently holds focus.
    async fn press_key(&mut self, key: &str) -> Result<(), HarnessError>;

    /// PNG bytes of the current viewport.
    async fn capture_screenshot(&mut self) -> Result<Vec<u8>, HarnessError>;

    /// Releases the session: page, connection, browser process. Consumes
    /// the driver, so release happens at most once per session.
    async fn close(self: Box<Self>) -> Result<(), HarnessError>;
}

#[async_trait]
pub trait DriverFactory {
    /// Acquires a ready session: browser launched, target page open.
    async fn acquire(&self) -> Result<Box<dyn Driver>, HarnessError>;
}
