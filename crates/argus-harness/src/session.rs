//! Production driver backed by a launched Chrome instance.

use std::time::Duration;

use argus_chrome::Chrome;
use argus_core::Config;
use async_trait::async_trait;
use log::{debug, info, warn};

use crate::driver::{Driver, DriverFactory, ElementHandle};
use crate::error::HarnessError;
use crate::locator::{
    fill_function, finder_expression, CENTER_FN, FOCUS_FN, IS_VISIBLE_FN,
};
use crate::script::LocatorSpec;

pub struct ChromeSession {
    chrome: Chrome,
}

impl ChromeSession {
    /// Launches the browser and opens the target page. The initial load is
    /// given one bounded network-idle wait; a page that never settles is
    /// still handed over, since many SPAs poll in the background.
    pub async fn acquire(config: &Config) -> Result<Self, HarnessError> {
        let chrome = Chrome::launch(&config.browser, &config.target.url)
            .await
            .map_err(|e| HarnessError::Launch(e.to_string()))?;
        let mut session = Self { chrome };
        info!("Session acquired for {}", config.target.url);

        if let Err(e) = session
            .chrome
            .wait_network_quiet(config.target.quiet_window, config.target.navigation_timeout)
            .await
        {
            warn!("Initial load never reached network idle: {}", e);
        }
        Ok(session)
    }

    fn interaction<E: std::fmt::Display>(context: &str, e: E) -> HarnessError {
        HarnessError::Interaction(format!("{}: {}", context, e))
    }
}

#[async_trait]
impl Driver for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), HarnessError> {
        self.chrome.navigate(url).await?;
        Ok(())
    }

    async fn wait_network_quiet(
        &mut self,
        quiet: Duration,
        timeout: Duration,
    ) -> Result<(), HarnessError> {
        self.chrome.wait_network_quiet(quiet, timeout).await?;
        Ok(())
    }

    async fn resolve(
        &mut self,
        locator: &LocatorSpec,
    ) -> Result<Option<ElementHandle>, HarnessError> {
        let expression = finder_expression(locator);
        debug!("Resolving {}", locator.describe());
        let object_id = self.chrome.query_object(&expression).await?;
        Ok(object_id.map(|object_id| ElementHandle {
            object_id,
            description: locator.describe(),
        }))
    }

    async fn is_visible(&mut self, handle: &ElementHandle) -> Result<bool, HarnessError> {
        let value = self
            .chrome
            .call_function_on(&handle.object_id, IS_VISIBLE_FN)
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn focus(&mut self, handle: &ElementHandle) -> Result<(), HarnessError> {
        self.chrome
            .call_function_on(&handle.object_id, FOCUS_FN)
            .await
            .map_err(|e| Self::interaction(&format!("focus {}", handle.description), e))?;
        Ok(())
    }

    async fn fill(&mut self, handle: &ElementHandle, text: &str) -> Result<(), HarnessError> {
        self.chrome
            .call_function_on(&handle.object_id, &fill_function(text))
            .await
            .map_err(|e| Self::interaction(&format!("fill {}", handle.description), e))?;
        Ok(())
    }

    async fn click(&mut self, handle: &ElementHandle) -> Result<(), HarnessError> {
        let context = format!("click {}", handle.description);
        let center = self
            .chrome
            .call_function_on(&handle.object_id, CENTER_FN)
            .await
            .map_err(|e| Self::interaction(&context, e))?;
        let (x, y) = match (
            center.get("x").and_then(|v| v.as_f64()),
            center.get("y").and_then(|v| v.as_f64()),
        ) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(Self::interaction(
                    &context,
                    format!("element reported no geometry: {}", center),
                ))
            }
        };
        self.chrome
            .click_at(x, y)
            .await
            .map_err(|e| Self::interaction(&context, e))?;
        Ok(())
    }

    async fn press_key(&mut self, key: &str) -> Result<(), HarnessError> {
        self.chrome
            .press_key(key)
            .await
            .map_err(|e| Self::interaction(&format!("press {}", key), e))?;
        Ok(())
    }

    async fn capture_screenshot(&mut self) -> Result<Vec<u8>, HarnessError> {
        Ok(self.chrome.capture_screenshot().await?)
    }

    async fn close(self: Box<Self>) -> Result<(), HarnessError> {
        self.chrome.close().await?;
        Ok(())
    }
}

/// Acquires [`ChromeSession`]s from one shared configuration.
pub struct ChromeSessionFactory {
    config: Config,
}

impl ChromeSessionFactory {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for ChromeSessionFactory {
    async fn acquire(&self) -> Result<Box<dyn Driver>, HarnessError> {
        Ok(Box::new(ChromeSession::acquire(&self.config).await?))
    }
}
