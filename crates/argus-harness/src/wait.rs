//! Bounded waiting. Every wait checks its condition before sleeping, so an
//! already-satisfied condition succeeds even with a zero timeout.

use std::time::{Duration, Instant};

use log::debug;

use crate::driver::Driver;
use crate::error::HarnessError;
use crate::script::LocatorSpec;

pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub enum WaitCondition {
    /// No network request in flight for the configured quiet window.
    PageIdle,
    /// The locator resolves to a visible element.
    SelectorVisible(LocatorSpec),
    /// Unconditional pause. Escape hatch for pages with no observable
    /// settling signal; scripted delays always succeed.
    FixedDelay(Duration),
}

impl WaitCondition {
    fn describe(&self) -> String {
        match self {
            WaitCondition::PageIdle => "network idle".to_string(),
            WaitCondition::SelectorVisible(locator) => locator.describe(),
            WaitCondition::FixedDelay(d) => format!("fixed delay of {:?}", d),
        }
    }
}

/// Polls until the condition holds or `timeout` elapses.
pub async fn wait_until(
    driver: &mut dyn Driver,
    condition: &WaitCondition,
    timeout: Duration,
    quiet_window: Duration,
) -> Result<(), HarnessError> {
    match condition {
        WaitCondition::FixedDelay(delay) => {
            tokio::time::sleep(*delay).await;
            Ok(())
        }
        WaitCondition::PageIdle => driver.wait_network_quiet(quiet_window, timeout).await,
        WaitCondition::SelectorVisible(locator) => {
            let started = Instant::now();
            let deadline = started + timeout;
            loop {
                if let Some(handle) = driver.resolve(locator).await? {
                    if driver.is_visible(&handle).await? {
                        debug!(
                            "{} visible after {:?}",
                            condition.describe(),
                            started.elapsed()
                        );
                        return Ok(());
                    }
                }
                let now = Instant::now();
                if now >= deadline {
                    return Err(HarnessError::WaitTimeout(format!(
                        "{} (after {:?})",
                        condition.describe(),
                        timeout
                    )));
                }
                tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
            }
        }
    }
}
