//! Runs one script against one session: acquire, execute steps in order,
//! stop on the first failure, capture the outcome screenshot, release.

use std::path::PathBuf;

use argus_core::Config;
use log::{debug, error, info, warn};

use crate::diagnostics;
use crate::driver::{Driver, DriverFactory, ElementHandle};
use crate::error::HarnessError;
use crate::script::{LocatorSpec, Script, Step};
use crate::wait::{wait_until, WaitCondition};

/// Lifecycle of a single run. Transitions are linear: a run acquires a
/// session once, executes once, ends in exactly one terminal status, and
/// releases the session exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    SessionAcquired,
    Running,
    Completed,
    Failed,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Completed,
    Failed,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub status: Status,
    /// Description of the step that ended the run, absent when the run
    /// completed or never got a session.
    pub failing_step: Option<String>,
    pub error_detail: Option<String>,
    /// Screenshot written for this outcome, when one could be captured.
    pub artifact_path: Option<PathBuf>,
}

impl VerificationResult {
    pub fn passed(&self) -> bool {
        self.status == Status::Completed
    }
}

fn advance(state: &mut RunState, next: RunState) {
    debug!("run state {:?} -> {:?}", state, next);
    *state = next;
}

/// Executes `script` on a session from `factory` and reports the outcome.
/// Never panics on browser trouble; every path ends with the session
/// released and a `VerificationResult` describing what happened.
pub async fn run(
    config: &Config,
    factory: &dyn DriverFactory,
    script: &Script,
) -> VerificationResult {
    let mut state = RunState::Idle;
    info!("=== {} ({} steps) ===", script.name, script.steps.len());

    let mut driver = match factory.acquire().await {
        Ok(driver) => driver,
        Err(e) => {
            error!("Session acquisition failed: {}", e);
            advance(&mut state, RunState::Failed);
            return VerificationResult {
                status: Status::Failed,
                failing_step: None,
                error_detail: Some(e.to_string()),
                artifact_path: None,
            };
        }
    };
    advance(&mut state, RunState::SessionAcquired);
    advance(&mut state, RunState::Running);

    let mut failure: Option<(String, HarnessError)> = None;
    for (index, step) in script.steps.iter().enumerate() {
        info!("[{}/{}] {}", index + 1, script.steps.len(), step.describe());
        if let Err(e) = execute_step(driver.as_mut(), config, step).await {
            error!("Step failed: {} ({})", step.describe(), e);
            failure = Some((step.describe(), e));
            break;
        }
    }

    let result = match failure {
        None => {
            advance(&mut state, RunState::Completed);
            let artifact =
                diagnostics::capture(driver.as_mut(), &config.artifacts.success_path).await;
            info!("=== {} completed ===", script.name);
            VerificationResult {
                status: Status::Completed,
                failing_step: None,
                error_detail: None,
                artifact_path: artifact,
            }
        }
        Some((step, e)) => {
            advance(&mut state, RunState::Failed);
            // A dead session has nothing left to photograph.
            let artifact = if matches!(e, HarnessError::Launch(_)) {
                None
            } else {
                diagnostics::capture(driver.as_mut(), &config.artifacts.failure_path).await
            };
            VerificationResult {
                status: Status::Failed,
                failing_step: Some(step),
                error_detail: Some(e.to_string()),
                artifact_path: artifact,
            }
        }
    };

    if let Err(e) = driver.close().await {
        warn!("Session release failed: {}", e);
    }
    advance(&mut state, RunState::Released);
    result
}

async fn execute_step(
    driver: &mut dyn Driver,
    config: &Config,
    step: &Step,
) -> Result<(), HarnessError> {
    let timeout = step.timeout().unwrap_or(config.global.default_step_timeout);
    let quiet = config.target.quiet_window;

    match step {
        Step::Navigate { url } => {
            driver.navigate(url).await?;
            wait_until(
                driver,
                &WaitCondition::PageIdle,
                config.target.navigation_timeout,
                quiet,
            )
            .await
        }
        Step::Fill { locator, text, .. } => {
            let handle = locate(driver, locator, timeout, quiet).await?;
            driver.fill(&handle, text).await
        }
        Step::Click { locator, .. } => {
            let handle = locate(driver, locator, timeout, quiet).await?;
            driver.click(&handle).await
        }
        Step::PressKey { key, locator, .. } => {
            if let Some(locator) = locator {
                let handle = locate(driver, locator, timeout, quiet).await?;
                driver.focus(&handle).await?;
            }
            driver.press_key(key).await
        }
        Step::WaitForText { text, .. } => {
            wait_until(
                driver,
                &WaitCondition::SelectorVisible(LocatorSpec::text(text)),
                timeout,
                quiet,
            )
            .await
        }
        Step::Screenshot { path } => {
            let bytes = driver.capture_screenshot().await?;
            diagnostics::write_artifact(path, &bytes)
        }
    }
}

/// Waits for the locator to be visible within `timeout`, then resolves a
/// fresh handle for the interaction. A locator that never matches reports
/// `ElementNotFound` rather than a bare timeout.
async fn locate(
    driver: &mut dyn Driver,
    locator: &LocatorSpec,
    timeout: std::time::Duration,
    quiet: std::time::Duration,
) -> Result<ElementHandle, HarnessError> {
    wait_until(
        driver,
        &WaitCondition::SelectorVisible(locator.clone()),
        timeout,
        quiet,
    )
    .await
    .map_err(|e| match e {
        HarnessError::WaitTimeout(_) => HarnessError::ElementNotFound(locator.describe()),
        other => other,
    })?;
    driver
        .resolve(locator)
        .await?
        .ok_or_else(|| HarnessError::ElementNotFound(locator.describe()))
}
