//! End-to-end orchestrator behavior against a scripted in-memory driver:
//! verdicts, artifact handling, and session lifecycle.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use argus_core::Config;
use argus_harness::driver::{Driver, DriverFactory, ElementHandle};
use argus_harness::orchestrator::{self, Status};
use argus_harness::scenario;
use argus_harness::script::{LocatorSpec, Script, Step};
use argus_harness::HarnessError;
use async_trait::async_trait;

#[derive(Default)]
struct PageState {
    /// Accessible names / placeholders / text present on the fake page.
    elements: Mutex<Vec<String>>,
    resolve_calls: AtomicUsize,
    close_calls: AtomicUsize,
    fail_navigation: bool,
    fail_screenshots: bool,
    /// Clicking Save silently does nothing, as a regressed app would.
    save_is_broken: bool,
}

struct FakeDriver {
    state: Arc<PageState>,
}

#[async_trait]
impl Driver for FakeDriver {
    async fn navigate(&mut self, url: &str) -> Result<(), HarnessError> {
        if self.state.fail_navigation {
            return Err(HarnessError::Launch(format!(
                "net::ERR_CONNECTION_REFUSED ({})",
                url
            )));
        }
        Ok(())
    }

    async fn wait_network_quiet(
        &mut self,
        _quiet: Duration,
        _timeout: Duration,
    ) -> Result<(), HarnessError> {
        Ok(())
    }

    async fn resolve(
        &mut self,
        locator: &LocatorSpec,
    ) -> Result<Option<ElementHandle>, HarnessError> {
        self.state.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let elements = self.state.elements.lock().unwrap();
        let found = elements.iter().any(|name| {
            if locator.exact {
                name == &locator.value
            } else {
                name.contains(&locator.value)
            }
        });
        Ok(found.then(|| ElementHandle {
            object_id: locator.value.clone(),
            description: locator.describe(),
        }))
    }

    async fn is_visible(&mut self, _handle: &ElementHandle) -> Result<bool, HarnessError> {
        Ok(true)
    }

    async fn focus(&mut self, _handle: &ElementHandle) -> Result<(), HarnessError> {
        Ok(())
    }

    async fn fill(&mut self, _handle: &ElementHandle, _text: &str) -> Result<(), HarnessError> {
        Ok(())
    }

    async fn click(&mut self, handle: &ElementHandle) -> Result<(), HarnessError> {
        // Saving the search makes the label visible, as the real app would.
        if handle.object_id == "Save" && !self.state.save_is_broken {
            self.state
                .elements
                .lock()
                .unwrap()
                .push("Shiny Water".to_string());
        }
        Ok(())
    }

    async fn press_key(&mut self, _key: &str) -> Result<(), HarnessError> {
        Ok(())
    }

    async fn capture_screenshot(&mut self) -> Result<Vec<u8>, HarnessError> {
        if self.state.fail_screenshots {
            return Err(HarnessError::Unexpected("render process gone".to_string()));
        }
        Ok(b"\x89PNG fake".to_vec())
    }

    async fn close(self: Box<Self>) -> Result<(), HarnessError> {
        self.state.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeFactory {
    state: Arc<PageState>,
    refuse_acquire: bool,
}

#[async_trait]
impl DriverFactory for FakeFactory {
    async fn acquire(&self) -> Result<Box<dyn Driver>, HarnessError> {
        if self.refuse_acquire {
            return Err(HarnessError::Launch("chrome executable not found".to_string()));
        }
        Ok(Box::new(FakeDriver {
            state: Arc::clone(&self.state),
        }))
    }
}

fn saved_search_page() -> Vec<String> {
    vec![
        "Search Pokemon".to_string(),
        "Saved Searches".to_string(),
        "Label (e.g. 'My Team')".to_string(),
        "Save".to_string(),
    ]
}

fn test_config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config::default();
    config.global.default_step_timeout = Duration::from_millis(200);
    config.artifacts.success_path = dir.path().join("verified.png");
    config.artifacts.failure_path = dir.path().join("error.png");
    config
}

fn factory_with(elements: Vec<String>) -> (FakeFactory, Arc<PageState>) {
    let state = Arc::new(PageState {
        elements: Mutex::new(elements),
        ..PageState::default()
    });
    (
        FakeFactory {
            state: Arc::clone(&state),
            refuse_acquire: false,
        },
        state,
    )
}

#[tokio::test]
async fn full_scenario_completes_and_writes_the_success_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let (factory, state) = factory_with(saved_search_page());

    let script = scenario::saved_search(&config.target.url);
    let result = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(result.status, Status::Completed);
    assert!(result.failing_step.is_none());
    assert!(result.error_detail.is_none());
    assert_eq!(result.artifact_path.as_deref(), Some(&*config.artifacts.success_path));
    assert!(config.artifacts.success_path.exists());
    assert_eq!(state.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_element_fails_the_run_and_captures_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut page = saved_search_page();
    page.retain(|name| name != "Saved Searches");
    let (factory, state) = factory_with(page);

    let script = scenario::saved_search(&config.target.url);
    let result = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(result.status, Status::Failed);
    assert_eq!(
        result.failing_step.as_deref(),
        Some("click title 'Saved Searches'")
    );
    assert!(result
        .error_detail
        .as_deref()
        .unwrap()
        .contains("Element not found"));
    assert_eq!(result.artifact_path.as_deref(), Some(&*config.artifacts.failure_path));
    assert!(config.artifacts.failure_path.exists());
    assert!(!config.artifacts.success_path.exists());
    assert_eq!(state.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn text_that_never_renders_fails_the_final_wait() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let state = Arc::new(PageState {
        elements: Mutex::new(saved_search_page()),
        save_is_broken: true,
        ..PageState::default()
    });
    let factory = FakeFactory {
        state: Arc::clone(&state),
        refuse_acquire: false,
    };

    let mut script = scenario::saved_search(&config.target.url);
    if let Some(Step::WaitForText { timeout_ms, .. }) = script.steps.last_mut() {
        *timeout_ms = Some(300);
    }
    let result = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(result.status, Status::Failed);
    assert_eq!(
        result.failing_step.as_deref(),
        Some("wait for text 'Shiny Water'")
    );
    assert!(result.error_detail.as_deref().unwrap().contains("Shiny Water"));
    assert_eq!(result.artifact_path.as_deref(), Some(&*config.artifacts.failure_path));
    assert_eq!(state.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reruns_against_an_unchanged_page_agree_on_the_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let script = Script {
        name: "rerun".to_string(),
        steps: vec![
            Step::Navigate {
                url: config.target.url.clone(),
            },
            Step::Click {
                locator: LocatorSpec::title("Saved Searches"),
                timeout_ms: None,
            },
        ],
    };

    let (factory, state) = factory_with(saved_search_page());
    let first = orchestrator::run(&config, &factory, &script).await;
    let second = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(first.status, second.status);
    assert_eq!(first.status, Status::Completed);
    assert_eq!(state.close_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refused_session_fails_without_an_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let state = Arc::new(PageState::default());
    let factory = FakeFactory {
        state: Arc::clone(&state),
        refuse_acquire: true,
    };

    let script = scenario::saved_search(&config.target.url);
    let result = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(result.status, Status::Failed);
    assert!(result.failing_step.is_none());
    assert!(result
        .error_detail
        .as_deref()
        .unwrap()
        .contains("chrome executable not found"));
    assert!(result.artifact_path.is_none());
    assert_eq!(state.close_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_target_skips_diagnostics_but_still_releases() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let state = Arc::new(PageState {
        fail_navigation: true,
        ..PageState::default()
    });
    let factory = FakeFactory {
        state: Arc::clone(&state),
        refuse_acquire: false,
    };

    let script = Script {
        name: "unreachable".to_string(),
        steps: vec![Step::Navigate {
            url: "http://localhost:5173".to_string(),
        }],
    };
    let result = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(result.status, Status::Failed);
    assert!(result.artifact_path.is_none());
    assert!(!config.artifacts.failure_path.exists());
    assert_eq!(state.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_timeout_gives_an_absent_element_exactly_one_chance() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let (factory, state) = factory_with(vec![]);

    let script = Script {
        name: "impatient".to_string(),
        steps: vec![Step::Click {
            locator: LocatorSpec::css("#missing"),
            timeout_ms: Some(0),
        }],
    };
    let result = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(result.status, Status::Failed);
    assert!(result
        .error_detail
        .as_deref()
        .unwrap()
        .contains("Element not found"));
    assert_eq!(state.resolve_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn screenshot_trouble_does_not_change_the_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let state = Arc::new(PageState {
        elements: Mutex::new(saved_search_page()),
        fail_screenshots: true,
        ..PageState::default()
    });
    let factory = FakeFactory {
        state: Arc::clone(&state),
        refuse_acquire: false,
    };

    let script = scenario::saved_search(&config.target.url);
    let result = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(result.status, Status::Completed);
    assert!(result.artifact_path.is_none());
    assert_eq!(state.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn mid_script_screenshot_step_writes_its_own_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let (factory, _state) = factory_with(saved_search_page());

    let mid = dir.path().join("mid.png");
    let script = Script {
        name: "with-snapshot".to_string(),
        steps: vec![
            Step::Navigate {
                url: config.target.url.clone(),
            },
            Step::Screenshot { path: mid.clone() },
        ],
    };
    let result = orchestrator::run(&config, &factory, &script).await;

    assert_eq!(result.status, Status::Completed);
    assert!(mid.exists());
    // The final success artifact is written in addition to the step's.
    assert_eq!(
        result.artifact_path,
        Some(PathBuf::from(&config.artifacts.success_path))
    );
}
