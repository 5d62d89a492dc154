//! Scripted UI verification against a running web application.
//!
//! The harness launches a real headless browser, drives it through a list
//! of user-like steps (fill, click, press key, wait), and reports a single
//! pass/fail verdict with a screenshot of the final page state.

pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod locator;
pub mod orchestrator;
pub mod scenario;
pub mod script;
pub mod session;
pub mod wait;

pub use crate::driver::{Driver, DriverFactory, ElementHandle};
pub use crate::error::HarnessError;
pub use crate::orchestrator::{run, RunState, Status, VerificationResult};
pub use crate::script::{LocatorSpec, Script, Step, Strategy};
pub use crate::session::{ChromeSession, ChromeSessionFactory};
pub use crate::wait::{wait_until, WaitCondition};
