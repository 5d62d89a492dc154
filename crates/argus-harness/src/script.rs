//! Verification scripts: an ordered list of user-like steps against one page.
//!
//! Scripts are plain data. They come either from a JSON file or from the
//! built-in scenario, and the orchestrator executes them without any control
//! flow of its own: first failing step ends the run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// How a locator's value is matched against the DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Match the `placeholder` attribute of form controls.
    Placeholder,
    /// Match an ARIA role (explicit or implicit) plus the accessible name.
    RoleAndName,
    /// Match the `title` attribute.
    TitleAttribute,
    /// Match rendered text, preferring the innermost element that carries it.
    TextContent,
    /// Raw CSS selector, passed through unchanged.
    CssSelector,
}

/// A way to find one element. When several elements match, the first in DOM
/// order wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatorSpec {
    pub strategy: Strategy,
    /// Role to require; only meaningful for [`Strategy::RoleAndName`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub value: String,
    /// Exact match instead of substring match. Distinguishes "Save" from
    /// "Saved Searches".
    #[serde(default)]
    pub exact: bool,
}

impl LocatorSpec {
    pub fn placeholder(value: &str) -> Self {
        Self {
            strategy: Strategy::Placeholder,
            role: None,
            value: value.to_string(),
            exact: false,
        }
    }

    pub fn role_and_name(role: &str, name: &str) -> Self {
        Self {
            strategy: Strategy::RoleAndName,
            role: Some(role.to_string()),
            value: name.to_string(),
            exact: false,
        }
    }

    pub fn title(value: &str) -> Self {
        Self {
            strategy: Strategy::TitleAttribute,
            role: None,
            value: value.to_string(),
            exact: true,
        }
    }

    pub fn text(value: &str) -> Self {
        Self {
            strategy: Strategy::TextContent,
            role: None,
            value: value.to_string(),
            exact: false,
        }
    }

    pub fn css(selector: &str) -> Self {
        Self {
            strategy: Strategy::CssSelector,
            role: None,
            value: selector.to_string(),
            exact: false,
        }
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn describe(&self) -> String {
        match self.strategy {
            Strategy::Placeholder => format!("placeholder '{}'", self.value),
            Strategy::RoleAndName => format!(
                "{} '{}'",
                self.role.as_deref().unwrap_or("element"),
                self.value
            ),
            Strategy::TitleAttribute => format!("title '{}'", self.value),
            Strategy::TextContent => format!("text '{}'", self.value),
            Strategy::CssSelector => format!("selector '{}'", self.value),
        }
    }
}

/// One user-like action. Steps that look for elements carry an optional
/// per-step timeout; absent, the configured default applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Navigate {
        url: String,
    },
    Fill {
        locator: LocatorSpec,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    Click {
        locator: LocatorSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    /// Press a named key. With a locator the element is focused first;
    /// without one the key goes to whatever currently holds focus.
    PressKey {
        key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locator: Option<LocatorSpec>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    WaitForText {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timeout_ms: Option<u64>,
    },
    /// Capture the current viewport mid-run, independent of the final
    /// success/failure artifacts.
    Screenshot {
        path: PathBuf,
    },
}

impl Step {
    /// Per-step timeout override, when the step carries one.
    pub fn timeout(&self) -> Option<Duration> {
        let ms = match self {
            Step::Fill { timeout_ms, .. }
            | Step::Click { timeout_ms, .. }
            | Step::PressKey { timeout_ms, .. }
            | Step::WaitForText { timeout_ms, .. } => *timeout_ms,
            Step::Navigate { .. } | Step::Screenshot { .. } => None,
        };
        ms.map(Duration::from_millis)
    }

    pub fn describe(&self) -> String {
        match self {
            Step::Navigate { url } => format!("navigate to {}", url),
            Step::Fill { locator, text, .. } => {
                format!("fill {} with '{}'", locator.describe(), text)
            }
            Step::Click { locator, .. } => format!("click {}", locator.describe()),
            Step::PressKey {
                key,
                locator: Some(locator),
                ..
            } => format!("press {} on {}", key, locator.describe()),
            Step::PressKey { key, locator: None, .. } => format!("press {}", key),
            Step::WaitForText { text, .. } => format!("wait for text '{}'", text),
            Step::Screenshot { path } => format!("screenshot to {}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, HarnessError> {
        let script: Script = serde_json::from_str(json)
            .map_err(|e| HarnessError::InvalidScript(e.to_string()))?;
        if script.steps.is_empty() {
            return Err(HarnessError::InvalidScript(format!(
                "script '{}' has no steps",
                script.name
            )));
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::InvalidScript(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }
}
