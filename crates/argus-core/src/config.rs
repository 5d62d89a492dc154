use crate::error::CoreError;
use ::config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::{collections::HashMap, path::Path, path::PathBuf, time::Duration};

// Helper for deserializing Duration from milliseconds
pub mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// Main configuration structure
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)] // Ensure fields default if missing in config source
pub struct Config {
    pub global: GlobalConfig,
    pub target: TargetConfig,
    pub browser: BrowserLaunchConfig,
    pub artifacts: ArtifactConfig,
}

// Global settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
    /// Bound applied to a step when the step itself does not carry one.
    #[serde(with = "duration_ms_serde")]
    pub default_step_timeout: Duration,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_step_timeout: Duration::from_secs(5),
        }
    }
}

// The application under verification
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TargetConfig {
    /// Base URL of the running application under test.
    pub url: String,
    /// Bound on the initial navigation's network-idle wait. Elapsing this
    /// bound leaves the page partially loaded; it does not fail acquisition.
    #[serde(with = "duration_ms_serde")]
    pub navigation_timeout: Duration,
    /// Quiet window with no pending network activity that counts as "idle".
    #[serde(with = "duration_ms_serde")]
    pub quiet_window: Duration,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:5173".to_string(),
            navigation_timeout: Duration::from_secs(60),
            quiet_window: Duration::from_millis(500),
        }
    }
}

// Configuration for launching and connecting to the browser instance
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BrowserLaunchConfig {
    pub executable_path: Option<PathBuf>,
    pub user_data_dir: Option<PathBuf>,
    pub headless: bool,
    pub args: Vec<String>,
    pub env_vars: HashMap<String, String>,
    /// Fixed debugging port; picked automatically when absent.
    pub remote_debugging_port: Option<u16>,
    #[serde(with = "duration_ms_serde")]
    pub connect_timeout: Duration,
}

impl Default for BrowserLaunchConfig {
    fn default() -> Self {
        Self {
            executable_path: None,
            user_data_dir: None,
            headless: true,
            args: vec![],
            env_vars: HashMap::new(),
            remote_debugging_port: None,
            connect_timeout: Duration::from_secs(20),
        }
    }
}

// Where run outcomes leave their screenshots
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Screenshot written when a run completes. Overwritten on each run.
    pub success_path: PathBuf,
    /// Screenshot written when a run fails. Overwritten on each run.
    pub failure_path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            success_path: PathBuf::from("verification/verified.png"),
            failure_path: PathBuf::from("verification/error.png"),
        }
    }
}

/// Loads configuration from default locations and environment variables.
///
/// Looks for `argus.toml` in the current directory.
/// Overrides with environment variables prefixed with `ARGUS_`.
/// (e.g., `ARGUS_GLOBAL__LOG_LEVEL=debug`, `ARGUS_TARGET__URL=http://host:1234`)
/// Note the double underscore `__` for nested fields.
pub fn load_config() -> Result<Config, CoreError> {
    load_config_from(None)
}

/// Same as [`load_config`], but reads the named file instead of `argus.toml`.
pub fn load_config_from(path: Option<&Path>) -> Result<Config, CoreError> {
    let file_source = match path {
        Some(p) => File::from(p.to_path_buf()).required(true),
        None => File::with_name("argus").required(false),
    };

    let builder = ConfigLoader::builder()
        .set_default("global.log_level", "info")?
        .set_default("global.default_step_timeout", 5000u64)?
        .set_default("target.url", "http://localhost:5173")?
        .set_default("target.navigation_timeout", 60000u64)?
        .set_default("target.quiet_window", 500u64)?
        .set_default("browser.headless", true)?
        .set_default("browser.connect_timeout", 20000u64)?
        .set_default("artifacts.success_path", "verification/verified.png")?
        .set_default("artifacts.failure_path", "verification/error.png")?
        .add_source(file_source)
        .add_source(
            Environment::with_prefix("ARGUS")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    builder.try_deserialize().map_err(CoreError::ConfigLoad)
}
