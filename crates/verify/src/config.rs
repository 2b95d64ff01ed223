//! Runner configuration
//!
//! Values come from an optional TOML file and are then overridden by
//! command-line flags. A missing file means defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};

/// Browser engine the driver launches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

/// Verification runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Origin serving the built front-end
    pub base_url: String,

    /// Page viewport
    pub viewport: Viewport,

    /// Browser engine
    pub browser: Browser,

    /// Run the browser without a window
    pub headless: bool,

    /// Node.js executable used to host the Playwright driver
    pub node_binary: PathBuf,

    /// Directory whose node_modules provides `playwright`
    pub driver_dir: PathBuf,

    /// Root that relative screenshot paths are resolved against
    pub output_dir: PathBuf,

    /// Timeout for hard waits and interactions without an explicit bound
    pub default_timeout_ms: u64,

    /// Timeout for the driver to report the browser as ready
    pub launch_timeout_ms: u64,

    /// Extra time granted on top of a request's own timeout before the
    /// runner gives up on the driver
    pub driver_slack_ms: u64,

    /// Local storage key holding the estimate list
    pub storage_key: String,

    /// How long to poll the target before a run when probing is enabled
    pub probe_timeout_ms: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4173".to_string(),
            viewport: Viewport::default(),
            browser: Browser::Chromium,
            headless: true,
            node_binary: PathBuf::from("node"),
            driver_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            default_timeout_ms: 30_000,
            launch_timeout_ms: 30_000,
            driver_slack_ms: 5_000,
            storage_key: "estimates".to_string(),
            probe_timeout_ms: 10_000,
        }
    }
}

impl VerifyConfig {
    /// Load configuration from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> VerifyResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> VerifyResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the driver cannot work with
    pub fn validate(&self) -> VerifyResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(VerifyError::Config(format!(
                "base_url must be an http(s) origin, got '{}'",
                self.base_url
            )));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(VerifyError::Config("viewport dimensions must be non-zero".to_string()));
        }
        if self.storage_key.is_empty() {
            return Err(VerifyError::Config("storage_key must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_millis(self.launch_timeout_ms)
    }

    pub fn driver_slack(&self) -> Duration {
        Duration::from_millis(self.driver_slack_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Resolve a checkpoint path against the output directory
    pub fn output_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.output_dir.join(relative)
    }
}
