//! Browser session: one driver, one page, exclusively owned by one procedure
//!
//! Every request to the driver is bounded: the request's own timeout (or the
//! configured default) plus a fixed slack. A hung driver therefore surfaces
//! as a [`VerifyError::Timeout`] instead of blocking the procedure forever.

use std::path::Path;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::VerifyConfig;
use crate::driver::Driver;
use crate::error::{VerifyError, VerifyResult};
use crate::playwright::PlaywrightDriver;
use crate::protocol::{Command, WaitState};

pub struct Session {
    driver: Box<dyn Driver>,
    base_url: String,
    default_timeout: Duration,
    slack: Duration,
    closed: bool,
}

impl Session {
    /// Launch a browser through Playwright and open one page
    pub async fn open(config: &VerifyConfig) -> VerifyResult<Self> {
        let driver = PlaywrightDriver::launch(config).await?;
        Ok(Self::with_driver(Box::new(driver), config))
    }

    /// Wrap an already running driver
    pub fn with_driver(driver: Box<dyn Driver>, config: &VerifyConfig) -> Self {
        Self {
            driver,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_timeout: config.default_timeout(),
            slack: config.driver_slack(),
            closed: false,
        }
    }

    /// Open a session, run `procedure` in it and close it on every exit path
    pub async fn scoped<T, F>(config: &VerifyConfig, procedure: F) -> VerifyResult<T>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, VerifyResult<T>>,
    {
        Self::open(config).await?.run(procedure).await
    }

    /// Run `procedure` in this session and close it afterwards, whatever the outcome
    pub async fn run<T, F>(mut self, procedure: F) -> VerifyResult<T>
    where
        F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, VerifyResult<T>>,
    {
        let result = procedure(&mut self).await;
        if let Err(e) = self.close().await {
            warn!("Failed to close browser session cleanly: {}", e);
        }
        result
    }

    /// Close the browser and terminate the driver
    pub async fn close(mut self) -> VerifyResult<()> {
        self.closed = true;
        self.driver.shutdown().await
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs pass through; paths are joined onto the base URL
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    async fn dispatch(&mut self, command: Command) -> VerifyResult<Value> {
        let label = command.describe();
        let budget = command
            .timeout_ms()
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout)
            + self.slack;

        debug!("{}", label);
        let start = Instant::now();
        let result = tokio::time::timeout(budget, self.driver.call(command)).await;
        debug!("{} finished in {} ms", label, start.elapsed().as_millis());

        match result {
            Ok(result) => result,
            Err(_) => Err(VerifyError::Timeout {
                what: label,
                timeout_ms: budget.as_millis() as u64,
            }),
        }
    }

    /// Request navigation; readiness is established by a following wait
    pub async fn goto(&mut self, url: &str) -> VerifyResult<()> {
        let url = self.resolve_url(url);
        info!("Navigating to {}", url);
        self.dispatch(Command::Goto { url }).await?;
        Ok(())
    }

    /// Block until an element matching `selector` is visible
    pub async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> VerifyResult<()> {
        self.wait_for_state(selector, timeout, WaitState::Visible).await
    }

    /// Block until no visible element matches `selector`
    pub async fn wait_for_absent(
        &mut self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> VerifyResult<()> {
        self.wait_for_state(selector, timeout, WaitState::Hidden).await
    }

    async fn wait_for_state(
        &mut self,
        selector: &str,
        timeout: Option<Duration>,
        state: WaitState,
    ) -> VerifyResult<()> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        self.dispatch(Command::WaitForSelector {
            selector: selector.to_string(),
            timeout: timeout.as_millis() as u64,
            state,
        })
        .await?;
        Ok(())
    }

    /// Reload the current page; local storage survives
    pub async fn reload(&mut self) -> VerifyResult<()> {
        info!("Reloading page");
        self.dispatch(Command::Reload).await?;
        Ok(())
    }

    /// Evaluate a function expression in the page, passing `arg` to it
    pub async fn evaluate(&mut self, expression: &str, arg: Value) -> VerifyResult<Value> {
        self.dispatch(Command::Evaluate {
            expression: expression.to_string(),
            arg,
        })
        .await
    }

    /// Set a field's value directly, without simulated keystrokes
    pub async fn fill(&mut self, selector: &str, value: &str) -> VerifyResult<()> {
        debug!("Filling {} = {:?}", selector, value);
        self.dispatch(Command::Fill {
            selector: selector.to_string(),
            value: value.to_string(),
        })
        .await?;
        Ok(())
    }

    /// Click a control; `force` skips the actionability checks
    pub async fn click(&mut self, selector: &str, force: bool) -> VerifyResult<()> {
        let timeout = self.default_timeout.as_millis() as u64;
        self.dispatch(Command::Click {
            selector: selector.to_string(),
            force,
            timeout,
        })
        .await?;
        Ok(())
    }

    /// Click the element carrying the given `title` attribute
    pub async fn click_by_title(&mut self, title: &str, force: bool) -> VerifyResult<()> {
        let timeout = self.default_timeout.as_millis() as u64;
        self.dispatch(Command::ClickByTitle {
            title: title.to_string(),
            force,
            timeout,
        })
        .await?;
        Ok(())
    }

    /// Wait for `overlay` to disappear, then click unforced.
    ///
    /// Falls back to a forced click when the overlay is still there after
    /// `overlay_timeout`.
    pub async fn settle_and_click(
        &mut self,
        selector: &str,
        overlay: &str,
        overlay_timeout: Duration,
    ) -> VerifyResult<()> {
        match self.wait_for_absent(overlay, Some(overlay_timeout)).await {
            Ok(()) => self.click(selector, false).await,
            Err(e) if e.is_timeout() => {
                warn!("{} still covers the page, forcing click on {}", overlay, selector);
                self.click(selector, true).await
            }
            Err(e) => Err(e),
        }
    }

    /// Current value of a form field
    pub async fn input_value(&mut self, selector: &str) -> VerifyResult<String> {
        let value = self
            .dispatch(Command::InputValue {
                selector: selector.to_string(),
            })
            .await?;
        match value {
            Value::String(s) => Ok(s),
            other => Err(VerifyError::Protocol(format!(
                "input value of {} is not a string: {}",
                selector, other
            ))),
        }
    }

    /// Write a full-page PNG, creating parent directories as needed.
    ///
    /// Relative paths are taken against this process's working directory,
    /// not the driver's.
    pub async fn screenshot(&mut self, path: &Path) -> VerifyResult<()> {
        let path = std::env::current_dir()?.join(path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        self.dispatch(Command::Screenshot {
            path: path.clone(),
            full_page: true,
        })
        .await?;
        info!("Screenshot saved to {}", path.display());
        Ok(())
    }

    /// Raw local storage value under `key`
    pub async fn read_storage(&mut self, key: &str) -> VerifyResult<Option<String>> {
        let value = self
            .dispatch(Command::ReadStorage {
                key: key.to_string(),
            })
            .await?;
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(VerifyError::Protocol(format!(
                "storage value for {} is not a string: {}",
                key, other
            ))),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            // The driver process is spawned kill-on-drop; this only records it.
            warn!("Browser session dropped without close; driver will be killed");
        }
    }
}
