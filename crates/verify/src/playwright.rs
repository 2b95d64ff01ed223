//! Playwright browser automation over a long-lived Node.js driver process

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::VerifyConfig;
use crate::driver::Driver;
use crate::error::{VerifyError, VerifyResult};
use crate::protocol::{Command, DriverMessage};

/// Driver program evaluated by `node -e`
const DRIVER_SOURCE: &str = include_str!("../driver/playwright-driver.js");

/// Environment variable carrying launch options to the driver
const OPTIONS_ENV: &str = "FACHOWIEC_DRIVER_OPTIONS";

/// How long `shutdown` waits for the driver to exit on its own
const EXIT_GRACE: Duration = Duration::from_secs(5);

/// Handle to a running Playwright driver
pub struct PlaywrightDriver {
    child: Child,
    reader: Lines<BufReader<ChildStdout>>,
    writer: BufWriter<ChildStdin>,
    next_id: u64,
    default_timeout_ms: u64,
}

impl PlaywrightDriver {
    /// Spawn the driver and wait until it reports the browser as ready
    pub async fn launch(config: &VerifyConfig) -> VerifyResult<Self> {
        let options = launch_options(config);

        info!(
            "Launching {} (headless: {}, viewport {}x{})",
            config.browser.as_str(),
            config.headless,
            config.viewport.width,
            config.viewport.height
        );

        // `-e` resolves require() from the working directory, which is where
        // the project's node_modules lives.
        let mut child = TokioCommand::new(&config.node_binary)
            .arg("-e")
            .arg(DRIVER_SOURCE)
            .current_dir(&config.driver_dir)
            .env(OPTIONS_ENV, options.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                VerifyError::Launch(format!(
                    "failed to spawn {}: {}",
                    config.node_binary.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VerifyError::Launch("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| VerifyError::Launch("driver stdout unavailable".to_string()))?;

        let mut driver = Self {
            child,
            reader: BufReader::new(stdout).lines(),
            writer: BufWriter::new(stdin),
            next_id: 1,
            default_timeout_ms: config.default_timeout_ms,
        };

        match timeout(config.launch_timeout(), driver.wait_ready()).await {
            Ok(Ok(())) => {
                debug!("Driver ready (pid: {:?})", driver.child.id());
                Ok(driver)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(VerifyError::Launch(format!(
                "browser not ready after {} ms",
                config.launch_timeout_ms
            ))),
        }
    }

    async fn wait_ready(&mut self) -> VerifyResult<()> {
        loop {
            let line = self.next_line().await?.ok_or_else(|| {
                VerifyError::Launch("driver exited before the browser was ready".to_string())
            })?;

            match DriverMessage::parse(&line) {
                Ok(DriverMessage::Event { event, message }) => match event.as_str() {
                    "ready" => return Ok(()),
                    "launch_failed" => {
                        return Err(VerifyError::Launch(
                            message.unwrap_or_else(|| "unknown launch failure".to_string()),
                        ))
                    }
                    other => debug!("Ignoring driver event before ready: {}", other),
                },
                Ok(DriverMessage::Reply(reply)) => {
                    debug!("Ignoring reply before ready: {:?}", reply.id)
                }
                Err(_) => debug!("driver: {}", line),
            }
        }
    }

    async fn next_line(&mut self) -> VerifyResult<Option<String>> {
        Ok(self.reader.next_line().await?)
    }

    async fn send(&mut self, id: u64, command: &Command) -> VerifyResult<()> {
        let line = command.encode(id)?;
        debug!("driver >>> {}", line);
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read lines until the reply for `id` arrives
    async fn receive(&mut self, id: u64, command: &Command) -> VerifyResult<Value> {
        loop {
            let line = self.next_line().await?.ok_or_else(|| VerifyError::Driver {
                step: command.describe(),
                message: "driver exited unexpectedly".to_string(),
            })?;
            debug!("driver <<< {}", line);

            match DriverMessage::parse(&line) {
                Ok(DriverMessage::Reply(reply)) if reply.id == Some(id) => {
                    return reply.into_result(command, self.default_timeout_ms)
                }
                Ok(DriverMessage::Reply(reply)) => {
                    warn!("Discarding stale driver reply {:?}", reply.id);
                }
                Ok(DriverMessage::Event { event, .. }) => debug!("driver event: {}", event),
                // Playwright occasionally prints plain text to stdout
                Err(_) => {}
            }
        }
    }

    /// Terminate the process, gracefully first
    async fn terminate(&mut self) -> VerifyResult<()> {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                if kill(Pid::from_raw(pid as i32), Signal::SIGTERM).is_ok()
                    && timeout(Duration::from_millis(500), self.child.wait()).await.is_ok()
                {
                    return Ok(());
                }
            }
        }

        self.child.kill().await?;
        Ok(())
    }
}

#[async_trait]
impl Driver for PlaywrightDriver {
    async fn call(&mut self, command: Command) -> VerifyResult<Value> {
        let id = self.next_id;
        self.next_id += 1;

        self.send(id, &command).await?;
        self.receive(id, &command).await
    }

    async fn shutdown(&mut self) -> VerifyResult<()> {
        info!("Closing browser (pid: {:?})", self.child.id());

        match timeout(EXIT_GRACE, self.call(Command::Close)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("Browser close request failed: {}", e),
            Err(_) => warn!("Browser close request timed out"),
        }
        // EOF on stdin ends the driver's request loop
        let _ = self.writer.shutdown().await;

        match timeout(EXIT_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!("Driver exited with {}", status);
                Ok(())
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                warn!("Driver did not exit within {:?}, terminating", EXIT_GRACE);
                self.terminate().await
            }
        }
    }
}

/// Launch options handed to the driver through the environment
fn launch_options(config: &VerifyConfig) -> Value {
    json!({
        "browser": config.browser.as_str(),
        "headless": config.headless,
        "viewport": {
            "width": config.viewport.width,
            "height": config.viewport.height,
        },
        "defaultTimeout": config.default_timeout_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Browser, Viewport};

    #[test]
    fn test_launch_options_carry_viewport_and_browser() {
        let config = VerifyConfig {
            browser: Browser::Webkit,
            headless: false,
            viewport: Viewport {
                width: 1024,
                height: 768,
            },
            ..Default::default()
        };
        let options = launch_options(&config);
        assert_eq!(options["browser"], "webkit");
        assert_eq!(options["headless"], false);
        assert_eq!(options["viewport"]["width"], 1024);
        assert_eq!(options["defaultTimeout"], 30_000);
    }

    #[test]
    fn test_driver_source_handles_every_method() {
        for method in [
            "goto",
            "waitForSelector",
            "reload",
            "evaluate",
            "fill",
            "click",
            "clickByTitle",
            "inputValue",
            "screenshot",
            "readStorage",
            "close",
        ] {
            assert!(
                DRIVER_SOURCE.contains(&format!("{}: async", method)),
                "driver has no handler for {}",
                method
            );
        }
    }

    #[tokio::test]
    async fn test_missing_node_binary_is_launch_error() {
        let config = VerifyConfig {
            node_binary: "/nonexistent/node-for-fachowiec-verify".into(),
            ..Default::default()
        };
        match PlaywrightDriver::launch(&config).await {
            Err(VerifyError::Launch(message)) => assert!(message.contains("failed to spawn")),
            Err(other) => panic!("expected launch error, got {}", other),
            Ok(_) => panic!("launch unexpectedly succeeded"),
        }
    }
}
