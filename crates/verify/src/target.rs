//! Reachability probe for the front-end under test
//!
//! The runner never starts the server; it only checks that something answers
//! at the base URL before spending time launching a browser.

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{VerifyError, VerifyResult};

/// Poll `base_url` until it answers with a success status or `timeout` elapses
pub async fn wait_until_reachable(base_url: &str, timeout: Duration) -> VerifyResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("Front-end is reachable at {}", base_url);
                return Ok(());
            }
            Ok(resp) => {
                warn!("{} returned {}", base_url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for front-end at {}...", base_url);
                }
                // Connection refused is expected while the server is starting
                if !e.is_connect() {
                    warn!("Probe error: {}", e);
                }
            }
        }

        if start.elapsed() >= timeout {
            return Err(VerifyError::TargetUnreachable {
                url: base_url.to_string(),
                attempts,
            });
        }

        sleep(Duration::from_millis(100)).await;
    }
}
