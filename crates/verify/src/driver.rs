//! Seam between a session and the browser automation engine

use async_trait::async_trait;
use serde_json::Value;

use crate::error::VerifyResult;
use crate::protocol::Command;

/// Executes driver commands against one browser page.
///
/// Implementations answer one command at a time; a session never issues a
/// command before the previous one has returned.
#[async_trait]
pub trait Driver: Send {
    /// Execute a command and return its result value
    async fn call(&mut self, command: Command) -> VerifyResult<Value>;

    /// Close the browser and release the underlying process
    async fn shutdown(&mut self) -> VerifyResult<()>;
}
