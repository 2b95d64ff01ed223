//! Line-delimited JSON protocol spoken with the Playwright driver
//!
//! Each request is one line on the driver's stdin:
//!
//! ```text
//! {"id":3,"method":"fill","params":{"selector":"#nip","value":"111-222-33-44"}}
//! ```
//!
//! Each reply is one line on its stdout, either
//! `{"id":3,"ok":true,"result":null}` or
//! `{"id":3,"ok":false,"error":{"kind":"not_found","message":"..."}}`.
//! Before any reply the driver emits exactly one `{"event":"ready"}` or
//! `{"event":"launch_failed","message":"..."}` line.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{VerifyError, VerifyResult};

/// Element state a wait resolves on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// A single driver request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "method",
    content = "params",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    Goto {
        url: String,
    },
    WaitForSelector {
        selector: String,
        timeout: u64,
        state: WaitState,
    },
    Reload,
    Evaluate {
        expression: String,
        arg: Value,
    },
    Fill {
        selector: String,
        value: String,
    },
    Click {
        selector: String,
        force: bool,
        timeout: u64,
    },
    ClickByTitle {
        title: String,
        force: bool,
        timeout: u64,
    },
    InputValue {
        selector: String,
    },
    Screenshot {
        path: PathBuf,
        full_page: bool,
    },
    ReadStorage {
        key: String,
    },
    Close,
}

impl Command {
    /// Short human-readable label used in logs and errors
    pub fn describe(&self) -> String {
        match self {
            Command::Goto { url } => format!("goto:{}", url),
            Command::WaitForSelector { selector, state, .. } => match state {
                WaitState::Visible => format!("wait:{}", selector),
                other => format!("wait:{}:{:?}", selector, other).to_lowercase(),
            },
            Command::Reload => "reload".to_string(),
            Command::Evaluate { .. } => "evaluate".to_string(),
            Command::Fill { selector, .. } => format!("fill:{}", selector),
            Command::Click { selector, force, .. } => {
                if *force {
                    format!("click(force):{}", selector)
                } else {
                    format!("click:{}", selector)
                }
            }
            Command::ClickByTitle { title, .. } => format!("click:[title={}]", title),
            Command::InputValue { selector } => format!("input_value:{}", selector),
            Command::Screenshot { path, .. } => format!("screenshot:{}", path.display()),
            Command::ReadStorage { key } => format!("storage:{}", key),
            Command::Close => "close".to_string(),
        }
    }

    /// Selector the command targets, if it targets one
    pub fn selector(&self) -> Option<String> {
        match self {
            Command::WaitForSelector { selector, .. }
            | Command::Fill { selector, .. }
            | Command::Click { selector, .. }
            | Command::InputValue { selector } => Some(selector.clone()),
            Command::ClickByTitle { title, .. } => Some(format!("[title=\"{}\"]", title)),
            _ => None,
        }
    }

    /// Timeout the driver enforces for this command, when it carries one
    pub fn timeout_ms(&self) -> Option<u64> {
        match self {
            Command::WaitForSelector { timeout, .. }
            | Command::Click { timeout, .. }
            | Command::ClickByTitle { timeout, .. } => Some(*timeout),
            _ => None,
        }
    }

    /// Encode as one protocol line (without the trailing newline)
    pub fn encode(&self, id: u64) -> VerifyResult<String> {
        let mut value = serde_json::to_value(self)?;
        match value.as_object_mut() {
            Some(object) => {
                object.insert("id".to_string(), Value::from(id));
            }
            None => {
                return Err(VerifyError::Protocol(format!(
                    "command {} did not encode as an object",
                    self.describe()
                )))
            }
        }
        Ok(serde_json::to_string(&value)?)
    }
}

/// Failure category reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    NotFound,
    Io,
    Protocol,
    #[serde(other)]
    Driver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Reply to a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub id: Option<u64>,
    pub ok: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<DriverFailure>,
}

impl Reply {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id: Some(id),
            ok: true,
            result,
            error: None,
        }
    }

    pub fn failure(id: u64, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ok: false,
            result: Value::Null,
            error: Some(DriverFailure {
                kind,
                message: message.into(),
            }),
        }
    }

    /// Map the reply onto the runner's error taxonomy.
    ///
    /// `default_timeout_ms` is the page default the driver applies to
    /// commands that carry no timeout of their own.
    pub fn into_result(self, command: &Command, default_timeout_ms: u64) -> VerifyResult<Value> {
        if self.ok {
            return Ok(self.result);
        }

        let failure = self.error.unwrap_or(DriverFailure {
            kind: FailureKind::Driver,
            message: "driver reported failure without details".to_string(),
        });

        Err(match failure.kind {
            FailureKind::Timeout => VerifyError::Timeout {
                what: command.selector().unwrap_or_else(|| command.describe()),
                timeout_ms: command.timeout_ms().unwrap_or(default_timeout_ms),
            },
            FailureKind::NotFound => VerifyError::ElementNotFound {
                selector: command.selector().unwrap_or_else(|| command.describe()),
            },
            FailureKind::Io => VerifyError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                failure.message,
            )),
            FailureKind::Protocol => VerifyError::Protocol(failure.message),
            FailureKind::Driver => VerifyError::Driver {
                step: command.describe(),
                message: failure.message,
            },
        })
    }
}

/// Any line the driver writes to stdout
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DriverMessage {
    Event {
        event: String,
        #[serde(default)]
        message: Option<String>,
    },
    Reply(Reply),
}

impl DriverMessage {
    pub fn parse(line: &str) -> VerifyResult<Self> {
        serde_json::from_str(line)
            .map_err(|e| VerifyError::Protocol(format!("invalid driver line {:?}: {}", line, e)))
    }
}
