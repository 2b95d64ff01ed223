//! Error types for front-end verification

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Browser failed to launch: {0}")]
    Launch(String),

    #[error("Timeout after {timeout_ms} ms waiting for: {what}")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("No element matches {selector}")]
    ElementNotFound { selector: String },

    #[error("Target {url} not reachable after {attempts} attempts")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("Driver error during {step}: {message}")]
    Driver { step: String, message: String },

    #[error("Driver protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl VerifyError {
    /// Whether this error came from a synchronization point running out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, VerifyError::Timeout { .. })
    }
}

pub type VerifyResult<T> = Result<T, VerifyError>;
