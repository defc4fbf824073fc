use std::io;

use thiserror::Error;

/// Failure of a workflow operation. `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Required input missing or blank.
    #[error("{0}")]
    Validation(String),
    /// Backend answered with a non-2xx status.
    #[error("Error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Connection-level failure.
    #[error("{0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("response too large (max {max_bytes} bytes, got {actual})")]
    TooLarge { max_bytes: u64, actual: u64 },
    #[error("save failed: {0}")]
    Save(String),
    #[error("invalid backend address: {0}")]
    Config(String),
}

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return WorkflowError::Timeout(err.to_string());
        }
        if err.is_decode() {
            return WorkflowError::Decode(err.to_string());
        }
        WorkflowError::Transport(err.to_string())
    }
}

impl From<io::Error> for WorkflowError {
    fn from(err: io::Error) -> Self {
        WorkflowError::Save(err.to_string())
    }
}
