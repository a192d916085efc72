use shared::{domain::TaskId, error::ApiError};
use thiserror::Error;

/// Failure of a single request against the remote task API.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with {status}: {error}")]
    Server { status: u16, error: ApiError },
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
    /// The request could not be addressed; nothing was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl SyncError {
    pub fn server(status: u16, body: &str) -> Self {
        Self::Server {
            status,
            error: ApiError::from_response(status, body),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => Self::server(status.as_u16(), &value.to_string()),
            None => Self::Network(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ControllerError {
    #[error("task text must not be empty")]
    EmptyText,
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
    #[error("index {index} is out of range for {len} tasks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("task controller is no longer running")]
    ControllerStopped,
}

impl ControllerError {
    /// True when the error came back from the remote side rather than a local
    /// precondition.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Sync(_))
    }
}
