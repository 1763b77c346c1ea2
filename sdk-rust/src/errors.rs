use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// A local precondition failed. No request was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The request to the service failed or the response body could not be
    /// read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The request returns a non-OK status code without a readable message
    #[error("Status error: {1} (Status {0})")]
    StatusCode(reqwest::StatusCode, String),
    /// The service reported a failure (`success: false`, or an `error` /
    /// `detail` message on a failed status).
    #[error("Remote error: {0}")]
    Remote(String),
    /// The response from the service did not have the expected shape.
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
    /// Reading or writing persisted configuration failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Coarse classification used by callers that only care about where a
/// failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    Remote,
    Storage,
}

impl ClientError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::Transport(_) | Self::StatusCode(..) => ErrorKind::Transport,
            Self::Remote(_) | Self::Invariant(..) => ErrorKind::Remote,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// The message without the classification prefix, suitable for showing
    /// to a user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(message) | Self::Remote(message) | Self::Storage(message) => {
                message.clone()
            }
            Self::Transport(error) => error.to_string(),
            Self::StatusCode(status, body) if body.trim().is_empty() => {
                format!("Request failed with status {status}")
            }
            Self::StatusCode(status, body) => format!("{body} (status {status})"),
            Self::Invariant(_, message) => message.clone(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
