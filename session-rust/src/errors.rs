use drivegen_sdk::{ClientError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request failed a local check. Nothing was sent.
    #[error("Validation error: {0}")]
    Validation(String),
    /// The service could not be reached or answered with a failed status.
    #[error("Transport error: {}", .0.user_message())]
    Transport(#[source] ClientError),
    /// The service answered but reported a failure or an unusable result.
    #[error("Remote error: {0}")]
    Remote(String),
}

impl GenerationError {
    /// The message without the classification prefix.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Remote(message) => message.clone(),
            Self::Transport(error) => error.user_message(),
        }
    }
}

impl From<ClientError> for GenerationError {
    fn from(error: ClientError) -> Self {
        match error.kind() {
            ErrorKind::Validation => Self::Validation(error.user_message()),
            ErrorKind::Transport | ErrorKind::Storage => Self::Transport(error),
            ErrorKind::Remote => Self::Remote(error.user_message()),
        }
    }
}
