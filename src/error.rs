// Error types shared by the API client, the session and the command
// handlers. Every variant is printed by the handler that hit it; nothing
// here is allowed to end the interactive loop.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = CliError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Too few arguments for a command. Carries the usage line to show.
    #[error("{0}")]
    Usage(&'static str),

    /// Connection, DNS, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a status the caller does not accept.
    #[error("returned status code: {status}")]
    Status { status: StatusCode },

    #[error("failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no base64 `content` field")]
    MissingContent,

    #[error("failed to decode README content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("GitHub token is not set. Use 'set' to set your token first")]
    NotAuthenticated,

    #[error("invalid token (status: {status})")]
    TokenRejected { status: StatusCode },

    #[error("please enter a token")]
    EmptyToken,
}

impl CliError {
    /// True for the errors caused by a missing or refused token.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            CliError::NotAuthenticated | CliError::TokenRejected { .. } | CliError::EmptyToken
        )
    }

    /// Status code carried by the error, if the server produced one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CliError::Status { status } | CliError::TokenRejected { status } => Some(*status),
            CliError::Transport(e) => e.status(),
            _ => None,
        }
    }
}
