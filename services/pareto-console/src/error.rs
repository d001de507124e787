//! Error types for the Pareto console

use pareto_model::{ModelError, RequestError, ValidationError};

/// Errors that can occur in the console
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Not logged in. Run `pareto-console login` first.")]
    NotAuthenticated,

    #[error("{0}")]
    PasswordSetupRequired(String),

    #[error("{0}")]
    Unsupported(&'static str),

    #[error("Session store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConsoleError {
    /// True when the server rejected the session token
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ConsoleError::Request(e) if e.is_auth_failure())
            || matches!(self, ConsoleError::NotAuthenticated)
    }

    /// Message for an error alert
    pub fn user_message(&self) -> String {
        match self {
            ConsoleError::Request(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;
