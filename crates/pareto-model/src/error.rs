//! Error types shared by the dashboard clients

/// Failure of a single API request.
///
/// The three layers mirror how the API can fail: the request never got a
/// response, the response carried a non-2xx status, or a 2xx body reported
/// `success: false`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Application(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl RequestError {
    /// True when the server rejected the credentials or session token
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RequestError::Http { status, .. } if *status == 401 || *status == 403)
    }

    /// Message suitable for an error alert
    pub fn user_message(&self) -> String {
        match self {
            RequestError::Network(_) => "Network error. Please try again.".to_string(),
            RequestError::Http { message, .. } => message.clone(),
            RequestError::Application(message) => message.clone(),
            RequestError::Decode(_) => "Unexpected response from server".to_string(),
        }
    }
}

/// Client-side validation failure, raised before any request is sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid token file: {0}")]
    InvalidToken(String),
}

/// Errors raised by the view state machines
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid screen transition: {event} while {state}")]
    Transition { state: String, event: String },

    #[error("Unknown page: {0}")]
    UnknownPage(String),

    #[error("Unknown theme: {0}")]
    UnknownTheme(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
