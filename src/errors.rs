//! Error types shared by the keylogin client, controller and server.

use thiserror::Error;

/// Errors produced by keylogin operations.
///
/// The form controller never surfaces these to its caller; it folds them into
/// UI state. They are visible to code using the transport or config APIs
/// directly.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The validation endpoint could not be reached.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered, but the body was not the expected JSON.
    #[error("invalid server response: {0}")]
    InvalidResponse(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// File or socket I/O failed (local storage, server bind).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type LoginResult<T> = Result<T, LoginError>;

impl From<config::ConfigError> for LoginError {
    fn from(err: config::ConfigError) -> Self {
        LoginError::Config(err.to_string())
    }
}
