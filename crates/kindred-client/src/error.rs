use kindred_shared::ValidationError;
use thiserror::Error;

/// Errors produced by the client layer.
///
/// `Clone` so the query cache can keep the last error of a key alongside
/// its data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No authenticated identity is present.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The backend client handle has not been built yet.
    #[error("Backend client not available")]
    ClientUnavailable,

    /// A read whose prerequisite data is missing was not executed.
    #[error("Query {0} is disabled")]
    QueryDisabled(String),

    /// Network-level failure (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The backend answered with a body that does not match the operation.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Rejected client-side; no remote call was issued.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend exposes no operation for this capability.
    #[error("Unsupported by the backend: {0}")]
    Unsupported(&'static str),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<kindred_shared::IdentityError> for ClientError {
    fn from(e: kindred_shared::IdentityError) -> Self {
        ClientError::Identity(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
