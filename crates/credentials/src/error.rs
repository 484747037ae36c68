//! Error types for credential operations

/// Errors from credential lookup, refresh, and persistence.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No credential stored for this subject.
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// The stored access token expired and could not be renewed.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),

    #[error("credential parse error: {0}")]
    CredentialParse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result alias for credential operations.
pub type Result<T> = std::result::Result<T, Error>;
