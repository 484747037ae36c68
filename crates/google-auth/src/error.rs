//! Error types for identity provider operations

/// Errors from identity provider calls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The authorization code or refresh token was rejected (expired, revoked,
    /// already used, or malformed).
    #[error("invalid grant: {0}")]
    InvalidGrant(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("profile request failed: {0}")]
    Profile(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}

/// Result alias for identity provider operations.
pub type Result<T> = std::result::Result<T, Error>;
