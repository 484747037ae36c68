//! Error types for translation calls

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input rejected locally, no request was sent.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The access token was rejected (401/403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(String),
}

pub type Result<T> = std::result::Result<T, Error>;
