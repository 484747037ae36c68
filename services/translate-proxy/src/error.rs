//! Handler error type and its HTTP mapping
//!
//! Authentication failures send the browser back through consent; everything
//! else is a JSON body of the form
//! `{"error": {"type", "message", "request_id"}}`.

use axum::http::StatusCode;
use axum::http::header::LOCATION;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::metrics::record_upstream_error;

pub const AUTH_PATH: &str = "/auth";

/// 302 Found to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// Fresh request id: `req_` followed by a simple-format UUID v4.
pub fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("credential refresh failed: {0}")]
    RefreshFailed(String),

    #[error("{service} request failed: {message}")]
    UpstreamFailure {
        service: &'static str,
        message: String,
    },

    #[error("credential storage failed: {0}")]
    Storage(String),
}

impl From<credentials::Error> for ApiError {
    fn from(err: credentials::Error) -> Self {
        use credentials::Error;
        match err {
            Error::NotAuthenticated(_) => ApiError::NotAuthenticated,
            Error::RefreshFailed(msg) => ApiError::RefreshFailed(msg),
            Error::InvalidTokenResponse(msg) => ApiError::UpstreamFailure {
                service: "google_oauth",
                message: msg,
            },
            Error::CredentialParse(msg) | Error::Io(msg) => ApiError::Storage(msg),
        }
    }
}

impl From<google_auth::Error> for ApiError {
    fn from(err: google_auth::Error) -> Self {
        ApiError::UpstreamFailure {
            service: "google_oauth",
            message: err.to_string(),
        }
    }
}

impl From<translate::Error> for ApiError {
    fn from(err: translate::Error) -> Self {
        match err {
            translate::Error::BadRequest(msg) => ApiError::InvalidParameter(msg),
            // Locally valid token rejected downstream: revoked consent
            translate::Error::Unauthorized(_) => ApiError::NotAuthenticated,
            other => ApiError::UpstreamFailure {
                service: "translate",
                message: other.to_string(),
            },
        }
    }
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingParameter(_) => "missing_parameter",
            ApiError::InvalidParameter(_) => "invalid_parameter",
            ApiError::NotAuthenticated | ApiError::RefreshFailed(_) => "not_authenticated",
            ApiError::UpstreamFailure { .. } => "upstream_failure",
            ApiError::Storage(_) => "storage_error",
        }
    }

    /// Log the failure and render it, tagging JSON bodies with `request_id`.
    pub fn into_response_with_id(self, request_id: &str) -> Response {
        let status = match &self {
            ApiError::NotAuthenticated => {
                info!(request_id, "not authenticated, redirecting to consent");
                return found(AUTH_PATH);
            }
            ApiError::RefreshFailed(msg) => {
                warn!(request_id, error = %msg, "refresh failed, redirecting to consent");
                return found(AUTH_PATH);
            }
            ApiError::MissingParameter(_) | ApiError::InvalidParameter(_) => {
                info!(request_id, error = %self, "rejected request");
                StatusCode::BAD_REQUEST
            }
            ApiError::UpstreamFailure { service, .. } => {
                record_upstream_error(*service);
                error!(request_id, error = %self, "upstream call failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Storage(_) => {
                error!(request_id, error = %self, "credential storage failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_response(status, self.kind(), &self.to_string(), request_id)
    }
}

fn error_response(status: StatusCode, kind: &str, message: &str, request_id: &str) -> Response {
    let body = serde_json::json!({
        "error": {
            "type": kind,
            "message": message,
            "request_id": request_id,
        }
    });
    (
        status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}
