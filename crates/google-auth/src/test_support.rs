//! In-process mock of Google's token and userinfo endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::config::OAuthConfig;

type Captured = Arc<Mutex<Option<HashMap<String, String>>>>;

pub struct MockGoogle {
    pub url: String,
    last_form: Captured,
}

impl MockGoogle {
    /// Bind on an ephemeral port and serve:
    /// - code `abc` exchanges to `at_abc` / `rt_abc`, anything else is `invalid_grant`
    /// - refresh token `revoked` is `invalid_grant`, others mint `at_refreshed_<rt>`
    /// - userinfo rejects bearer `expired`, otherwise returns subject `u1`
    pub async fn start() -> Self {
        let last_form: Captured = Arc::new(Mutex::new(None));
        let app = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get(userinfo))
            .with_state(last_form.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            last_form,
        }
    }

    pub async fn last_token_form(&self) -> Option<HashMap<String, String>> {
        self.last_form.lock().await.clone()
    }
}

pub fn test_config(base: &str) -> OAuthConfig {
    OAuthConfig {
        authorize_endpoint: format!("{base}/auth"),
        token_endpoint: format!("{base}/token"),
        userinfo_endpoint: format!("{base}/userinfo"),
        ..OAuthConfig::new(
            "test-client",
            "test-secret".into(),
            "http://localhost/oauth/callback",
        )
    }
}

async fn token(
    State(last_form): State<Captured>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<serde_json::Value>) {
    *last_form.lock().await = Some(form.clone());

    let invalid_grant = (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "invalid_grant", "error_description": "Bad Request"})),
    );

    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code") if form.get("code").map(String::as_str) == Some("abc") => (
            StatusCode::OK,
            Json(json!({
                "access_token": "at_abc",
                "refresh_token": "rt_abc",
                "expires_in": 3600,
                "token_type": "Bearer"
            })),
        ),
        Some("refresh_token") => match form.get("refresh_token").map(String::as_str) {
            Some("revoked") | None => invalid_grant,
            Some(rt) => (
                StatusCode::OK,
                Json(json!({
                    "access_token": format!("at_refreshed_{rt}"),
                    "expires_in": 3600,
                    "token_type": "Bearer"
                })),
            ),
        },
        _ => invalid_grant,
    }
}

async fn userinfo(headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if bearer == "Bearer expired" || bearer.is_empty() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_request"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"sub": "u1", "name": "Test User", "email": "test@example.com"})),
    )
}
