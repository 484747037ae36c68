//! Router fixtures: a mock of Google's token, userinfo, and translation
//! endpoints plus request/response helpers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get as get_route, post};
use axum::{Form, Json, Router};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use common::Secret;
use credentials::{Credential, CredentialManager, MemoryStore};
use google_auth::{GoogleClient, OAuthConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use translate::TranslateClient;

use crate::AppState;
use crate::metrics::{ServiceMetrics, detached_handle};
use crate::session::{SessionSettings, derive_key};

pub struct MockGoogle {
    pub url: String,
    refresh_calls: Arc<AtomicUsize>,
}

impl MockGoogle {
    /// - code `abc` exchanges to `at_abc` / `rt_abc`, anything else is `invalid_grant`
    /// - refresh token `revoked` is `invalid_grant`, others mint `at_refreshed_<rt>`
    /// - userinfo returns subject `u1` named `Test <User>`
    /// - translation rejects bearer `revoked_at`, answers 400 for `xx-unknown`,
    ///   otherwise echoes `<target>:<q>`
    pub async fn start() -> Self {
        let refresh_calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get_route(userinfo))
            .route("/translate", post(translate))
            .with_state(refresh_calls.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            refresh_calls,
        }
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

async fn token(
    State(refresh_calls): State<Arc<AtomicUsize>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
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
        Some("refresh_token") => {
            refresh_calls.fetch_add(1, Ordering::SeqCst);
            match form.get("refresh_token").map(String::as_str) {
                Some("revoked") | None => invalid_grant,
                Some(rt) => (
                    StatusCode::OK,
                    Json(json!({
                        "access_token": format!("at_refreshed_{rt}"),
                        "expires_in": 3600,
                        "token_type": "Bearer"
                    })),
                ),
            }
        }
        _ => invalid_grant,
    }
}

async fn userinfo(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").is_none() {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_request"})));
    }
    (
        StatusCode::OK,
        Json(json!({"sub": "u1", "name": "Test <User>", "email": "test@example.com"})),
    )
}

async fn translate(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if bearer == "Bearer revoked_at" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": {
                    "code": 401,
                    "message": "Request had invalid authentication credentials."
                }
            })),
        );
    }
    let target = body["target"].as_str().unwrap_or_default();
    let q = body["q"].as_str().unwrap_or_default();
    if target == "xx-unknown" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"code": 400, "message": "Invalid Value"}})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"data": {"translations": [{"translatedText": format!("{target}:{q}")}]}})),
    )
}

/// App state wired to the mock, backed by an in-memory store.
pub fn test_state(mock_url: &str) -> (AppState, Arc<MemoryStore>) {
    let oauth = OAuthConfig {
        authorize_endpoint: format!("{mock_url}/auth"),
        token_endpoint: format!("{mock_url}/token"),
        userinfo_endpoint: format!("{mock_url}/userinfo"),
        ..OAuthConfig::new(
            "test-client",
            "test-secret".into(),
            "http://localhost/oauth/callback",
        )
    };
    let http = reqwest::Client::new();
    let google = GoogleClient::new(http.clone(), oauth);
    let store = Arc::new(MemoryStore::new());
    let manager = CredentialManager::new(store.clone(), Arc::new(google.clone()));

    let state = AppState {
        google,
        translator: TranslateClient::with_endpoint(http, format!("{mock_url}/translate")),
        manager: Arc::new(manager),
        session: Arc::new(SessionSettings {
            cookie_name: "sid".into(),
            max_age_days: 30,
            secure: false,
            key: derive_key(&Secret::new("0123456789abcdef0123456789abcdef".to_string())),
        }),
        metrics: ServiceMetrics::new(),
        prometheus: detached_handle(),
    };
    (state, store)
}

pub fn stored_credential(expires_at: u64) -> Credential {
    Credential {
        subject_id: "u1".into(),
        access_token: "at_abc".into(),
        refresh_token: Some("rt_abc".into()),
        expires_at,
        display_name: "Test <User>".into(),
    }
}

/// `name=value` pair of a validly signed session cookie for `subject_id`.
pub fn session_cookie(state: &AppState, subject_id: &str) -> String {
    let jar = SignedCookieJar::new(state.session.key.clone())
        .add(Cookie::new(state.session.cookie_name.clone(), subject_id.to_string()));
    set_cookie(&jar.into_response())
}

/// `name=value` part of the response's Set-Cookie header.
pub fn set_cookie(response: &Response) -> String {
    let header = response.headers()[SET_COOKIE].to_str().unwrap();
    header.split(';').next().unwrap().to_string()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_string(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
