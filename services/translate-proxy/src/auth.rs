//! Consent flow: `/auth`, `/oauth/callback`, and the signed-in landing page

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::AppState;
use crate::error::{ApiError, found, new_request_id};

/// Query string Google appends when redirecting back.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    /// Set instead of `code` when the user denies consent.
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /auth`: send the browser to Google's consent screen.
pub async fn authorize(State(state): State<AppState>) -> Response {
    match state.google.authorization_url() {
        Ok(url) => found(&url),
        Err(e) => ApiError::from(e).into_response_with_id(&new_request_id()),
    }
}

/// `GET /oauth/callback?code=`: exchange the code, store the credential,
/// start the session, land on `/`.
pub async fn callback(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let request_id = new_request_id();
    match complete_authorization(&state, params, &request_id).await {
        Ok(subject_id) => {
            let jar = state.session.start(jar, subject_id);
            (jar, found("/")).into_response()
        }
        Err(e) => e.into_response_with_id(&request_id),
    }
}

#[instrument(skip_all, fields(request_id = %request_id))]
async fn complete_authorization(
    state: &AppState,
    params: CallbackParams,
    request_id: &str,
) -> Result<String, ApiError> {
    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        if let Some(error) = params.error {
            warn!(error = %error, "authorization denied by user or provider");
        }
        return Err(ApiError::MissingParameter("code"));
    };

    let tokens = state.google.exchange_code(&code).await?;
    let profile = state.google.fetch_profile(&tokens.access_token).await?;
    let credential = state.manager.record_authorization(&profile, tokens).await?;

    info!(subject_id = %credential.subject_id, "user authorized");
    Ok(credential.subject_id)
}

/// `GET /`: greet the signed-in user with a sample translation form.
pub async fn home(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let request_id = new_request_id();
    let Some(subject_id) = state.session.subject_id(&jar) else {
        return ApiError::NotAuthenticated.into_response_with_id(&request_id);
    };
    match state.manager.valid_credential(&subject_id).await {
        Ok(credential) => Html(render_home(&credential.display_name)).into_response(),
        Err(e) => ApiError::from(e).into_response_with_id(&request_id),
    }
}

fn render_home(display_name: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Translate</title></head>
<body>
<h1>Hello, {name}</h1>
<form action="/translate" method="post">
<input type="text" name="text" value="Hello world">
<input type="text" name="target_language" value="hi">
<button type="submit">Translate</button>
</form>
</body>
</html>
"#,
        name = escape_html(display_name)
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
