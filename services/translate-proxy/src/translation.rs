//! `/translate`: translate text as the signed-in user

use axum::Json;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::AppState;
use crate::error::{ApiError, new_request_id};

#[derive(Debug, Default, Deserialize)]
pub struct TranslateParams {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, alias = "tgt_lang")]
    pub target_language: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}

/// `GET /translate?text=&target_language=`
pub async fn translate_query(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    query: Result<Query<TranslateParams>, QueryRejection>,
) -> Response {
    let params = query.map(|Query(p)| p).unwrap_or_else(|rejection| {
        debug!(error = %rejection, "unreadable query string");
        TranslateParams::default()
    });
    respond(&state, &jar, params).await
}

/// `POST /translate` with a form body (what the landing page submits)
///
/// A missing or non-form body carries no parameters and ends as a 400.
pub async fn translate_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    form: Result<Form<TranslateParams>, FormRejection>,
) -> Response {
    let params = form.map(|Form(p)| p).unwrap_or_else(|rejection| {
        debug!(error = %rejection, "unreadable form body");
        TranslateParams::default()
    });
    respond(&state, &jar, params).await
}

async fn respond(state: &AppState, jar: &SignedCookieJar, params: TranslateParams) -> Response {
    let request_id = new_request_id();
    match translate_for_session(state, jar, params, &request_id).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => e.into_response_with_id(&request_id),
    }
}

/// Parameters are checked before the session, so a malformed request is a
/// 400 even when signed out.
#[instrument(skip_all, fields(request_id = %request_id))]
async fn translate_for_session(
    state: &AppState,
    jar: &SignedCookieJar,
    params: TranslateParams,
    request_id: &str,
) -> Result<TranslateResponse, ApiError> {
    let text = required(params.text, "text")?;
    let target = required(params.target_language, "target_language")?;

    let subject_id = state
        .session
        .subject_id(jar)
        .ok_or(ApiError::NotAuthenticated)?;
    let access_token = state.manager.valid_access_token(&subject_id).await?;

    let translated_text = state
        .translator
        .translate(&text, &target, &access_token)
        .await?;
    debug!(subject_id = %subject_id, target = %target, "translation served");

    Ok(TranslateResponse { translated_text })
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ApiError::MissingParameter(name))
}
