//! Cloud Translation v2 `translate` call

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};

pub const TRANSLATE_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Google's error envelope: `{"error": {"code": 400, "message": "..."}}`
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Translation client shared across requests (cheap to clone).
#[derive(Debug, Clone)]
pub struct TranslateClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TranslateClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_endpoint(http, TRANSLATE_ENDPOINT)
    }

    pub fn with_endpoint(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Translate `text` into `target_language` (ISO-639 code) as the token's owner.
    ///
    /// Empty input is rejected before any network call.
    #[instrument(skip(self, text, access_token), fields(target = %target_language))]
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
        access_token: &str,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(Error::BadRequest("text must not be empty".into()));
        }
        if target_language.trim().is_empty() {
            return Err(Error::BadRequest("target language must not be empty".into()));
        }

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(access_token)
            .json(&TranslateRequest {
                q: text,
                target: target_language,
                format: "text",
            })
            .send()
            .await
            .map_err(|e| Error::Http(format!("translate request failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::Unauthorized(format!(
                "access token rejected by translation API ({status})"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %message, "translation API returned error");
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TranslateResponse = response.json().await.map_err(|e| Error::Upstream {
            status: status.as_u16(),
            message: format!("invalid translation response: {e}"),
        })?;

        let translated = parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| Error::Upstream {
                status: status.as_u16(),
                message: "translation response contained no translations".into(),
            })?;

        debug!(chars = translated.chars().count(), "translation received");
        Ok(translated)
    }
}
