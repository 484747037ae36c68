//! Authenticated user's profile (OpenID Connect userinfo)

use serde::{Deserialize, Serialize};

use crate::config::OAuthConfig;
use crate::error::{Error, Result};

/// Subset of the userinfo response this service uses.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Google's stable subject identifier
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Profile {
    /// Human-readable label: name, then email, then the raw subject.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or(&self.sub)
    }
}

/// Fetch the profile of the user the access token belongs to.
pub async fn fetch_profile(
    client: &reqwest::Client,
    config: &OAuthConfig,
    access_token: &str,
) -> Result<Profile> {
    let response = client
        .get(&config.userinfo_endpoint)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| Error::Http(format!("userinfo request failed: {e}")))?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Unauthorized(
            "access token rejected by userinfo endpoint".into(),
        ));
    }
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Profile(format!("userinfo returned {status}: {body}")));
    }

    response
        .json::<Profile>()
        .await
        .map_err(|e| Error::Profile(format!("invalid userinfo response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockGoogle, test_config};

    #[test]
    fn display_name_prefers_name_then_email_then_sub() {
        let mut profile = Profile {
            sub: "u1".into(),
            name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
        };
        assert_eq!(profile.display_name(), "Ada Lovelace");

        profile.name = Some(String::new());
        assert_eq!(profile.display_name(), "ada@example.com");

        profile.email = None;
        assert_eq!(profile.display_name(), "u1");
    }

    #[tokio::test]
    async fn fetch_profile_returns_subject() {
        let mock = MockGoogle::start().await;
        let client = reqwest::Client::new();

        let profile = fetch_profile(&client, &test_config(&mock.url), "at_abc")
            .await
            .unwrap();

        assert_eq!(profile.sub, "u1");
        assert_eq!(profile.display_name(), "Test User");
    }

    #[tokio::test]
    async fn fetch_profile_with_bad_token_is_unauthorized() {
        let mock = MockGoogle::start().await;
        let client = reqwest::Client::new();

        let err = fetch_profile(&client, &test_config(&mock.url), "expired")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized(_)), "got: {err:?}");
    }
}
