//! Bundled client: one HTTP client plus the OAuth registration

use tracing::instrument;

use crate::config::OAuthConfig;
use crate::error::Result;
use crate::profile::{Profile, fetch_profile};
use crate::token::{TokenResponse, exchange_code, refresh_token};

/// Identity provider client shared across requests (cheap to clone).
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    config: OAuthConfig,
}

impl GoogleClient {
    pub fn new(http: reqwest::Client, config: OAuthConfig) -> Self {
        Self { http, config }
    }

    pub fn authorization_url(&self) -> Result<String> {
        crate::authorize::build_authorization_url(&self.config)
    }

    #[instrument(skip_all)]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        exchange_code(&self.http, &self.config, code).await
    }

    #[instrument(skip_all)]
    pub async fn refresh(&self, refresh: &str) -> Result<TokenResponse> {
        refresh_token(&self.http, &self.config, refresh).await
    }

    #[instrument(skip_all)]
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
        fetch_profile(&self.http, &self.config, access_token).await
    }
}
