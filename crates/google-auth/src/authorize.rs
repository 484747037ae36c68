//! Consent screen URL construction
//!
//! `access_type=offline` together with `prompt=consent` makes Google issue a
//! refresh token on every authorization, not only on the first consent.

use crate::config::OAuthConfig;
use crate::constants::SCOPES;
use crate::error::{Error, Result};

/// Build the consent screen URL for the configured client.
///
/// Deterministic for a given config: no state or nonce is attached.
pub fn build_authorization_url(config: &OAuthConfig) -> Result<String> {
    let scope = SCOPES.join(" ");
    let url = reqwest::Url::parse_with_params(
        &config.authorize_endpoint,
        &[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )
    .map_err(|e| Error::InvalidEndpoint(format!("{}: {e}", config.authorize_endpoint)))?;

    Ok(url.into())
}
