//! Credential lifecycle: hand out only unexpired access tokens
//!
//! The manager reads the stored credential on every call and refreshes it
//! exactly when `now >= expires_at`. There is no lock around the
//! read-check-refresh-write sequence: two concurrent requests for the same
//! subject may both refresh, and the later write wins.

use std::sync::Arc;

use google_auth::{Profile, TokenResponse};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::credential::{Credential, expires_at_from};
use crate::error::{Error, Result};
use crate::refresher::TokenRefresher;
use crate::store::CredentialStore;

/// Owns the store, the refresher, and the clock used for expiry checks.
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    clock: Arc<dyn Clock>,
}

impl CredentialManager {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the system clock (tests pin time to exercise the expiry boundary).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Current access token for `subject_id`, refreshed first if expired.
    pub async fn valid_access_token(&self, subject_id: &str) -> Result<String> {
        self.valid_credential(subject_id)
            .await
            .map(|credential| credential.access_token)
    }

    /// Current credential for `subject_id`, refreshed first if expired.
    ///
    /// Errors with `NotAuthenticated` when nothing is stored and with
    /// `RefreshFailed` when the refresh is impossible or rejected. A failed
    /// refresh leaves the stored credential as it was.
    pub async fn valid_credential(&self, subject_id: &str) -> Result<Credential> {
        let mut credential = self
            .store
            .find(subject_id)
            .await?
            .ok_or_else(|| Error::NotAuthenticated(format!("no credential for {subject_id}")))?;

        if !credential.is_expired_at(self.clock.now_millis()) {
            return Ok(credential);
        }

        let Some(refresh) = credential.refresh_token.as_deref() else {
            warn!(subject_id, "access token expired and no refresh token stored");
            record_refresh("failure");
            return Err(Error::RefreshFailed(
                "access token expired and no refresh token is stored".into(),
            ));
        };

        debug!(subject_id, "access token expired, refreshing");
        let tokens = match self.refresher.refresh(refresh).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(subject_id, error = %e, "token refresh failed");
                record_refresh("failure");
                return Err(Error::RefreshFailed(e.to_string()));
            }
        };
        if tokens.expires_in == 0 {
            warn!(subject_id, "refresh returned a token with zero lifetime");
            record_refresh("failure");
            return Err(Error::RefreshFailed(
                "provider issued an access token with zero lifetime".into(),
            ));
        }

        let issued_at = self.clock.now_millis();
        credential.access_token = tokens.access_token;
        if let Some(rotated) = tokens.refresh_token {
            credential.refresh_token = Some(rotated);
        }
        credential.expires_at = expires_at_from(issued_at, tokens.expires_in);

        self.store.upsert(credential.clone()).await?;
        record_refresh("success");
        info!(
            subject_id,
            expires_at = credential.expires_at,
            "access token refreshed"
        );
        Ok(credential)
    }

    /// Persist the result of a successful authorization-code exchange.
    ///
    /// Upserts by the profile's subject. When the exchange carried no refresh
    /// token, the one already stored for this subject (if any) is kept.
    pub async fn record_authorization(
        &self,
        profile: &Profile,
        tokens: TokenResponse,
    ) -> Result<Credential> {
        if tokens.expires_in == 0 {
            return Err(Error::InvalidTokenResponse(
                "access token issued with zero lifetime".into(),
            ));
        }
        let issued_at = self.clock.now_millis();

        let refresh_token = match tokens.refresh_token {
            Some(rt) => Some(rt),
            None => self
                .store
                .find(&profile.sub)
                .await?
                .and_then(|previous| previous.refresh_token),
        };
        if refresh_token.is_none() {
            warn!(
                subject_id = %profile.sub,
                "no refresh token issued or stored; user must re-authorize on expiry"
            );
        }

        let credential = Credential {
            subject_id: profile.sub.clone(),
            access_token: tokens.access_token,
            refresh_token,
            expires_at: expires_at_from(issued_at, tokens.expires_in),
            display_name: profile.display_name().to_string(),
        };
        self.store.upsert(credential.clone()).await?;

        info!(subject_id = %credential.subject_id, "credential stored after authorization");
        Ok(credential)
    }
}

fn record_refresh(outcome: &'static str) {
    metrics::counter!("credential_refresh_total", "outcome" => outcome).increment(1);
}
