//! Refresh seam between the lifecycle manager and the identity provider

use std::future::Future;
use std::pin::Pin;

use google_auth::{GoogleClient, TokenResponse};

/// Boxed future returned by `TokenRefresher::refresh`.
pub type RefreshFuture<'a> =
    Pin<Box<dyn Future<Output = google_auth::Result<TokenResponse>> + Send + 'a>>;

/// Anything that can trade a refresh token for a new access token.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn TokenRefresher>`).
pub trait TokenRefresher: Send + Sync {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> RefreshFuture<'a>;
}

impl TokenRefresher for GoogleClient {
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> RefreshFuture<'a> {
        Box::pin(GoogleClient::refresh(self, refresh_token))
    }
}
