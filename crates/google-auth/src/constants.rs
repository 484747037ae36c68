//! Google OAuth2 endpoints and scopes
//!
//! Endpoints are defaults only; `OAuthConfig` carries the values actually
//! used so tests can point the client at a local mock server.

/// Consent screen
pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Token endpoint for code exchange and token refresh
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// OpenID Connect userinfo endpoint
pub const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Scopes requested on every authorization: profile for the greeting, openid
/// for a stable `sub`, cloud-translation for the downstream API.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
    "openid",
    "https://www.googleapis.com/auth/cloud-translation",
];
