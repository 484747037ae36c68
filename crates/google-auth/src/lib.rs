//! Google OAuth2 identity provider client
//!
//! Stateless REST calls against Google's OAuth2 endpoints. This crate has no
//! dependency on the credential store or the HTTP service and can be tested
//! on its own against a mock token server.
//!
//! Authorization flow:
//! 1. Service redirects the browser to `GoogleClient::authorization_url()`
//! 2. Google redirects back with `?code=`; service calls `exchange_code()`
//! 3. Service calls `fetch_profile()` with the fresh access token to learn the subject
//! 4. Later, expired access tokens are renewed with `refresh()`

pub mod authorize;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod profile;
pub mod token;

#[cfg(test)]
mod test_support;

pub use authorize::build_authorization_url;
pub use client::GoogleClient;
pub use config::OAuthConfig;
pub use constants::*;
pub use error::{Error, Result};
pub use profile::{Profile, fetch_profile};
pub use token::{TokenResponse, exchange_code, refresh_token};
