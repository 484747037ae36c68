//! Signed session cookie carrying the authenticated subject id
//!
//! The cookie value is the bare `subject_id`, HMAC-signed by
//! `SignedCookieJar`. A missing, unsigned, or tampered cookie yields no
//! subject and the request is treated as unauthenticated.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use common::Secret;
use sha2::{Digest, Sha512};

use crate::config::SessionConfig;

#[derive(Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub max_age_days: u32,
    pub secure: bool,
    pub key: Key,
}

impl SessionSettings {
    pub fn new(config: &SessionConfig, secret: &Secret<String>) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            max_age_days: config.max_age_days,
            secure: config.secure_cookie,
            key: derive_key(secret),
        }
    }

    /// Subject id from a verified session cookie.
    pub fn subject_id(&self, jar: &SignedCookieJar) -> Option<String> {
        jar.get(&self.cookie_name)
            .map(|cookie| cookie.value().to_owned())
            .filter(|subject| !subject.is_empty())
    }

    /// Add the session cookie for `subject_id` to the jar.
    pub fn start(&self, jar: SignedCookieJar, subject_id: String) -> SignedCookieJar {
        let cookie = Cookie::build((self.cookie_name.clone(), subject_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::days(i64::from(self.max_age_days)));
        jar.add(cookie)
    }
}

/// Signing key from an arbitrary-length secret. SHA-512 yields the 64 bytes `Key` needs.
pub fn derive_key(secret: &Secret<String>) -> Key {
    let digest = Sha512::digest(secret.expose().as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;

    fn settings(secure: bool) -> SessionSettings {
        SessionSettings {
            cookie_name: "sid".into(),
            max_age_days: 30,
            secure,
            key: derive_key(&Secret::new("0123456789abcdef0123456789abcdef".to_string())),
        }
    }

    fn set_cookie_header(jar: SignedCookieJar) -> String {
        let response = jar.into_response();
        response.headers()[SET_COOKIE].to_str().unwrap().to_string()
    }

    #[test]
    fn derived_key_is_deterministic() {
        let a = derive_key(&Secret::new("same-secret".to_string()));
        let b = derive_key(&Secret::new("same-secret".to_string()));
        let c = derive_key(&Secret::new("other-secret".to_string()));
        assert_eq!(a.signing(), b.signing());
        assert_ne!(a.signing(), c.signing());
    }

    #[test]
    fn started_session_round_trips_subject() {
        let settings = settings(false);
        let jar = settings.start(SignedCookieJar::new(settings.key.clone()), "u1".into());
        assert_eq!(settings.subject_id(&jar).as_deref(), Some("u1"));
    }

    #[test]
    fn cookie_attributes() {
        let settings = settings(false);
        let header = set_cookie_header(
            settings.start(SignedCookieJar::new(settings.key.clone()), "u1".into()),
        );
        assert!(header.starts_with("sid="), "got: {header}");
        assert!(header.contains("HttpOnly"), "got: {header}");
        assert!(header.contains("SameSite=Lax"), "got: {header}");
        assert!(header.contains("Path=/"), "got: {header}");
        assert!(header.contains("Max-Age=2592000"), "got: {header}");
        assert!(!header.contains("Secure"), "got: {header}");
        // signed value, not the bare subject id
        assert!(!header.starts_with("sid=u1;"), "got: {header}");
    }

    #[test]
    fn secure_flag_follows_settings() {
        let settings = settings(true);
        let header = set_cookie_header(
            settings.start(SignedCookieJar::new(settings.key.clone()), "u1".into()),
        );
        assert!(header.contains("Secure"), "got: {header}");
    }

    #[test]
    fn empty_jar_has_no_subject() {
        let settings = settings(false);
        assert!(settings.subject_id(&SignedCookieJar::new(settings.key.clone())).is_none());
    }
}
