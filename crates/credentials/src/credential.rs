//! Stored credential record

use serde::{Deserialize, Serialize};

/// A single user's OAuth credential.
///
/// `expires_at` is a unix timestamp in milliseconds (absolute, not a delta),
/// computed from the token response's `expires_in` plus the local clock at
/// the time the response was received. It is never taken from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Identity provider's stable subject identifier; the store key
    pub subject_id: String,
    /// Bearer token for downstream API calls
    pub access_token: String,
    /// Long-lived token for minting new access tokens
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Expiration as unix timestamp in milliseconds
    pub expires_at: u64,
    /// Informational only
    pub display_name: String,
}

impl Credential {
    /// The boundary instant counts as expired.
    pub fn is_expired_at(&self, now_millis: u64) -> bool {
        now_millis >= self.expires_at
    }
}

/// Absolute expiry from issuance time and provider-reported lifetime.
pub fn expires_at_from(issued_at_millis: u64, expires_in_secs: u64) -> u64 {
    issued_at_millis.saturating_add(expires_in_secs.saturating_mul(1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expires_at: u64) -> Credential {
        Credential {
            subject_id: "u1".into(),
            access_token: "at".into(),
            refresh_token: Some("rt".into()),
            expires_at,
            display_name: "User One".into(),
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let cred = credential(1_000);
        assert!(!cred.is_expired_at(999));
        assert!(cred.is_expired_at(1_000));
        assert!(cred.is_expired_at(1_001));
    }

    #[test]
    fn expires_at_converts_seconds_to_millis() {
        assert_eq!(expires_at_from(1_700_000_000_000, 3600), 1_700_003_600_000);
    }

    #[test]
    fn expires_at_saturates_instead_of_overflowing() {
        assert_eq!(expires_at_from(u64::MAX - 10, 3600), u64::MAX);
    }

    #[test]
    fn missing_refresh_token_deserializes_as_none() {
        let json = r#"{"subject_id":"u1","access_token":"at","expires_at":5,"display_name":"x"}"#;
        let cred: Credential = serde_json::from_str(json).unwrap();
        assert!(cred.refresh_token.is_none());
    }
}
