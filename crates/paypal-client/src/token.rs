//! # Access Token
//!
//! OAuth2 bearer token state for the client-credentials grant.

use chrono::Utc;
use serde::Deserialize;

/// Path of the OAuth2 token endpoint
pub const TOKEN_PATH: &str = "/v1/oauth2/token";

/// A token stops being used this long before it actually expires
pub const EXPIRY_SAFETY_MARGIN_MS: i64 = 30_000;

/// Current wall-clock time in epoch milliseconds
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
}

/// A bearer token and its absolute expiry.
///
/// Replaced wholesale on refresh; never mutated in place.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at_ms: i64,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_at_ms: i64) -> Self {
        Self {
            value: value.into(),
            expires_at_ms,
        }
    }

    /// Token issued at `issued_at_ms` from a token endpoint response
    pub fn from_response(response: TokenResponse, issued_at_ms: i64) -> Self {
        let lifetime_ms = response.expires_in.saturating_mul(1000);
        Self::new(response.access_token, issued_at_ms.saturating_add(lifetime_ms))
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at_ms(&self) -> i64 {
        self.expires_at_ms
    }

    /// Valid while `now` is more than the safety margin before expiry
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at_ms - EXPIRY_SAFETY_MARGIN_MS
    }

    /// `Authorization` header value
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at_ms", &self.expires_at_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_issued_at(t: i64) -> AccessToken {
        AccessToken::from_response(
            TokenResponse {
                access_token: "A21AAF".to_string(),
                token_type: Some("Bearer".to_string()),
                expires_in: 3600,
                scope: None,
                nonce: None,
            },
            t,
        )
    }

    #[test]
    fn test_expiry_is_issue_time_plus_lifetime() {
        let t = 1_700_000_000_000;
        assert_eq!(token_issued_at(t).expires_at_ms(), t + 3_600_000);
    }

    #[test]
    fn test_validity_window_honours_safety_margin() {
        let t = 1_700_000_000_000;
        let token = token_issued_at(t);

        assert!(token.is_valid_at(t));
        assert!(token.is_valid_at(t + 3_600_000 - 30_000 - 1));
        assert!(!token.is_valid_at(t + 3_600_000 - 30_000));
        assert!(!token.is_valid_at(t + 3_600_000));
    }

    #[test]
    fn test_debug_hides_token_value() {
        let rendered = format!("{:?}", token_issued_at(0));
        assert!(!rendered.contains("A21AAF"));
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(token_issued_at(0).bearer_header(), "Bearer A21AAF");
    }
}
