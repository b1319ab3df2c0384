//! Local JWT expiration check.
//!
//! The storefront never verifies token signatures; the backing API does
//! that. What it can do cheaply is decode the payload segment and read the
//! `exp` claim, so visitors with an expired token are treated as logged out
//! instead of bouncing off the API with a 401 on every page.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Whether a bearer token's embedded expiration has passed.
///
/// Malformed tokens count as expired. A well-formed token without an `exp`
/// claim does not expire locally; the API remains the authority.
#[must_use]
pub fn is_expired(token: &str) -> bool {
    match expiration(token) {
        Some(Some(exp)) => exp <= chrono::Utc::now().timestamp(),
        Some(None) => false,
        None => true,
    }
}

/// Decode the `exp` claim. Outer `None` means the token is malformed.
fn expiration(token: &str) -> Option<Option<i64>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        format!(
            "eyJhbGciOiJIUzI1NiJ9.{}.signature",
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_future_exp_is_not_expired() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = token_with_payload(&format!(r#"{{"sub":"u-1","exp":{exp}}}"#));
        assert!(!is_expired(&token));
    }

    #[test]
    fn test_past_exp_is_expired() {
        let exp = chrono::Utc::now().timestamp() - 1;
        let token = token_with_payload(&format!(r#"{{"sub":"u-1","exp":{exp}}}"#));
        assert!(is_expired(&token));
    }

    #[test]
    fn test_missing_exp_claim_is_not_expired() {
        let token = token_with_payload(r#"{"sub":"u-1"}"#);
        assert!(!is_expired(&token));
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        assert!(is_expired(""));
        assert!(is_expired("not-a-jwt"));
        assert!(is_expired("a.!!!not-base64!!!.c"));
        let token = format!("header.{}.sig", URL_SAFE_NO_PAD.encode("not json"));
        assert!(is_expired(&token));
    }
}
