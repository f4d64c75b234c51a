// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 access token verification.
//!
//! Supabase signs access tokens with the project's JWT secret. Verification
//! is a pure function of the token, the secret and the clock: no network, no
//! cache, no retry.

use std::fmt;

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::claims::Claims;
use crate::error::AppError;

/// Prefix stripped from tokens before decoding (case-sensitive).
pub const BEARER_PREFIX: &str = "Bearer ";

/// Verifies access tokens against the shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Create a verifier for `secret`.
    ///
    /// An empty secret is accepted; every token then fails signature checks.
    pub fn new(secret: &str) -> Self {
        Self::with_leeway(secret, 0)
    }

    /// Create a verifier tolerating `leeway_seconds` of clock skew on `exp`.
    pub fn with_leeway(secret: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_seconds;
        // Supabase does not always set `aud`.
        validation.validate_aud = false;
        // `exp` and `nbf` are checked when present but not required.
        validation.validate_nbf = true;
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify `token` and return its full claim set.
    ///
    /// A single leading `Bearer ` is stripped; a token without the prefix is
    /// decoded as-is.
    pub fn verify(&self, token: Option<&str>) -> Result<Claims, AppError> {
        let token = match token {
            Some(t) if !t.is_empty() => t,
            _ => return Err(AppError::authentication("Missing authorization token")),
        };
        let token = strip_bearer(token);

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let err = map_decode_error(&e);
                tracing::debug!(error = %e, "Access token rejected");
                err
            })
    }
}

/// Strip exactly one leading `Bearer `.
pub fn strip_bearer(token: &str) -> &str {
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token)
}

fn map_decode_error(e: &jsonwebtoken::errors::Error) -> AppError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AppError::authentication("Token has expired"),
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::ImmatureSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_) => AppError::authentication(format!("Invalid token: {e}")),
        _ => AppError::authentication(format!("Token verification failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const SECRET: &str = "test-jwt-secret";

    fn sign(claims: &Value, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn user_claims(exp_offset_secs: i64) -> Value {
        json!({
            "sub": "user-uuid-123",
            "email": "test@example.com",
            "role": "authenticated",
            "exp": Utc::now().timestamp() + exp_offset_secs,
        })
    }

    fn message(err: AppError) -> String {
        assert_eq!(err.error_code(), "AUTHENTICATION_REQUIRED");
        err.message().to_string()
    }

    #[test]
    fn missing_token_is_rejected_before_decode() {
        let verifier = TokenVerifier::new(SECRET);
        for token in [None, Some("")] {
            let err = verifier.verify(token).unwrap_err();
            assert_eq!(message(err), "Missing authorization token");
        }
    }

    #[test]
    fn valid_token_returns_full_claims() {
        let verifier = TokenVerifier::new(SECRET);
        let claims = user_claims(3600);
        let token = sign(&claims, SECRET);

        let decoded = verifier.verify(Some(&token)).unwrap();
        assert_eq!(Value::Object(decoded.into_inner()), claims);
    }

    #[test]
    fn bearer_prefix_is_transparent() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(&user_claims(3600), SECRET);

        let raw = verifier.verify(Some(&token)).unwrap();
        let prefixed = verifier.verify(Some(&format!("Bearer {token}"))).unwrap();
        assert_eq!(raw, prefixed);
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(&user_claims(3600), SECRET);

        let err = verifier.verify(Some(&format!("bearer {token}"))).unwrap_err();
        assert!(message(err).starts_with("Invalid token:"));
    }

    #[test]
    fn only_one_prefix_is_stripped() {
        assert_eq!(strip_bearer("Bearer Bearer abc"), "Bearer abc");
        assert_eq!(strip_bearer("Bearer  abc"), " abc");
        assert_eq!(strip_bearer("abc"), "abc");
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(&user_claims(-3600), SECRET);

        let err = verifier.verify(Some(&token)).unwrap_err();
        assert_eq!(message(err), "Token has expired");
    }

    #[test]
    fn leeway_tolerates_recent_expiry() {
        let verifier = TokenVerifier::with_leeway(SECRET, 120);
        let token = sign(&user_claims(-30), SECRET);
        assert!(verifier.verify(Some(&token)).is_ok());
    }

    #[test]
    fn not_yet_valid_token_is_invalid() {
        let verifier = TokenVerifier::new(SECRET);
        let now = Utc::now().timestamp();
        let claims = json!({ "sub": "user-uuid-123", "exp": now + 3600, "nbf": now + 3000 });
        let token = sign(&claims, SECRET);

        let err = verifier.verify(Some(&token)).unwrap_err();
        assert!(message(err).starts_with("Invalid token:"));
    }

    #[test]
    fn past_nbf_is_accepted() {
        let verifier = TokenVerifier::new(SECRET);
        let now = Utc::now().timestamp();
        let claims = json!({ "sub": "user-uuid-123", "exp": now + 3600, "nbf": now - 60 });
        assert!(verifier.verify(Some(&sign(&claims, SECRET))).is_ok());
    }

    #[test]
    fn token_without_exp_is_accepted() {
        let verifier = TokenVerifier::new(SECRET);
        let claims = json!({ "sub": "service", "role": "service_role" });
        let token = sign(&claims, SECRET);

        let decoded = verifier.verify(Some(&token)).unwrap();
        assert_eq!(decoded.role(), Some("service_role"));
        assert!(decoded.expires_at().is_none());
    }

    #[test]
    fn audience_is_not_validated() {
        let verifier = TokenVerifier::new(SECRET);
        let mut claims = user_claims(3600);
        claims["aud"] = json!("some-other-audience");
        let token = sign(&claims, SECRET);

        assert!(verifier.verify(Some(&token)).is_ok());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(&user_claims(3600), "another-secret");

        let err = verifier.verify(Some(&token)).unwrap_err();
        assert!(message(err).starts_with("Invalid token:"));
    }

    #[test]
    fn empty_secret_rejects_everything() {
        let verifier = TokenVerifier::new("");
        let token = sign(&user_claims(3600), SECRET);
        assert!(verifier.verify(Some(&token)).is_err());
    }

    #[test]
    fn expired_token_with_wrong_secret_is_invalid_not_expired() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(&user_claims(-3600), "another-secret");

        let err = verifier.verify(Some(&token)).unwrap_err();
        assert!(message(err).starts_with("Invalid token:"));
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let verifier = TokenVerifier::new(SECRET);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &user_claims(3600),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = verifier.verify(Some(&token)).unwrap_err();
        assert!(message(err).starts_with("Invalid token:"));
    }

    #[test]
    fn malformed_tokens_are_invalid() {
        let verifier = TokenVerifier::new(SECRET);
        for token in ["NotBearerToken", "invalid.jwt.token", "Bearer a.b"] {
            let err = verifier.verify(Some(token)).unwrap_err();
            let msg = message(err);
            assert!(
                msg.starts_with("Invalid token:") || msg.starts_with("Token verification failed:"),
                "{token}: {msg}"
            );
        }
    }

    #[test]
    fn corrupted_payload_is_invalid() {
        let verifier = TokenVerifier::new(SECRET);
        let token = sign(&user_claims(3600), SECRET);
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(br#"{"sub":"attacker","role":"service_role"}"#);
        parts[1] = &forged;

        let err = verifier.verify(Some(&parts.join("."))).unwrap_err();
        assert!(message(err).starts_with("Invalid token:"));
    }
}
