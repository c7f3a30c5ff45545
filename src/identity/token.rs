//! Compact signed session credentials.
//!
//! A credential is a JWT in compact form (`header.claims.signature`, each part
//! base64url without padding) signed with HMAC-SHA256 through `jsonwebtoken`.
//! The claims carry the principal's email plus `iat`/`exp` in Unix seconds. Nothing is stored on the
//! server: a credential stays valid until `exp` or until the client drops it.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::principal::Principal;

/// Lifetime of an issued credential.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

const ALGORITHM: Algorithm = Algorithm::HS256;

pub type Credential = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Malformed token, unexpected algorithm, or signature mismatch.
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token signing failed")]
    Signing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Claims {
    email: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies credentials under a single server-held secret.
///
/// The codec is immutable after construction and is shared across requests
/// behind an `Arc`.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").field("alg", &ALGORITHM).finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        // Expiry is compared against the caller's clock in `verify_at`
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);
        Self { encoding: EncodingKey::from_secret(secret), decoding: DecodingKey::from_secret(secret), validation }
    }

    pub fn sign(&self, principal: &Principal) -> Result<Credential, TokenError> { self.sign_at(principal, Utc::now()) }

    pub fn sign_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<Credential, TokenError> {
        let iat = now.timestamp();
        let claims = Claims { email: principal.email().to_string(), iat, exp: iat + TOKEN_TTL_SECS };
        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(|_| TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> { self.verify_at(token, Utc::now()) }

    /// Signature first, then expiry: a tampered token never reports `Expired`.
    /// A token is still valid at exactly `exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Principal, TokenError> {
        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })?
            .claims;
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(Principal::new(claims.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use chrono::Duration;

    fn codec() -> TokenCodec { TokenCodec::new(b"test-secret") }

    #[test]
    fn verify_returns_signed_principal_before_expiry() {
        let now = Utc::now();
        let codec = codec();
        for email in ["a@x.com", "b@x.com", "", "ünïcode@example.org"] {
            let token = codec.sign_at(&Principal::new(email), now).unwrap();
            assert_eq!(codec.verify_at(&token, now).unwrap(), Principal::new(email));
            assert_eq!(codec.verify_at(&token, now + Duration::seconds(TOKEN_TTL_SECS)).unwrap().email, email);
        }
    }

    #[test]
    fn signing_is_deterministic_and_principal_specific() {
        let now = Utc::now();
        let codec = codec();
        let a1 = codec.sign_at(&Principal::new("a@x.com"), now).unwrap();
        let a2 = codec.sign_at(&Principal::new("a@x.com"), now).unwrap();
        let b = codec.sign_at(&Principal::new("b@x.com"), now).unwrap();
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert_eq!(a1.split('.').count(), 3);
    }

    #[test]
    fn expired_after_one_hour_even_with_valid_signature() {
        let issued = Utc::now() - Duration::hours(2);
        let codec = codec();
        let token = codec.sign_at(&Principal::new("a@x.com"), issued).unwrap();
        let just_after = issued + Duration::seconds(TOKEN_TTL_SECS + 1);
        assert_eq!(codec.verify_at(&token, just_after), Err(TokenError::Expired));
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn any_altered_character_fails_signature() {
        let now = Utc::now();
        let codec = codec();
        let token = codec.sign_at(&Principal::new("a@x.com"), now).unwrap();
        for (i, ch) in token.char_indices() {
            if ch == '.' { continue; }
            let replacement = if ch == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..i + 1, &replacement.to_string());
            assert_eq!(
                codec.verify_at(&tampered, now),
                Err(TokenError::InvalidSignature),
                "tampering at index {} was not detected",
                i
            );
        }
    }

    #[test]
    fn forged_claims_with_original_signature_are_rejected() {
        let now = Utc::now();
        let codec = codec();
        let token = codec.sign_at(&Principal::new("a@x.com"), now).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_claims = URL_SAFE_NO_PAD.encode(
            serde_json::json!({"email": "b@x.com", "iat": now.timestamp(), "exp": now.timestamp() + 60}).to_string(),
        );
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);
        assert_eq!(codec.verify_at(&forged, now), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn other_secret_or_malformed_tokens_are_invalid() {
        let now = Utc::now();
        let token = codec().sign_at(&Principal::new("a@x.com"), now).unwrap();
        let other = TokenCodec::new(b"another-secret");
        assert_eq!(other.verify_at(&token, now), Err(TokenError::InvalidSignature));
        for bad in ["", "abc", "a.b", "a.b.c.d", "..", "!!.??.**"] {
            assert_eq!(codec().verify_at(bad, now), Err(TokenError::InvalidSignature), "input {:?}", bad);
        }
    }

    #[test]
    fn unsigned_algorithm_is_rejected() {
        let now = Utc::now();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let claims = URL_SAFE_NO_PAD.encode(
            serde_json::json!({"email": "a@x.com", "iat": now.timestamp(), "exp": now.timestamp() + 60}).to_string(),
        );
        let token = format!("{header}.{claims}.");
        assert_eq!(codec().verify_at(&token, now), Err(TokenError::InvalidSignature));
    }
}
