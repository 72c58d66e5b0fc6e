// JWT issuance and verification.

use anyhow::Result;
use atrium_core::ApiError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an admin access token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Admin email
    pub sub: String,
    /// Issued-at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Issues and verifies HS256 access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(24),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sign an access token for the given subject.
    pub fn issue(&self, subject: &str) -> Result<String> {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::general_error(e.to_string()).into_anyhow())
    }

    /// Verify a token and return its claims. Expired or tampered tokens
    /// come back as NotAuthenticated.
    pub fn verify(&self, token: &str) -> Result<AdminClaims> {
        let decoded = decode::<AdminClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| ApiError::not_authenticated(e.to_string()).into_anyhow())?;

        Ok(decoded.claims)
    }
}

/// Pull the token out of an `Authorization` header value. Accepts
/// `Bearer <token>` (case-insensitive scheme) or a bare token.
pub fn extract_bearer_token(header_value: &str) -> Option<String> {
    let v = header_value.trim();
    if v.is_empty() {
        return None;
    }

    if let Some((scheme, token)) = v.split_once(' ') {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if scheme.eq_ignore_ascii_case("bearer") {
            return Some(token.to_string());
        }
        return None;
    }

    Some(v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify_and_carry_the_subject() {
        let issuer = TokenIssuer::new("test-secret");
        let token = issuer.issue("admin@example.com").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let issuer = TokenIssuer::new("test-secret");
        let other = TokenIssuer::new("other-secret");

        let token = other.issue("admin@example.com").unwrap();
        let err = issuer.verify(&token).unwrap_err();
        let api = atrium_core::ApiError::from_anyhow(&err).unwrap();
        assert_eq!(api.code(), 401);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = TokenIssuer::new("test-secret").with_ttl(Duration::seconds(-120));
        let token = issuer.issue("admin@example.com").unwrap();

        assert!(issuer.verify(&token).is_err());
    }

    #[test]
    fn bearer_extraction_handles_schemes_and_bare_tokens() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc".to_string()));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc".to_string()));
        assert_eq!(extract_bearer_token("abc"), Some("abc".to_string()));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token(""), None);
    }
}
