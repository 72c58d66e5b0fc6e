// Admin credential checks.

use anyhow::Result;
use atrium_core::ApiError;
use bcrypt::{hash, verify};

/// Login failures all surface the same message; which half of the
/// credentials was wrong is not disclosed.
const INVALID_LOGIN: &str = "Invalid login";

/// The one administrator account, loaded from configuration.
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub email: String,
    password_hash: String,
}

impl AdminCredentials {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Build credentials from a plaintext password, hashing it on the
    /// spot. Intended for dev setups where only ADMIN_PASSWORD is set.
    pub fn from_plaintext(email: impl Into<String>, password: &str) -> Result<Self> {
        let password_hash = hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Ok(Self {
            email: email.into(),
            password_hash,
        })
    }

    /// Check a submitted email/password pair. Returns the admin email on
    /// success, a NotAuthenticated error otherwise.
    pub fn verify(&self, email: &str, password: &str) -> Result<String> {
        if email.trim() != self.email {
            return Err(ApiError::not_authenticated(INVALID_LOGIN).into_anyhow());
        }

        let ok = verify(password, &self.password_hash)
            .map_err(|e| ApiError::not_authenticated(e.to_string()).into_anyhow())?;
        if !ok {
            return Err(ApiError::not_authenticated(INVALID_LOGIN).into_anyhow());
        }

        Ok(self.email.clone())
    }
}
