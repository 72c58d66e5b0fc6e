use std::env;
use std::path::PathBuf;

use anyhow::Result;

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
    T::Err: std::fmt::Debug,
{
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .unwrap_or(default)
}

fn require_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("{} environment variable required", key))
}

/// Everything the server needs, resolved once at startup. No ambient
/// globals: this struct is handed to `build()` and from there into the
/// application state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Directory the JSON collections and the applications ledger live in
    pub data_dir: PathBuf,
    /// Flat directory uploaded asset files land in
    pub upload_dir: PathBuf,
    /// Base URL asset file refs are appended to; the router also serves
    /// the upload directory at /uploads, so the relative default works
    /// out of the box
    pub public_base_url: String,

    pub admin_email: String,
    /// Pre-hashed admin password (bcrypt). Preferred in production.
    pub admin_password_hash: Option<String>,
    /// Plaintext admin password, hashed at startup. Dev convenience.
    pub admin_password: Option<String>,

    pub jwt_secret: String,
    pub token_ttl_hours: i64,

    pub body_limit_mb: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let admin_password_hash = env::var("ATRIUM_ADMIN_PASSWORD_HASH").ok();
        let admin_password = env::var("ATRIUM_ADMIN_PASSWORD").ok();
        if admin_password_hash.is_none() && admin_password.is_none() {
            return Err(anyhow::anyhow!(
                "ATRIUM_ADMIN_PASSWORD_HASH or ATRIUM_ADMIN_PASSWORD environment variable required"
            ));
        }

        Ok(Self {
            host: env_var_or("ATRIUM_HOST", "127.0.0.1".to_string()),
            port: env_var_or("ATRIUM_PORT", 3030),
            data_dir: PathBuf::from(env_var_or("ATRIUM_DATA_DIR", "data".to_string())),
            upload_dir: PathBuf::from(env_var_or(
                "ATRIUM_UPLOAD_DIR",
                "data/uploads".to_string(),
            )),
            public_base_url: env_var_or("ATRIUM_PUBLIC_BASE_URL", "/uploads".to_string()),
            admin_email: env_var_or("ATRIUM_ADMIN_EMAIL", "admin@example.com".to_string()),
            admin_password_hash,
            admin_password,
            jwt_secret: require_env("ATRIUM_JWT_SECRET")?,
            token_ttl_hours: env_var_or("ATRIUM_TOKEN_TTL_HOURS", 24),
            body_limit_mb: env_var_or("ATRIUM_BODY_LIMIT_MB", 25),
        })
    }
}
