use crate::error::QrgenError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

/// Longest accepted admin session lifetime.
pub const MAX_SESSION_TTL_SECS: u64 = 366 * 24 * 60 * 60;

/// Runtime configuration, read from `QRGEN_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,

    /// Master key for the private session cookie. Must be at least 32 bytes.
    pub session_secret: Option<String>,
    pub session_ttl_secs: u64,
    pub secure_cookie: bool,

    pub admin_username: String,
    /// Argon2 PHC string, e.g. `$argon2id$v=19$...`.
    pub admin_password_hash: Option<String>,
    /// Plaintext admin password. Ignored unless `insecure_offline_auth` is set.
    pub admin_password: Option<String>,
    pub insecure_offline_auth: bool,

    /// Table used by `/success/{id}` and `/admin` when `?table=` is omitted.
    pub default_table: String,
    /// The only table `/api/item/{id}` reads from.
    pub api_table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            database_url: "sqlite:qrgen.db".to_string(),
            loglevel: "info".to_string(),
            session_secret: None,
            session_ttl_secs: 8 * 60 * 60,
            secure_cookie: false,
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            admin_password: None,
            insecure_offline_auth: false,
            default_table: "it".to_string(),
            api_table: "it".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("QRGEN_"))
    }

    /// `session_ttl_secs` as a duration, bounded by [`MAX_SESSION_TTL_SECS`].
    pub fn session_ttl(&self) -> Result<chrono::Duration, QrgenError> {
        if self.session_ttl_secs == 0 || self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(QrgenError::Config(format!(
                "session_ttl_secs must be between 1 and {MAX_SESSION_TTL_SECS}, got {}",
                self.session_ttl_secs
            )));
        }
        i64::try_from(self.session_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| QrgenError::Config("session_ttl_secs out of range".to_string()))
    }
}
