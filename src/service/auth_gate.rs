//! Admin credential checks and session guard.
//!
//! There is exactly one admin identity. Its password is either an Argon2 PHC
//! hash (the default) or, only when `insecure_offline_auth` is enabled, a
//! plaintext string compared directly.

use crate::config::Config;
use crate::error::QrgenError;
use crate::service::sessions::{AdminSession, SessionStore};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Password used when nothing is configured, matching the historical offline default.
const FALLBACK_PASSWORD: &str = "admin123";

#[derive(Clone)]
enum AdminPassword {
    Hashed(String),
    InsecurePlaintext(String),
}

/// The single administrator account.
#[derive(Clone)]
pub struct AdminCredential {
    username: String,
    password: AdminPassword,
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.password {
            AdminPassword::Hashed(_) => "hashed",
            AdminPassword::InsecurePlaintext(_) => "insecure-plaintext",
        };
        f.debug_struct("AdminCredential")
            .field("username", &self.username)
            .field("mode", &mode)
            .finish()
    }
}

impl AdminCredential {
    pub fn hashed(username: impl Into<String>, phc: impl Into<String>) -> Result<Self, QrgenError> {
        let phc = phc.into();
        PasswordHash::new(&phc)
            .map_err(|e| QrgenError::Config(format!("invalid admin password hash: {e}")))?;
        Ok(Self {
            username: username.into(),
            password: AdminPassword::Hashed(phc),
        })
    }

    /// Plaintext comparison. Only meant for fully offline deployments.
    pub fn insecure_plaintext(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: AdminPassword::InsecurePlaintext(password.into()),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, QrgenError> {
        let plaintext = cfg.admin_password.as_deref().filter(|p| !p.is_empty());

        if cfg.insecure_offline_auth {
            if let Some(password) = plaintext {
                warn!(
                    username = %cfg.admin_username,
                    "insecure offline auth enabled: admin password is compared in plaintext"
                );
                return Ok(Self::insecure_plaintext(&cfg.admin_username, password));
            }
            warn!("insecure_offline_auth is set but no admin_password is configured; ignoring");
        } else if plaintext.is_some() {
            warn!("admin_password is ignored unless insecure_offline_auth is enabled");
        }

        match cfg.admin_password_hash.as_deref().filter(|h| !h.is_empty()) {
            Some(phc) => Self::hashed(&cfg.admin_username, phc),
            None => {
                warn!(
                    username = %cfg.admin_username,
                    "no admin password hash configured; using the built-in default password"
                );
                Self::hashed(&cfg.admin_username, hash_password(FALLBACK_PASSWORD)?)
            }
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_insecure(&self) -> bool {
        matches!(self.password, AdminPassword::InsecurePlaintext(_))
    }

    /// Both the username and the password are always checked, so timing does
    /// not reveal which one was wrong.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = bool::from(username.as_bytes().ct_eq(self.username.as_bytes()));
        let pass_ok = match &self.password {
            AdminPassword::Hashed(phc) => verify_password(password, phc),
            AdminPassword::InsecurePlaintext(expected) => {
                bool::from(password.as_bytes().ct_eq(expected.as_bytes()))
            }
        };
        user_ok & pass_ok
    }
}

/// Hash a password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, QrgenError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| QrgenError::Config(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, phc: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(phc) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Login, logout and the session guard for admin-only routes.
#[derive(Clone)]
pub struct AuthGate {
    credential: Arc<AdminCredential>,
    sessions: SessionStore,
}

impl AuthGate {
    pub fn new(credential: AdminCredential, sessions: SessionStore) -> Self {
        Self {
            credential: Arc::new(credential),
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Check the credential and open a session. Any mismatch is `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminSession, QrgenError> {
        let credential = self.credential.clone();
        let (user, pass) = (username.to_string(), password.to_string());
        let ok = tokio::task::spawn_blocking(move || credential.verify(&user, &pass))
            .await
            .map_err(|e| QrgenError::Task(e.to_string()))?;

        if !ok {
            warn!("admin login rejected");
            return Err(QrgenError::InvalidCredentials);
        }
        let session = self.sessions.create(self.credential.username()).await;
        info!(username = %session.username, "admin logged in");
        Ok(session)
    }

    pub async fn require_session(&self, session_id: &str) -> Result<AdminSession, QrgenError> {
        self.sessions
            .get(session_id)
            .await
            .ok_or(QrgenError::Unauthenticated)
    }

    pub async fn logout(&self, session_id: &str) {
        self.sessions.destroy(session_id).await;
    }
}
