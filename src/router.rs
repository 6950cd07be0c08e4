use crate::config::Config;
use crate::db::{RecordStore, SqlitePool, TableRegistry};
use crate::error::QrgenError;
use crate::handlers::{admin, api, form};
use crate::service::auth_gate::AuthGate;
use axum::{
    Router,
    extract::FromRef,
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::sync::Arc;
use tracing::warn;

/// Minimum master key length accepted by the cookie key derivation.
const MIN_SECRET_LEN: usize = 32;

/// Handles shared by every request. Cloning is cheap.
#[derive(Clone)]
pub struct QrgenState {
    pub registry: TableRegistry,
    pub store: RecordStore,
    pub auth: AuthGate,
    pub cookie_key: Key,
    pub secure_cookie: bool,
    pub default_table: Arc<str>,
    pub api_table: Arc<str>,
}

impl QrgenState {
    pub fn new(pool: SqlitePool, auth: AuthGate, cookie_key: Key, cfg: &Config) -> Self {
        Self {
            registry: TableRegistry::new(pool.clone()),
            store: RecordStore::new(pool),
            auth,
            cookie_key,
            secure_cookie: cfg.secure_cookie,
            default_table: Arc::from(cfg.default_table.as_str()),
            api_table: Arc::from(cfg.api_table.as_str()),
        }
    }
}

impl FromRef<QrgenState> for Key {
    fn from_ref(state: &QrgenState) -> Self {
        state.cookie_key.clone()
    }
}

/// Derive the private-cookie key from `session_secret`, or generate a
/// per-process key when none is set.
pub fn cookie_key(secret: Option<&str>) -> Result<Key, QrgenError> {
    match secret.filter(|s| !s.is_empty()) {
        Some(s) if s.len() < MIN_SECRET_LEN => Err(QrgenError::Config(format!(
            "session_secret must be at least {MIN_SECRET_LEN} bytes"
        ))),
        Some(s) => Ok(Key::derive_from(s.as_bytes())),
        None => {
            warn!("no session_secret configured; sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}

pub fn qrgen_router(state: QrgenState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/form") }))
        .route("/form", get(form::form_page).post(form::form_submit))
        .route("/success/{id}", get(form::success_page))
        .route("/admin", get(admin::admin_panel))
        .route("/admin/login", get(admin::login_page).post(admin::login_submit))
        .route("/admin/logout", post(admin::logout))
        .route("/api/item/{id}", get(api::get_item))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_rejected() {
        assert!(matches!(
            cookie_key(Some("too-short")),
            Err(QrgenError::Config(_))
        ));
    }

    #[test]
    fn long_secret_and_missing_secret_both_yield_keys() {
        let secret = "0123456789abcdef0123456789abcdef";
        let a = cookie_key(Some(secret)).unwrap();
        let b = cookie_key(Some(secret)).unwrap();
        assert_eq!(a.master(), b.master());
        assert!(cookie_key(None).is_ok());
        assert!(cookie_key(Some("")).is_ok());
    }
}
