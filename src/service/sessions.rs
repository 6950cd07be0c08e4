//! Server-side admin sessions keyed by an opaque random id.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

const SESSION_ID_LEN: usize = 64;

/// Authenticated state attached to a browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub session_id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// In-memory session store. Cloning shares the same underlying map.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, AdminSession>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn generate_session_id() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect()
    }

    pub async fn create(&self, username: &str) -> AdminSession {
        let now = Utc::now();
        let session = AdminSession {
            session_id: Self::generate_session_id(),
            username: username.to_string(),
            created_at: now,
            expires_at: now
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        session
    }

    /// Live session for `session_id`. Expired entries are removed on the way out.
    pub async fn get(&self, session_id: &str) -> Option<AdminSession> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(s) if !s.is_expired(now) => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.sessions.write().await.remove(session_id);
        debug!("expired session dropped");
        None
    }

    /// Removing an absent id is a no-op.
    pub async fn destroy(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get() {
        let store = SessionStore::new(Duration::hours(1));
        let s = store.create("admin").await;
        assert_eq!(s.session_id.len(), SESSION_ID_LEN);

        let found = store.get(&s.session_id).await.unwrap();
        assert_eq!(found.username, "admin");
    }

    #[tokio::test]
    async fn ids_differ_between_sessions() {
        let store = SessionStore::new(Duration::hours(1));
        let a = store.create("admin").await;
        let b = store.create("admin").await;
        assert_ne!(a.session_id, b.session_id);
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let store = SessionStore::new(Duration::hours(1));
        let s = store.create("admin").await;
        store.destroy(&s.session_id).await;
        store.destroy(&s.session_id).await;
        store.destroy("never-created").await;
        assert!(store.get(&s.session_id).await.is_none());
    }

    #[tokio::test]
    async fn expired_sessions_read_as_absent() {
        let store = SessionStore::new(Duration::zero());
        let s = store.create("admin").await;
        assert!(store.get(&s.session_id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn huge_ttl_saturates_instead_of_overflowing() {
        let store = SessionStore::new(Duration::MAX);
        let s = store.create("admin").await;
        assert_eq!(s.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(store.get(&s.session_id).await.is_some());
    }

    #[tokio::test]
    async fn purge_keeps_live_sessions() {
        let expired = SessionStore::new(Duration::zero());
        expired.create("a").await;
        expired.create("b").await;
        assert_eq!(expired.purge_expired().await, 2);

        let live = SessionStore::new(Duration::hours(1));
        live.create("a").await;
        assert_eq!(live.purge_expired().await, 0);
        assert_eq!(live.len().await, 1);
    }
}
