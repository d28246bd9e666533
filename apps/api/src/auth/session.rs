use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// In-memory editor sessions keyed by opaque token. Restarting the server
/// logs everyone out.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn issue(&self) -> Session {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            expires_at: Utc::now()
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.expires_at);
        session
    }

    /// Returns the expiry of a live session. Expired tokens are dropped here.
    pub async fn validate(&self, token: &str) -> Option<DateTime<Utc>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token).copied() {
            Some(expires_at) if expires_at > Utc::now() => Some(expires_at),
            Some(_) => {
                sessions.remove(token);
                debug!("Dropped expired session");
                None
            }
            None => None,
        }
    }

    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Returns how many sessions were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, expires_at| *expires_at > now);
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issued_session_validates_until_logout() {
        let store = SessionStore::new(Duration::hours(24));
        let session = store.issue().await;

        assert_eq!(store.validate(&session.token).await, Some(session.expires_at));
        assert!(session.expires_at > Utc::now() + Duration::hours(23));

        assert!(store.logout(&session.token).await);
        assert_eq!(store.validate(&session.token).await, None);
        assert!(!store.logout(&session.token).await);
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let store = SessionStore::new(Duration::hours(24));
        assert_eq!(store.validate("forged").await, None);
    }

    #[tokio::test]
    async fn test_expired_session_is_removed_on_check() {
        let store = SessionStore::new(Duration::seconds(-1));
        let session = store.issue().await;

        assert_eq!(store.validate(&session.token).await, None);
        assert_eq!(store.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_sessions() {
        let expired = SessionStore::new(Duration::seconds(-1));
        expired.issue().await;
        expired.issue().await;
        assert_eq!(expired.purge_expired().await, 2);

        let live = SessionStore::new(Duration::hours(1));
        let session = live.issue().await;
        assert_eq!(live.purge_expired().await, 0);
        assert!(live.validate(&session.token).await.is_some());
    }

    #[tokio::test]
    async fn test_oversized_ttl_saturates() {
        let store = SessionStore::new(Duration::days(10_000_000_000));
        let session = store.issue().await;

        assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(store.validate(&session.token).await.is_some());
    }
}
