//! Revoked login sessions.
//!
//! Logout and account deletion add the session id carried by every token of a
//! login; the auth extractor and refresh refuse any token from a listed
//! session. Entries are dropped once no token of the session can still be
//! valid. The list lives in process memory and is lost on restart.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct RevokedTokens {
    /// Session id to the Unix time its tokens stop being valid
    sessions: Arc<Mutex<HashMap<Uuid, i64>>>,
}

impl RevokedTokens {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a session until `expires_at`, pruning entries that have lapsed.
    /// Returns `false` if the session was already revoked.
    pub async fn revoke(&self, sid: Uuid, expires_at: i64) -> bool {
        let now = Utc::now().timestamp();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, until| *until > now);
        sessions.insert(sid, expires_at).is_none()
    }

    pub async fn is_revoked(&self, sid: &Uuid) -> bool {
        self.sessions.lock().await.contains_key(sid)
    }
}
