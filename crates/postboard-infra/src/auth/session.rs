//! In-memory session store - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use postboard_core::domain::Session;
use postboard_core::ports::{AuthError, SessionStore};

/// Sessions keyed by token. Data is lost on process restart.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: Session) -> Result<Session, AuthError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());

        Ok(session)
    }

    async fn find(&self, token: &str) -> Result<Option<Session>, AuthError> {
        let sessions = self.sessions.read().await;
        let Some(session) = sessions.get(token) else {
            return Ok(None);
        };

        if session.is_expired() {
            drop(sessions);
            let mut sessions = self.sessions.write().await;
            sessions.remove(token);
            return Ok(None);
        }

        Ok(Some(session.clone()))
    }

    async fn destroy(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.write().await.remove(token);
        Ok(())
    }

    async fn destroy_for_user(&self, user_id: i32) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);

        Ok((before - sessions.len()) as u64)
    }
}
