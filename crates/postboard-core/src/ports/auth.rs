//! Authentication ports: password hashing and server-side sessions.

use async_trait::async_trait;

use crate::domain::Session;

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Storage for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a freshly created session.
    async fn create(&self, session: Session) -> Result<Session, AuthError>;

    /// Look up a live session. Expired sessions are reported as absent.
    async fn find(&self, token: &str) -> Result<Option<Session>, AuthError>;

    /// Remove a session. Unknown tokens are ignored.
    async fn destroy(&self, token: &str) -> Result<(), AuthError>;

    /// Remove every session belonging to a user, returning how many were dropped.
    async fn destroy_for_user(&self, user_id: i32) -> Result<u64, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing session cookie")]
    MissingSession,

    #[error("Session expired or unknown")]
    SessionExpired,

    #[error("Session store error: {0}")]
    Store(String),

    #[error("Hashing error: {0}")]
    HashingError(String),
}
