//! Application state - shared across all handlers.

use std::sync::Arc;

use postboard_core::ports::{
    CommentRepository, PasswordService, PostRepository, SessionStore, UserRepository,
};
use postboard_infra::database::{DatabaseConfig, InMemoryStore};
use postboard_infra::{Argon2PasswordService, InMemorySessionStore};

#[cfg(feature = "postgres")]
use postboard_infra::database::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
    PostgresSessionStore, PostgresUserRepository,
};

use crate::config::SessionConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub passwords: Arc<dyn PasswordService>,
    pub session_config: SessionConfig,
}

impl AppState {
    /// Build the application state, connecting to PostgreSQL when configured.
    ///
    /// Falls back to the in-memory store when no database URL is set or the
    /// connection cannot be established.
    pub async fn new(db_config: Option<&DatabaseConfig>, session_config: SessionConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        tracing::info!("Application state initialized (postgres)");
                        return Self::postgres(connections, session_config);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            if db_config.is_some() {
                tracing::warn!("Built without postgres feature - ignoring DATABASE_URL");
            }
            tracing::info!("Running without postgres feature - using in-memory store");
        }

        tracing::info!("Application state initialized (in-memory)");
        Self::in_memory(session_config)
    }

    /// State backed by a single shared in-memory store.
    pub fn in_memory(session_config: SessionConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());

        Self {
            users: store.clone(),
            posts: store.clone(),
            comments: store,
            sessions: Arc::new(InMemorySessionStore::new()),
            passwords: Arc::new(Argon2PasswordService::new()),
            session_config,
        }
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: DatabaseConnections, session_config: SessionConfig) -> Self {
        let db = Arc::new(connections.main);

        Self {
            users: Arc::new(PostgresUserRepository::new(Arc::clone(&db))),
            posts: Arc::new(PostgresPostRepository::new(Arc::clone(&db))),
            comments: Arc::new(PostgresCommentRepository::new(Arc::clone(&db))),
            sessions: Arc::new(PostgresSessionStore::new(db)),
            passwords: Arc::new(Argon2PasswordService::new()),
            session_config,
        }
    }
}
