//! Session store backed by the `sessions` table.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter};

use postboard_core::domain::Session;
use postboard_core::ports::{AuthError, SessionStore};

use super::entity::session::{self, Entity as SessionEntity};

pub struct PostgresSessionStore {
    db: Arc<DbConn>,
}

impl PostgresSessionStore {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }

    fn conn(&self) -> &DbConn {
        &self.db
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn create(&self, session: Session) -> Result<Session, AuthError> {
        let model = session::ActiveModel::from(session)
            .insert(self.conn())
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(model.into())
    }

    async fn find(&self, token: &str) -> Result<Option<Session>, AuthError> {
        let found = SessionEntity::find_by_id(token.to_string())
            .one(self.conn())
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        let Some(model) = found else {
            return Ok(None);
        };

        let session = Session::from(model);
        if session.is_expired() {
            tracing::debug!(user_id = session.user_id, "Dropping expired session");
            self.destroy(token).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    async fn destroy(&self, token: &str) -> Result<(), AuthError> {
        SessionEntity::delete_by_id(token.to_string())
            .exec(self.conn())
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(())
    }

    async fn destroy_for_user(&self, user_id: i32) -> Result<u64, AuthError> {
        let result = SessionEntity::delete_many()
            .filter(session::Column::UserId.eq(user_id))
            .exec(self.conn())
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
