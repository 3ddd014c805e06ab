//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};

use postboard_core::domain::{
    Comment, PostAuthor, PostDetail, ProfileComment, ProfilePost, User, UserChanges, UserProfile,
    VotedPost,
};
use postboard_core::error::RepoError;
use postboard_core::ports::{CommentRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity, VotedPosts};
use super::entity::vote::{self, Entity as VoteEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{first}***"),
                _ => "***".to_string(),
            };
            format!("{masked_local}{domain}")
        }
        None => "***".to_string(),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let users = UserEntity::find()
            .order_by_asc(user::Column::Id)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_profile(&self, id: i32) -> Result<Option<UserProfile>, RepoError> {
        let Some(found) = UserEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(map_db_err)?
        else {
            return Ok(None);
        };

        let posts = found
            .find_related(PostEntity)
            .order_by_desc(post::Column::CreatedAt)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;
        let comments = found
            .find_related(CommentEntity)
            .order_by_desc(comment::Column::CreatedAt)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;
        let voted = found
            .find_linked(VotedPosts)
            .order_by_asc(post::Column::Id)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(Some(UserProfile {
            id: found.id,
            username: found.username,
            email: found.email,
            posts: posts
                .into_iter()
                .map(|p| ProfilePost {
                    id: p.id,
                    post_text: p.post_text,
                    created_at: p.created_at.into(),
                })
                .collect(),
            comments: comments
                .into_iter()
                .map(|c| ProfileComment {
                    id: c.id,
                    comment_text: c.comment_text,
                    created_at: c.created_at.into(),
                })
                .collect(),
            voted_posts: voted
                .into_iter()
                .map(|p| VotedPost {
                    id: p.id,
                    post_text: p.post_text,
                })
                .collect(),
        }))
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, RepoError> {
        if changes.is_empty() {
            // Nothing to write; still report whether the row exists.
            let exists = UserEntity::find_by_id(id)
                .one(self.conn())
                .await
                .map_err(map_db_err)?
                .is_some();
            return if exists { Ok(1) } else { Err(RepoError::NotFound) };
        }

        let mut update = UserEntity::update_many()
            .col_expr(user::Column::UpdatedAt, Expr::value(now()))
            .filter(user::Column::Id.eq(id));
        if let Some(username) = changes.username {
            update = update.col_expr(user::Column::Username, Expr::value(username));
        }
        if let Some(email) = changes.email {
            update = update.col_expr(user::Column::Email, Expr::value(email));
        }
        if let Some(hash) = changes.password_hash {
            update = update.col_expr(user::Column::PasswordHash, Expr::value(hash));
        }

        let result = update.exec(self.conn()).await.map_err(map_db_err)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(result.rows_affected)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_all_detailed(&self) -> Result<Vec<PostDetail>, RepoError> {
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        assemble_details(self.conn(), rows).await
    }

    async fn find_detailed(&self, id: i32) -> Result<Option<PostDetail>, RepoError> {
        find_detailed_on(self.conn(), id).await
    }

    async fn update_text(&self, id: i32, post_text: String) -> Result<u64, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::PostText, Expr::value(post_text))
            .col_expr(post::Column::UpdatedAt, Expr::value(now()))
            .filter(post::Column::Id.eq(id))
            .exec(self.conn())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(result.rows_affected)
    }

    async fn upvote(&self, user_id: i32, post_id: i32) -> Result<PostDetail, RepoError> {
        let txn = self.conn().begin().await.map_err(map_db_err)?;

        if PostEntity::find_by_id(post_id)
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .is_none()
        {
            return Err(RepoError::NotFound);
        }

        let vote = vote::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            post_id: Set(post_id),
        };
        VoteEntity::insert(vote)
            .on_conflict(
                OnConflict::columns([vote::Column::UserId, vote::Column::PostId])
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        let detail = find_detailed_on(&txn, post_id)
            .await?
            .ok_or(RepoError::NotFound)?;

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(user_id, post_id, vote_count = detail.vote_count, "Vote recorded");

        Ok(detail)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_all(&self) -> Result<Vec<Comment>, RepoError> {
        let comments = CommentEntity::find()
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(self.conn())
            .await
            .map_err(map_db_err)?;

        Ok(comments.into_iter().map(Into::into).collect())
    }
}

fn now() -> sea_orm::prelude::DateTimeWithTimeZone {
    chrono::Utc::now().into()
}

async fn find_detailed_on<C>(db: &C, id: i32) -> Result<Option<PostDetail>, RepoError>
where
    C: ConnectionTrait,
{
    let row = PostEntity::find_by_id(id)
        .find_also_related(UserEntity)
        .one(db)
        .await
        .map_err(map_db_err)?;

    match row {
        Some(row) => Ok(assemble_details(db, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Vote count per post, computed with `COUNT(votes.id) ... GROUP BY post_id`.
async fn vote_counts<C>(db: &C, post_ids: &[i32]) -> Result<HashMap<i32, i64>, RepoError>
where
    C: ConnectionTrait,
{
    let rows: Vec<(i32, i64)> = VoteEntity::find()
        .select_only()
        .column(vote::Column::PostId)
        .column_as(Expr::col((vote::Entity, vote::Column::Id)).count(), "vote_count")
        .filter(vote::Column::PostId.is_in(post_ids.iter().copied()))
        .group_by(vote::Column::PostId)
        .into_tuple()
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(rows.into_iter().collect())
}

async fn assemble_details<C>(
    db: &C,
    rows: Vec<(post::Model, Option<user::Model>)>,
) -> Result<Vec<PostDetail>, RepoError>
where
    C: ConnectionTrait,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<i32> = rows.iter().map(|(p, _)| p.id).collect();
    let counts = vote_counts(db, &post_ids).await?;
    let comments: Vec<Comment> = CommentEntity::find()
        .filter(comment::Column::PostId.is_in(post_ids))
        .order_by_asc(comment::Column::CreatedAt)
        .all(db)
        .await
        .map_err(map_db_err)?
        .into_iter()
        .map(Into::into)
        .collect();

    rows.into_iter()
        .map(|(post, author)| {
            let author = author
                .ok_or_else(|| RepoError::Query(format!("post {} has no author row", post.id)))?;
            let votes = counts.get(&post.id).copied().unwrap_or(0);
            Ok(PostDetail::assemble(
                post.into(),
                PostAuthor::from(User::from(author)),
                votes,
                &comments,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::mask_email;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("alice@example.com"), "a***@example.com");
        assert_eq!(mask_email("a@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }
}
