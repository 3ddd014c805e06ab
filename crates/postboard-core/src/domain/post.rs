use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Comment, User};

/// Post entity - a short text post owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub post_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i32,
    pub post_text: String,
}

impl NewPost {
    pub fn new(user_id: i32, post_text: String) -> Self {
        Self { user_id, post_text }
    }
}

/// Author fields embedded in a post read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<User> for PostAuthor {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

/// A post joined with its author, its comments and its derived vote count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: i32,
    pub post_text: String,
    pub created_at: DateTime<Utc>,
    pub vote_count: i64,
    pub user: PostAuthor,
    pub comments: Vec<Comment>,
}

impl PostDetail {
    /// Assemble a detail view. Comments not belonging to `post` are ignored
    /// and the rest are ordered oldest first.
    pub fn assemble(post: Post, author: PostAuthor, vote_count: i64, comments: &[Comment]) -> Self {
        let mut own: Vec<Comment> = comments
            .iter()
            .filter(|c| c.post_id == post.id)
            .cloned()
            .collect();
        own.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Self {
            id: post.id,
            post_text: post.post_text,
            created_at: post.created_at,
            vote_count,
            user: author,
            comments: own,
        }
    }
}
