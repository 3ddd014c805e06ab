use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity - a reply by one user on one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i32,
    pub comment_text: String,
    pub post_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub comment_text: String,
    pub post_id: i32,
    pub user_id: i32,
}

impl NewComment {
    pub fn new(comment_text: String, post_id: i32, user_id: i32) -> Self {
        Self {
            comment_text,
            post_id,
            user_id,
        }
    }
}
