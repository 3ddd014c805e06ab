use serde::{Deserialize, Serialize};

/// Join row between a user and a post they voted for.
///
/// At most one vote exists per `(user_id, post_id)` pair; a post's vote count
/// is the number of rows that reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i32,
    pub user_id: i32,
    pub post_id: i32,
}
