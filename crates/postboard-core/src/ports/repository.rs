use async_trait::async_trait;

use crate::domain::{
    Comment, NewComment, NewPost, NewUser, Post, PostDetail, User, UserChanges, UserProfile,
};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
///
/// `N` is the insert shape of the entity; ids are assigned by the store.
#[async_trait]
pub trait BaseRepository<T, ID, N>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity and return it with its assigned id.
    async fn create(&self, new: N) -> Result<T, RepoError>;

    /// Delete an entity by its ID, returning the number of rows removed.
    /// Fails with [`RepoError::NotFound`] when nothing matched.
    async fn delete(&self, id: ID) -> Result<u64, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32, NewUser> {
    async fn find_all(&self) -> Result<Vec<User>, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Load a user with their posts, comments and voted posts.
    async fn find_profile(&self, id: i32) -> Result<Option<UserProfile>, RepoError>;

    /// Apply a partial update. Fails with [`RepoError::NotFound`] when no row matched.
    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32, NewPost> {
    /// All posts, newest first, with author, comments and vote count.
    async fn find_all_detailed(&self) -> Result<Vec<PostDetail>, RepoError>;

    async fn find_detailed(&self, id: i32) -> Result<Option<PostDetail>, RepoError>;

    /// Replace a post's text. Fails with [`RepoError::NotFound`] when no row matched.
    async fn update_text(&self, id: i32, post_text: String) -> Result<u64, RepoError>;

    /// Record `user_id`'s vote for `post_id` and return the post with its
    /// recomputed vote count. Voting twice leaves a single vote row.
    async fn upvote(&self, user_id: i32, post_id: i32) -> Result<PostDetail, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, i32, NewComment> {
    /// All comments, newest first.
    async fn find_all(&self) -> Result<Vec<Comment>, RepoError>;
}
