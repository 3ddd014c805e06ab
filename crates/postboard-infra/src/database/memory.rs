//! In-memory store - used when no database is configured, and in tests.
//!
//! Mirrors the relational schema closely enough for the HTTP layer not to
//! notice: unique usernames/emails, foreign keys, cascading deletes and one
//! vote per `(user, post)`. Data is lost on process restart.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use postboard_core::domain::{
    Comment, NewComment, NewPost, NewUser, Post, PostAuthor, PostDetail, ProfileComment,
    ProfilePost, User, UserChanges, UserProfile, Vote, VotedPost,
};
use postboard_core::error::RepoError;
use postboard_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    votes: Vec<Vote>,
    last_user_id: i32,
    last_post_id: i32,
    last_comment_id: i32,
    last_vote_id: i32,
}

impl Tables {
    fn user(&self, id: i32) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn post_exists(&self, id: i32) -> bool {
        self.posts.iter().any(|p| p.id == id)
    }

    fn vote_count(&self, post_id: i32) -> i64 {
        self.votes.iter().filter(|v| v.post_id == post_id).count() as i64
    }

    fn ensure_unique(&self, skip_id: Option<i32>, username: &str, email: &str) -> Result<(), RepoError> {
        let others = self.users.iter().filter(|u| Some(u.id) != skip_id);
        for user in others {
            if user.username == username {
                return Err(RepoError::Constraint(format!(
                    "duplicate value: username '{username}' already exists"
                )));
            }
            if user.email == email {
                return Err(RepoError::Constraint(
                    "duplicate value: email already registered".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn detail(&self, post: &Post) -> Result<PostDetail, RepoError> {
        let author = self
            .user(post.user_id)
            .cloned()
            .ok_or_else(|| RepoError::Query(format!("post {} has no author row", post.id)))?;

        Ok(PostDetail::assemble(
            post.clone(),
            PostAuthor::from(author),
            self.vote_count(post.id),
            &self.comments,
        ))
    }
}

/// Thread-safe in-memory implementation of every repository port.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, i32, NewUser> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.user(id).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        tables.ensure_unique(None, &new.username, &new.email)?;

        tables.last_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.last_user_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn delete(&self, id: i32) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(RepoError::NotFound);
        }

        let owned_posts: Vec<i32> = tables
            .posts
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        tables.posts.retain(|p| p.user_id != id);
        tables
            .comments
            .retain(|c| c.user_id != id && !owned_posts.contains(&c.post_id));
        tables
            .votes
            .retain(|v| v.user_id != id && !owned_posts.contains(&v.post_id));

        Ok(1)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_profile(&self, id: i32) -> Result<Option<UserProfile>, RepoError> {
        let tables = self.tables.read().await;
        let Some(user) = tables.user(id) else {
            return Ok(None);
        };

        let mut posts: Vec<ProfilePost> = tables
            .posts
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| ProfilePost {
                id: p.id,
                post_text: p.post_text.clone(),
                created_at: p.created_at,
            })
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut comments: Vec<ProfileComment> = tables
            .comments
            .iter()
            .filter(|c| c.user_id == id)
            .map(|c| ProfileComment {
                id: c.id,
                comment_text: c.comment_text.clone(),
                created_at: c.created_at,
            })
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let mut voted_posts: Vec<VotedPost> = tables
            .votes
            .iter()
            .filter(|v| v.user_id == id)
            .filter_map(|v| tables.posts.iter().find(|p| p.id == v.post_id))
            .map(|p| VotedPost {
                id: p.id,
                post_text: p.post_text.clone(),
            })
            .collect();
        voted_posts.sort_by_key(|p| p.id);

        Ok(Some(UserProfile {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            posts,
            comments,
            voted_posts,
        }))
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let current = tables.user(id).cloned().ok_or(RepoError::NotFound)?;

        let mut updated = current;
        changes.apply_to(&mut updated);
        tables.ensure_unique(Some(id), &updated.username, &updated.email)?;
        updated.updated_at = Utc::now();

        if let Some(slot) = tables.users.iter_mut().find(|u| u.id == id) {
            *slot = updated;
        }

        Ok(1)
    }
}

#[async_trait]
impl BaseRepository<Post, i32, NewPost> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, new: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.user(new.user_id).is_none() {
            return Err(RepoError::Constraint(format!(
                "missing referenced row: user {}",
                new.user_id
            )));
        }

        tables.last_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: tables.last_post_id,
            user_id: new.user_id,
            post_text: new.post_text,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());

        Ok(post)
    }

    async fn delete(&self, id: i32) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.post_exists(id) {
            return Err(RepoError::NotFound);
        }

        tables.posts.retain(|p| p.id != id);
        tables.comments.retain(|c| c.post_id != id);
        tables.votes.retain(|v| v.post_id != id);

        Ok(1)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_all_detailed(&self) -> Result<Vec<PostDetail>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<&Post> = tables.posts.iter().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        posts.into_iter().map(|p| tables.detail(p)).collect()
    }

    async fn find_detailed(&self, id: i32) -> Result<Option<PostDetail>, RepoError> {
        let tables = self.tables.read().await;
        tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.detail(p))
            .transpose()
    }

    async fn update_text(&self, id: i32, post_text: String) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;

        post.post_text = post_text;
        post.updated_at = Utc::now();

        Ok(1)
    }

    async fn upvote(&self, user_id: i32, post_id: i32) -> Result<PostDetail, RepoError> {
        // One write lock for check + insert + re-read, like the SQL transaction.
        let mut tables = self.tables.write().await;
        if !tables.post_exists(post_id) {
            return Err(RepoError::NotFound);
        }
        if tables.user(user_id).is_none() {
            return Err(RepoError::Constraint(format!(
                "missing referenced row: user {user_id}"
            )));
        }

        let already_voted = tables
            .votes
            .iter()
            .any(|v| v.user_id == user_id && v.post_id == post_id);
        if !already_voted {
            tables.last_vote_id += 1;
            let vote = Vote {
                id: tables.last_vote_id,
                user_id,
                post_id,
            };
            tables.votes.push(vote);
        }

        let post = tables
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .ok_or(RepoError::NotFound)?;
        tables.detail(post)
    }
}

#[async_trait]
impl BaseRepository<Comment, i32, NewComment> for InMemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, new: NewComment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.post_exists(new.post_id) {
            return Err(RepoError::Constraint(format!(
                "missing referenced row: post {}",
                new.post_id
            )));
        }
        if tables.user(new.user_id).is_none() {
            return Err(RepoError::Constraint(format!(
                "missing referenced row: user {}",
                new.user_id
            )));
        }

        tables.last_comment_id += 1;
        let comment = Comment {
            id: tables.last_comment_id,
            comment_text: new.comment_text,
            post_id: new.post_id,
            user_id: new.user_id,
            created_at: Utc::now(),
        };
        tables.comments.push(comment.clone());

        Ok(comment)
    }

    async fn delete(&self, id: i32) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        if tables.comments.len() == before {
            return Err(RepoError::NotFound);
        }

        Ok(1)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments = tables.comments.clone();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(store: &InMemoryStore, name: &str) -> User {
        BaseRepository::<User, i32, NewUser>::create(
            store,
            NewUser::new(
                name.to_string(),
                format!("{name}@example.com"),
                "hash".to_string(),
            ),
        )
        .await
        .unwrap()
    }

    async fn seed_post(store: &InMemoryStore, user_id: i32, text: &str) -> Post {
        BaseRepository::<Post, i32, NewPost>::create(store, NewPost::new(user_id, text.to_string()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_constraint_violation() {
        let store = InMemoryStore::new();
        seed_user(&store, "ada").await;

        let result = BaseRepository::<User, i32, NewUser>::create(
            &store,
            NewUser::new(
                "ada".to_string(),
                "other@example.com".to_string(),
                "hash".to_string(),
            ),
        )
        .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_vote_count_matches_vote_rows() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "ada").await;
        let voters = [
            seed_user(&store, "bob").await,
            seed_user(&store, "cy").await,
            seed_user(&store, "di").await,
        ];
        let post = seed_post(&store, author.id, "hello").await;

        for voter in &voters {
            store.upvote(voter.id, post.id).await.unwrap();
        }
        let detail = store.find_detailed(post.id).await.unwrap().unwrap();

        assert_eq!(detail.vote_count, 3);
        assert_eq!(store.find_all_detailed().await.unwrap()[0].vote_count, 3);
    }

    #[tokio::test]
    async fn test_repeat_vote_is_idempotent() {
        let store = InMemoryStore::new();
        let author = seed_user(&store, "ada").await;
        let post = seed_post(&store, author.id, "hello").await;

        store.upvote(author.id, post.id).await.unwrap();
        let detail = store.upvote(author.id, post.id).await.unwrap();

        assert_eq!(detail.vote_count, 1);
    }

    #[tokio::test]
    async fn test_upvote_missing_post_is_not_found() {
        let store = InMemoryStore::new();
        let user = seed_user(&store, "ada").await;

        let result = store.upvote(user.id, 404).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_deleting_user_cascades() {
        let store = InMemoryStore::new();
        let ada = seed_user(&store, "ada").await;
        let bob = seed_user(&store, "bob").await;
        let post = seed_post(&store, ada.id, "mine").await;
        store.upvote(bob.id, post.id).await.unwrap();
        BaseRepository::<Comment, i32, NewComment>::create(
            &store,
            NewComment::new("nice".to_string(), post.id, bob.id),
        )
        .await
        .unwrap();

        BaseRepository::<User, i32, NewUser>::delete(&store, ada.id)
            .await
            .unwrap();

        assert!(store.find_all_detailed().await.unwrap().is_empty());
        assert!(CommentRepository::find_all(&store).await.unwrap().is_empty());
        let profile = store.find_profile(bob.id).await.unwrap().unwrap();
        assert!(profile.voted_posts.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_rows_is_not_found() {
        let store = InMemoryStore::new();

        let post = store.update_text(9, "new".to_string()).await;
        let user = store.update(9, UserChanges::default()).await;

        assert!(matches!(post, Err(RepoError::NotFound)));
        assert!(matches!(user, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_profile_lists_voted_posts() {
        let store = InMemoryStore::new();
        let ada = seed_user(&store, "ada").await;
        let bob = seed_user(&store, "bob").await;
        let first = seed_post(&store, ada.id, "first").await;
        seed_post(&store, ada.id, "second").await;
        store.upvote(bob.id, first.id).await.unwrap();

        let profile = store.find_profile(bob.id).await.unwrap().unwrap();
        let ada_profile = store.find_profile(ada.id).await.unwrap().unwrap();

        assert_eq!(
            profile.voted_posts,
            vec![VotedPost {
                id: first.id,
                post_text: "first".to_string()
            }]
        );
        assert_eq!(ada_profile.posts.len(), 2);
        assert!(profile.posts.is_empty());
    }
}
