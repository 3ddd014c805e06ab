//! Domain entities - the core business objects and the read models built from them.

mod comment;
mod post;
mod session;
mod user;
mod vote;

pub use comment::{Comment, NewComment};
pub use post::{NewPost, Post, PostAuthor, PostDetail};
pub use session::Session;
pub use user::{
    NewUser, ProfileComment, ProfilePost, PublicUser, User, UserChanges, UserProfile, VotedPost,
};
pub use vote::Vote;
