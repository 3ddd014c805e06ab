//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod repository;

pub use auth::{AuthError, PasswordService, SessionStore};
pub use repository::{BaseRepository, CommentRepository, PostRepository, UserRepository};
