//! # Postboard Infrastructure
//!
//! Concrete implementations of the ports defined in `postboard-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories and session store via SeaORM
//! - `minimal` - no external dependencies, in-memory store only

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, InMemorySessionStore};
pub use database::InMemoryStore;

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;
