//! # Postboard Core
//!
//! The domain layer of Postboard: users, posts, comments, votes and sessions,
//! plus the ports the infrastructure crate implements.
//! No database or HTTP dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::RepoError;
