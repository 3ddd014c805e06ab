//! # Postboard Shared
//!
//! Wire types for the HTTP API: request bodies, mutation results and
//! RFC 7807 problem documents.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MutationResponse};
