//! Shared types for the live-commerce platform
//!
//! Domain models, status state machines, request/response DTOs and small
//! utilities used by both the server and its clients. Database derives are
//! gated behind the `db` feature so client builds stay free of sqlx.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use response::ApiResponse;
