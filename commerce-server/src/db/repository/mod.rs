//! Repository Module
//!
//! SQL access for the durable tables. Functions take the pool for
//! single-statement operations and a `&mut SqliteConnection` where they must
//! participate in a caller-owned transaction.

// Catalog
pub mod product;

// Selection set
pub mod cart;

// Orders
pub mod order;
pub mod sequence;

// Live commerce
pub mod live_session;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
