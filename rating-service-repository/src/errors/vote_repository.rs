//! Error types for the vote repository.
//! Defines specific errors that can occur while reading or mutating votes
//! and the rating counters kept next to them.
use rating_service_shared::types::{Target, UserId, VoteKey};
use thiserror::Error;

/// Represents errors that can occur within the vote repository.
///
/// `Conflict` and the `*NotFound` variants are expected outcomes the engine
/// reacts to; everything else is a storage failure.
#[derive(Debug, Error)]
pub enum VoteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Vote already exists: {0}")]
    Conflict(VoteKey),

    #[error("Vote not found: {0}")]
    VoteNotFound(VoteKey),

    #[error("Target not found: {0}")]
    TargetNotFound(Target),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Invalid target type: {0}")]
    InvalidTargetType(String),

    #[error("Invalid vote type: {0}")]
    InvalidVoteType(String),
}
