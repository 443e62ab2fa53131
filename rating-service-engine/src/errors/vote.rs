//! Error types for vote engine operations.
//! Every failure a caller can observe from casting, retracting or querying
//! votes is one of these variants.
use rating_service_repository::VoteRepositoryError;
use rating_service_shared::types::{Target, UserId, VoteKey};
use thiserror::Error;

/// Represents the failures of a vote engine operation.
///
/// All variants except `Internal` are domain outcomes; `Internal` wraps a
/// storage failure after which nothing was committed.
#[derive(Debug, Error)]
pub enum VoteError {
    #[error("Target not found: {0}")]
    TargetNotFound(Target),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Vote already cast: {0}")]
    DuplicateVote(VoteKey),

    #[error("Vote not found: {0}")]
    VoteNotFound(VoteKey),

    #[error("Caller identity is missing or invalid")]
    Unauthorized,

    #[error("Concurrent vote on {0}, try again")]
    Conflict(VoteKey),

    #[error("Internal storage error: {0}")]
    Internal(#[source] VoteRepositoryError),
}

impl VoteError {
    /// Whether this error is a storage failure rather than a domain outcome.
    pub fn is_internal(&self) -> bool {
        matches!(self, VoteError::Internal(_))
    }
}

impl From<VoteRepositoryError> for VoteError {
    /// Keeps the repository outcomes the engine gives meaning to and wraps
    /// everything else. A missing author surfaces as `Internal`: every rated
    /// entity references an existing user.
    fn from(err: VoteRepositoryError) -> Self {
        match err {
            VoteRepositoryError::Conflict(key) => VoteError::Conflict(key),
            VoteRepositoryError::VoteNotFound(key) => VoteError::VoteNotFound(key),
            VoteRepositoryError::TargetNotFound(target) => VoteError::TargetNotFound(target),
            other => VoteError::Internal(other),
        }
    }
}
